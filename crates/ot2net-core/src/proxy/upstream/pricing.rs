//! Per-token pricing used to estimate the cost of an AI call.

/// USD price per single token.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelPricing {
    pub input_per_token: f64,
    pub output_per_token: f64,
}

/// Sonnet family: $0.003 / 1K input, $0.015 / 1K output.
pub const SONNET_PRICING: ModelPricing =
    ModelPricing { input_per_token: 0.003 / 1000.0, output_per_token: 0.015 / 1000.0 };

const HAIKU_3_5_PRICING: ModelPricing =
    ModelPricing { input_per_token: 0.0008 / 1000.0, output_per_token: 0.004 / 1000.0 };

const HAIKU_3_PRICING: ModelPricing =
    ModelPricing { input_per_token: 0.000_25 / 1000.0, output_per_token: 0.001_25 / 1000.0 };

const OPUS_PRICING: ModelPricing =
    ModelPricing { input_per_token: 0.015 / 1000.0, output_per_token: 0.075 / 1000.0 };

impl ModelPricing {
    /// Price table entry for a model id. Unknown models are billed at Sonnet rates.
    pub fn for_model(model: &str) -> Self {
        let model = model.to_ascii_lowercase();
        if model.contains("opus") {
            OPUS_PRICING
        } else if model.contains("3-5-haiku") || model.contains("haiku-4") {
            HAIKU_3_5_PRICING
        } else if model.contains("haiku") {
            HAIKU_3_PRICING
        } else {
            SONNET_PRICING
        }
    }

    pub fn cost(&self, input_tokens: u64, output_tokens: u64) -> f64 {
        input_tokens as f64 * self.input_per_token + output_tokens as f64 * self.output_per_token
    }
}

impl Default for ModelPricing {
    fn default() -> Self {
        SONNET_PRICING
    }
}
