use std::path::Path;

use anyhow::Result;
use chrono::{TimeDelta, Utc};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Table};

use ot2net_core::modules::audit_db::{default_db_path, SqliteAuditLog};
use ot2net_core::modules::config as core_config;
use ot2net_types::{GatewayConfig, UsageSummary};

use crate::cli::ConfigCommands;

pub async fn show_usage(
    config_path: Option<&Path>,
    json: bool,
    hours: Option<u32>,
    recent: usize,
) -> Result<()> {
    let config = core_config::load_config(config_path)?;
    let db_path = match config.audit.db_path {
        Some(path) => path,
        None => default_db_path().map_err(|e| anyhow::anyhow!(e))?,
    };
    let audit = SqliteAuditLog::open(&db_path)?;

    let since = hours.map(|h| Utc::now() - TimeDelta::hours(i64::from(h)));
    let summary = audit.usage_summary(since).await?;
    let records = audit.recent(recent).await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "summary": summary,
                "recent": records,
            }))?
        );
        return Ok(());
    }

    println!("{}", "AI Usage:".cyan().bold());
    if let Some(since) = summary.since {
        println!("  Since: {}", since.to_rfc3339());
    }
    println!("{}", calls_line(&summary));
    println!("  Tokens: {} in / {} out", summary.input_tokens, summary.output_tokens);
    println!("  Cost: ${:.4}", summary.total_cost);

    if records.is_empty() {
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "Time", "Feature", "Status", "In", "Out", "Cost", "Error",
    ]);
    for record in &records {
        table.add_row(vec![
            record.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            record.feature.clone(),
            if record.succeeded { "ok".to_string() } else { "failed".to_string() },
            record.input_tokens.to_string(),
            record.output_tokens.to_string(),
            format!("${:.4}", record.cost),
            record.error_message.clone().unwrap_or_default(),
        ]);
    }
    println!("{table}");
    Ok(())
}

fn calls_line(summary: &UsageSummary) -> String {
    format!(
        "  Calls: {} ({} ok, {} failed, {:.1}% success)",
        summary.total_calls,
        summary.succeeded.to_string().green(),
        summary.failed.to_string().red(),
        summary.success_rate()
    )
}

pub fn handle_config_command(cmd: ConfigCommands, config_path: Option<&Path>) -> Result<()> {
    match cmd {
        ConfigCommands::Show { json } => {
            let config = core_config::load_config(config_path)?;
            show_config(&config, json)
        },
        ConfigCommands::Path => {
            println!("{}", core_config::config_path(config_path)?.display());
            Ok(())
        },
    }
}

fn show_config(config: &GatewayConfig, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(config)?);
        return Ok(());
    }

    println!("{}", "Backend:".cyan().bold());
    println!("  Listen: {}:{}", config.get_bind_address(), config.port);
    println!(
        "  Frontend URL: {}",
        config.frontend_url.as_deref().unwrap_or("http://localhost:3000 (default)")
    );
    println!(
        "  Rate limit: {} requests / {} ms",
        config.rate_limit.max_requests, config.rate_limit.window_ms
    );

    println!("{}", "Edge proxy:".cyan().bold());
    println!("  Listen: {}:{}", config.get_bind_address(), config.edge.port);
    println!("  Upstream: {}", config.edge.upstream_origin);
    println!("  Timeout: {}s", config.edge.request_timeout_secs);

    println!("{}", "AI vendor:".cyan().bold());
    println!("  Base URL: {}", config.anthropic.base_url);
    println!("  API Key: {}", mask_key(&config.anthropic.api_key));
    println!("  Default model: {}", config.anthropic.default_model);
    println!(
        "  Retries: {} attempts, {} ms base delay",
        config.retry.max_retries, config.retry.base_delay_ms
    );
    Ok(())
}

fn mask_key(key: &str) -> String {
    if key.is_empty() {
        return "(not set)".yellow().to_string();
    }
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}
