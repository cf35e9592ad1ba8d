//! # ot2net Core
//!
//! Request-path infrastructure for the ot2net PMO backend.
//!
//! ```text
//! ot2net-core/src/
//! ├── proxy/
//! │   ├── edge.rs        # /api/* relay to the backend origin
//! │   ├── middleware/    # fixed-window rate limiter, CORS
//! │   ├── retry/         # exponential backoff engine
//! │   └── upstream/      # Anthropic client, pricing, audited call wrapper
//! ├── modules/           # config loading, logging, SQLite audit log
//! └── utils/             # data directory resolution
//! ```

#![allow(
    clippy::significant_drop_tightening,
    reason = "Mutex guards in blocking audit writes are held for a single statement"
)]
#![allow(clippy::map_err_ignore, reason = "Error context is provided in the replacement message")]
// Test-only lints: allow panic!, println!, etc. in test code
#![cfg_attr(
    test,
    allow(
        clippy::panic,
        clippy::print_stdout,
        clippy::float_cmp,
        clippy::assertions_on_result_states
    )
)]

pub mod error;
pub mod modules;
pub mod proxy;
pub mod utils;

// Re-export commonly used types
pub use error::{AppError, AppResult};
pub use ot2net_types::{GatewayConfig, UpstreamCallRecord, UpstreamError, UpstreamErrorKind};
