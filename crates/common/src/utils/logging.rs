//! Process-wide `tracing` subscriber.
//!
//! Output goes to stdout, compact by default or one JSON object per line
//! with `LOG_FORMAT=json`. `RUST_LOG` replaces [`DEFAULT_FILTER`] entirely.

use std::io;
use tracing_subscriber::{fmt, EnvFilter};

/// Request spans from the HTTP layer and the store's write events at info;
/// per-statement sqlx logging only from warn up.
pub const DEFAULT_FILTER: &str = "info,tower_http=info,sqlx=warn";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl LogFormat {
    /// `json` (any case) selects JSON; everything else, including unset, is compact.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Compact,
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Compact human-readable lines. A second call is a no-op.
pub fn init_logging_default() {
    let _ = fmt()
        .with_env_filter(env_filter())
        .with_target(false)
        .compact()
        .with_writer(io::stdout)
        .try_init();
}

pub fn init_logging_json() {
    // 字段（event、id、car_id 等）原样输出，便于日志平台检索
    let _ = fmt()
        .with_env_filter(env_filter())
        .with_target(false)
        .json()
        .with_writer(io::stdout)
        .try_init();
}

pub fn init_logging_from_env() {
    match LogFormat::parse(std::env::var("LOG_FORMAT").ok().as_deref()) {
        LogFormat::Json => init_logging_json(),
        LogFormat::Compact => init_logging_default(),
    }
}
