//! Logging bootstrap for the agendador services.
//!
//! Installs a `tracing` subscriber with an `EnvFilter`. `RUST_LOG` is honored;
//! the workspace crates additionally get a directive at the requested level.

use std::str::FromStr;
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const WORKSPACE_TARGETS: [&str; 4] = [
    "agendador_backend",
    "agendador_gcal",
    "agendador_common",
    "agendador_config",
];

/// Initialize the tracing subscriber with a specific log level.
///
/// Safe to call more than once; only the first call installs a subscriber.
pub fn init_with_level(level: Level) {
    let mut filter = EnvFilter::from_default_env();
    for target in WORKSPACE_TARGETS {
        if let Ok(directive) = format!("{}={}", target, level).parse() {
            filter = filter.add_directive(directive);
        }
    }

    let result = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(filter)
        .try_init();

    if result.is_ok() {
        info!("Logging initialized at level: {}", level);
    }
}

/// Parses a configured level name ("debug", "WARN", ...), falling back to INFO.
pub fn parse_level(name: Option<&str>) -> Level {
    name.and_then(|n| Level::from_str(n.trim()).ok())
        .unwrap_or(Level::INFO)
}

/// Logs a result, with different messages for success and error cases,
/// and hands it back unchanged.
pub fn log_result<T, E: std::fmt::Display>(
    result: Result<T, E>,
    success_message: &str,
    error_context: &str,
) -> Result<T, E> {
    match &result {
        Ok(_) => info!("{}", success_message),
        Err(e) => error!("{}: {}", error_context, e),
    }
    result
}
