use anyhow::Result;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable holding a `tracing` filter directive.
pub const LOG_ENV: &str = "SESSPROBE_LOG";

/// Picks the filter directive for this run.
///
/// Priority: `SESSPROBE_LOG`, then `-v` flags, then the settings file, then `warn`.
pub fn filter_directive(env: Option<&str>, verbosity: u8, configured: Option<&str>) -> String {
    if let Some(env) = env.filter(|s| !s.trim().is_empty()) {
        return env.to_string();
    }
    match verbosity {
        0 => configured.unwrap_or("warn").to_string(),
        1 => "info".to_string(),
        2 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// Installs the global subscriber. Logs always go to stderr so stdout carries
/// nothing but timing lines.
pub fn init_logging(verbosity: u8, configured: Option<&str>) -> Result<()> {
    let env = std::env::var(LOG_ENV).ok();
    let directive = filter_directive(env.as_deref(), verbosity, configured);
    let filter = EnvFilter::try_new(&directive)
        .map_err(|e| anyhow::anyhow!("Invalid log filter '{}': {}", directive, e))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_timer(ChronoUtc::rfc_3339())
                .with_writer(std::io::stderr),
        )
        .try_init()?;
    Ok(())
}
