//! Logging setup using `tracing` + `tracing-subscriber`
//!
//! Priority for determining the log level:
//! 1. `--verbose` flag (debug)
//! 2. `CREWPLAN_LOG` environment variable (e.g. "info", "debug")
//! 3. `log_level` in the global config
//! 4. default to `warn`
//!
//! Logs go to stderr so stdout carries only command output, which keeps
//! `--format json` parseable.

use anyhow::Result;
use tracing::Level;
use tracing_subscriber::fmt;

/// Environment variable consulted for the log level
pub const LOG_ENV: &str = "CREWPLAN_LOG";

/// Installs the global subscriber. Call once at startup.
pub fn init_logging(verbose: bool, configured: Option<&str>) -> Result<()> {
    let env = std::env::var(LOG_ENV).ok();
    let level = resolve_level(verbose, env.as_deref(), configured);

    fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Picks the effective level; unparseable values fall through to the next source
pub fn resolve_level(verbose: bool, env: Option<&str>, configured: Option<&str>) -> Level {
    if verbose {
        return Level::DEBUG;
    }

    env.and_then(parse_level)
        .or_else(|| configured.and_then(parse_level))
        .unwrap_or(Level::WARN)
}

fn parse_level(s: &str) -> Option<Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(Level::ERROR),
        "warn" | "warning" => Some(Level::WARN),
        "info" => Some(Level::INFO),
        "debug" => Some(Level::DEBUG),
        "trace" => Some(Level::TRACE),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_wins() {
        assert_eq!(resolve_level(true, Some("error"), Some("info")), Level::DEBUG);
    }

    #[test]
    fn env_before_config() {
        assert_eq!(resolve_level(false, Some("INFO"), Some("trace")), Level::INFO);
        assert_eq!(resolve_level(false, Some("loud"), Some("trace")), Level::TRACE);
    }

    #[test]
    fn defaults_to_warn() {
        assert_eq!(resolve_level(false, None, None), Level::WARN);
        assert_eq!(resolve_level(false, None, Some("")), Level::WARN);
    }
}
