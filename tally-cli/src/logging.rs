//! Logging setup for the CLI.
//!
//! Logging is off unless requested, so command output stays clean.
//!
//! # Environment Variables
//!
//! - `TALLY_DEBUG=true` or `TALLY_DEBUG=1` - Enable debug logging
//! - `TALLY_LOG_LEVEL=debug|info|warn|error|trace` - Set specific log level
//! - `TALLY_LOG_FORMAT=json|pretty|compact` - Set output format (default: compact)
//!
//! Log lines go to stderr.

use std::env;
use std::sync::Once;

static INIT: Once = Once::new();

/// Check if debug logging is enabled via `TALLY_DEBUG`.
#[inline]
pub fn is_debug_enabled() -> bool {
    env::var("TALLY_DEBUG")
        .map(|v| parse_flag(&v))
        .unwrap_or(false)
}

fn parse_flag(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "1" | "yes")
}

/// Resolve the log level from `TALLY_LOG_LEVEL`, falling back on `TALLY_DEBUG`.
pub fn get_log_level() -> &'static str {
    resolve_level(env::var("TALLY_LOG_LEVEL").ok().as_deref(), is_debug_enabled())
}

fn resolve_level(requested: Option<&str>, debug: bool) -> &'static str {
    let fallback = if debug { "debug" } else { "warn" };
    match requested.map(str::to_lowercase).as_deref() {
        Some("trace") => "trace",
        Some("debug") => "debug",
        Some("info") => "info",
        Some("warn") => "warn",
        Some("error") => "error",
        _ => fallback,
    }
}

/// Resolve the output format from `TALLY_LOG_FORMAT`.
pub fn get_log_format() -> &'static str {
    resolve_format(env::var("TALLY_LOG_FORMAT").ok().as_deref())
}

fn resolve_format(requested: Option<&str>) -> &'static str {
    match requested.map(str::to_lowercase).as_deref() {
        Some("json") => "json",
        Some("pretty") => "pretty",
        _ => "compact",
    }
}

/// Install the tracing subscriber. Subsequent calls are no-ops.
pub fn init() {
    INIT.call_once(|| {
        if !is_debug_enabled() && env::var("TALLY_LOG_LEVEL").is_err() {
            return;
        }

        use tracing_subscriber::{EnvFilter, fmt, prelude::*};

        let level = get_log_level();
        let filter = EnvFilter::try_new(format!(
            "tally={level},tally_cli={level},tally_migrate={level},tally_sqlite={level}"
        ))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

        let layer = fmt::layer().with_writer(std::io::stderr);
        match get_log_format() {
            "json" => tracing_subscriber::registry()
                .with(filter)
                .with(layer.json())
                .init(),
            "pretty" => tracing_subscriber::registry()
                .with(filter)
                .with(layer.pretty())
                .init(),
            _ => tracing_subscriber::registry()
                .with(filter)
                .with(layer.compact())
                .init(),
        }

        tracing::debug!(level, format = get_log_format(), "Tally logging initialized");
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_level() {
        assert_eq!(resolve_level(None, false), "warn");
        assert_eq!(resolve_level(None, true), "debug");
        assert_eq!(resolve_level(Some("TRACE"), false), "trace");
        assert_eq!(resolve_level(Some("loud"), true), "debug");
    }

    #[test]
    fn test_resolve_format() {
        assert_eq!(resolve_format(None), "compact");
        assert_eq!(resolve_format(Some("JSON")), "json");
        assert_eq!(resolve_format(Some("pretty")), "pretty");
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("YES"));
        assert!(parse_flag("1"));
        assert!(!parse_flag("0"));
    }
}
