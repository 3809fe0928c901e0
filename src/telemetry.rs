//! Logging bootstrap for a broker control plane node.
//!
//! Everything in this crate logs through `tracing` with structured
//! fields: the metadata update path traces per-partition cache changes,
//! the controller event loop reports lifecycle and swallowed processor
//! errors, and the record intake warns about dropped records. This
//! module installs the subscriber those logs land on.
//!
//! Verbosity is controlled with `RUST_LOG` directives; the per-module
//! targets worth knowing are `brokerage::metadata` (per-partition cache
//! traces), `brokerage::controller` (event loop lifecycle) and
//! `brokerage::streams` (dropped-record warnings). When `RUST_LOG` is
//! unset, the filter passed to [`init_logging`] applies.
//!
//! ```rust,no_run
//! use brokerage::config::BrokerConfig;
//! use brokerage::telemetry::init_logging;
//!
//! let config = BrokerConfig::from_env().expect("invalid broker configuration");
//! init_logging(config.log_format, "info,brokerage::metadata=debug")
//!     .expect("logging already initialized");
//! ```

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::error::{Error, Result};

/// Log output format, selected through `LOG_FORMAT` (see
/// [`BrokerConfig::from_env`]).
///
/// [`BrokerConfig::from_env`]: crate::config::BrokerConfig::from_env
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable output for interactive use (default).
    #[default]
    Pretty,
    /// One JSON object per event, for log aggregators.
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = Error;

    /// Unknown values are a configuration error rather than a silent
    /// fallback, so a typo in a deployment manifest surfaces at startup.
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(Error::Config(format!(
                "unknown log format '{other}', expected 'pretty' or 'json'"
            ))),
        }
    }
}

/// Install the global tracing subscriber.
///
/// `default_filter` is used when `RUST_LOG` is not set; pass the usual
/// directive syntax (for example `"info,brokerage::controller=debug"`).
/// Fails if a subscriber is already installed, so embedding applications
/// that bring their own can simply skip this call.
pub fn init_logging(format: LogFormat, default_filter: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Pretty => registry.with(fmt::layer()).try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().flatten_event(true))
            .try_init(),
    }
    .map_err(|e| Error::Config(format!("failed to initialize logging: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parses_known_values() {
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert_eq!("Pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
    }

    #[test]
    fn test_log_format_rejects_unknown_values() {
        let err = "yaml".parse::<LogFormat>().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("yaml"));
        assert!("".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_log_format_default_is_pretty() {
        assert_eq!(LogFormat::default(), LogFormat::Pretty);
    }
}
