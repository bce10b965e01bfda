//! Log output for applications embedding the client.
//!
//! The client crates log through the `log` facade. [`init_logging`]
//! installs a `tracing-subscriber` fmt subscriber that also picks up those
//! records, filtered by `RUST_LOG` (default `info`).

use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    /// One JSON object per line, for log aggregation.
    Json,
}

impl LogFormat {
    /// `Json` when built with the `logs-json` feature.
    pub fn from_build() -> Self {
        if cfg!(feature = "logs-json") {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(format: LogFormat) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Pretty => builder.try_init()?,
        LogFormat::Json => builder.json().try_init()?,
    }
    tracing::debug!(?format, "logging initialised");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_fails() {
        let _ = init_logging(LogFormat::Pretty);
        assert!(init_logging(LogFormat::Json).is_err());
    }

    #[test]
    fn build_format_follows_feature() {
        let expected = if cfg!(feature = "logs-json") {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        };
        assert_eq!(LogFormat::from_build(), expected);
    }
}
