//! Logging initialisation via tracing-subscriber.
//!
//! Call [`init`] once at startup. Everything goes to stderr so stdout stays free
//! for the chat transcript.

use std::env;
use std::str::FromStr;

use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

use crate::error::AppError;

const DEFAULT_FILTER: &str = "info";
const SERVICE_NAME: &str = "mega-assistant";

/// Output format of the log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human readable, one line per event
    #[default]
    Pretty,
    /// Bunyan JSON, one object per line
    Json,
}

impl FromStr for LogFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" | "bunyan" => Ok(LogFormat::Json),
            other => Err(AppError::Config(format!("unknown LOG_FORMAT '{}'", other))),
        }
    }
}

impl LogFormat {
    /// Read `LOG_FORMAT`, defaulting to [`LogFormat::Pretty`].
    pub fn from_env() -> Result<Self, AppError> {
        env::var("LOG_FORMAT").map_or(Ok(LogFormat::Pretty), |v| v.parse())
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the default `info` filter.
pub fn init(format: LogFormat) -> Result<(), AppError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))
        .map_err(|e| AppError::Config(format!("invalid log filter: {}", e)))?;

    let registry = Registry::default().with(filter);

    let result = match format {
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .try_init(),
        LogFormat::Json => registry
            .with(JsonStorageLayer)
            .with(BunyanFormattingLayer::new(
                SERVICE_NAME.to_string(),
                std::io::stderr,
            ))
            .try_init(),
    };

    result.map_err(|e| AppError::Internal(format!("failed to set subscriber: {}", e)))
}
