//! Log output for litecal binaries.
//!
//! The library only emits events through `tracing` macros: `debug!` for each
//! step of a clean canonicalization and `warn!` for every fallback. A binary
//! picks where they go by calling [`init_tracing`] once, usually with
//! [`TracingConfig::for_cli`].
//!
//! ```ignore
//! use litecal_core::tracing::{init_tracing, TracingConfig};
//!
//! init_tracing(TracingConfig::for_cli(false, true)).expect("failed to initialize tracing");
//! ```
//!
//! `RUST_LOG` overrides the level chosen here.

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    prelude::*,
};

/// Errors that can occur during tracing initialization
#[derive(Debug, Error)]
pub enum TracingError {
    #[error("failed to set global tracing subscriber: {0}")]
    SetGlobalSubscriber(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// How log lines are rendered on stderr.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingOutputFormat {
    /// One terse line per event
    #[default]
    Compact,
    /// One JSON object per event
    Json,
}

#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Level for litecal crates when `RUST_LOG` is not set
    pub default_level: Level,
    pub output_format: TracingOutputFormat,
    /// Include file, line and module path
    pub include_location: bool,
    pub include_timestamp: bool,
    /// Log span open/close
    pub include_span_events: bool,
}

impl Default for TracingConfig {
    /// Warnings only: a clean run prints nothing, a fallback prints one line.
    fn default() -> Self {
        Self {
            default_level: Level::WARN,
            output_format: TracingOutputFormat::Compact,
            include_location: false,
            include_timestamp: false,
            include_span_events: false,
        }
    }
}

impl TracingConfig {
    /// Everything the pipeline reports, with source locations.
    #[must_use]
    pub fn cli_debug() -> Self {
        Self {
            default_level: Level::DEBUG,
            include_location: true,
            ..Self::default()
        }
    }

    /// JSON lines with timestamps, for collection by another process.
    #[must_use]
    pub fn structured() -> Self {
        Self {
            default_level: Level::INFO,
            output_format: TracingOutputFormat::Json,
            include_location: true,
            include_timestamp: true,
            include_span_events: true,
        }
    }

    /// Picks a preset from the `--debug` and `--log-json` switches.
    #[must_use]
    pub fn for_cli(debug: bool, json: bool) -> Self {
        match (debug, json) {
            (false, false) => Self::default(),
            (true, false) => Self::cli_debug(),
            (true, true) => Self::structured().with_level(Level::DEBUG),
            (false, true) => Self::structured().with_level(Level::WARN),
        }
    }

    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.default_level = level;
        self
    }

    /// Filter used when `RUST_LOG` is unset. Targets match by prefix, so
    /// this covers `litecal_core` and `litecal_client` alike.
    pub fn default_directive(&self) -> String {
        format!("litecal={}", self.default_level)
    }
}

/// Installs the global subscriber. Logs go to stderr; stdout is reserved
/// for command output.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing(config: TracingConfig) -> Result<(), TracingError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_directive()));

    let span_events = if config.include_span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_file(config.include_location)
        .with_line_number(config.include_location)
        .with_target(config.include_location)
        .with_span_events(span_events);

    let layer = match (config.output_format, config.include_timestamp) {
        (TracingOutputFormat::Json, _) => layer.json().boxed(),
        (TracingOutputFormat::Compact, true) => layer.compact().boxed(),
        (TracingOutputFormat::Compact, false) => layer.compact().without_time().boxed(),
    };

    let subscriber = tracing_subscriber::registry().with(env_filter).with(layer);
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
