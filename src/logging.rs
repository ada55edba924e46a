//! Structured logging utilities for trang-gate
//!
//! All logs use structured fields for easy parsing and analysis.
//!
//! # Log Format Conventions
//!
//! - `operation`: The operation being performed (e.g., "gate.evaluate")
//! - `status`: The result status ("skipped", "success", "failure", "error")
//! - `output`: Absolute path of the output artifact
//! - `step`: Configured step name
//!
//! # Examples
//!
//! ```rust
//! use tracing::info;
//! use trang_gate::logging::{operations, status};
//!
//! info!(
//!     operation = operations::EVALUATE,
//!     status = status::SKIPPED,
//!     output = "/project/target/trang/schema.rnc",
//!     "Output is current, skipping translator invocation"
//! );
//! ```

use std::fmt as std_fmt;
use std::io::{self, IsTerminal};
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{
    fmt::{self, format::Writer},
    prelude::*,
    EnvFilter,
};

/// Custom formatter that shows "trang-gate" instead of full module path
struct GateFormatter {
    with_ansi: bool,
}

impl<S, N> FormatEvent<S, N> for GateFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std_fmt::Result {
        let meta = event.metadata();

        write!(
            writer,
            "{} ",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.6f%:z")
        )?;

        if self.with_ansi {
            let level_style = match *meta.level() {
                tracing::Level::ERROR => "\x1b[31m",
                tracing::Level::WARN => "\x1b[33m",
                tracing::Level::INFO => "\x1b[32m",
                tracing::Level::DEBUG => "\x1b[34m",
                tracing::Level::TRACE => "\x1b[35m",
            };
            write!(
                writer,
                "{}{:5}(trang-gate)\x1b[0m: ",
                level_style,
                meta.level()
            )?;
        } else {
            write!(writer, "{:5}(trang-gate): ", meta.level())?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

/// Log format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format, colored when stderr is a terminal (default for interactive use)
    Pretty,
    /// Plain format (for CI)
    Compact,
    /// JSON format (for log aggregation systems)
    Json,
}

impl LogFormat {
    /// Parse from environment variable (TRANG_GATE_LOG_FORMAT)
    pub fn from_env() -> Self {
        match std::env::var("TRANG_GATE_LOG_FORMAT")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "json" => Self::Json,
            "compact" => Self::Compact,
            "pretty" => Self::Pretty,
            _ => {
                if std::env::var("CI").is_ok() {
                    Self::Compact
                } else {
                    Self::Pretty
                }
            }
        }
    }
}

/// Initialize the global tracing subscriber
///
/// `default_level` applies when `RUST_LOG` is unset or invalid.
///
/// # Environment Variables
///
/// - `RUST_LOG`: Set log level (e.g., "debug", "info", "warn")
/// - `TRANG_GATE_LOG_FORMAT`: Set format ("pretty", "compact", "json")
/// - `CI`: If set, defaults to compact format
pub fn init(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // Colors only when stderr is a terminal, so redirected logs stay plain text
    let with_ansi = io::stderr().is_terminal();

    // A second initialization (e.g. from tests) keeps the first subscriber
    let _ = match LogFormat::from_env() {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .event_format(GateFormatter { with_ansi })
                    .with_ansi(with_ansi)
                    .with_writer(io::stderr),
            )
            .try_init(),
        LogFormat::Compact => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .event_format(GateFormatter { with_ansi: false })
                    .with_ansi(false)
                    .with_writer(io::stderr),
            )
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_file(false)
                    .with_line_number(false)
                    .with_ansi(false)
                    .with_writer(io::stderr)
                    .json(),
            )
            .try_init(),
    };
}

/// Operation names for consistent logging
pub mod operations {
    pub const EVALUATE: &str = "gate.evaluate";
    pub const CHECK: &str = "gate.check";
    pub const RUN_STEP: &str = "step.run";
}

/// Status values for consistent logging
pub mod status {
    pub const SKIPPED: &str = "skipped";
    pub const SUCCESS: &str = "success";
    pub const FAILURE: &str = "failure";
    pub const ERROR: &str = "error";
}
