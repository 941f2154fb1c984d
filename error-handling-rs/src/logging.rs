//! # Structured Logging
//!
//! Subscriber bootstrap and the single place where surfaced errors are
//! written to the log.

use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use crate::sanitization::{sanitize_map, sanitize_message};
use crate::types::{Error, Result};

// Flag to track if logging has been initialized
static LOGGING_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Configuration for the logging system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// The log level to use (trace, debug, info, warn, error)
    pub level: String,
    /// The service name for identification
    pub service_name: String,
    /// Whether to use JSON formatting
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            service_name: "meeting-notes-service".to_string(),
            json_format: true,
        }
    }
}

/// Initializes the structured logging system.
///
/// `RUST_LOG` wins over the configured level when set. Records emitted via
/// the `log` facade are forwarded to the same subscriber. Calling this twice
/// is a no-op.
pub fn init_logging(config: Option<LoggingConfig>) -> Result<()> {
    if LOGGING_INITIALIZED.load(Ordering::SeqCst) {
        return Ok(());
    }

    let config = config.unwrap_or_default();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},hyper=warn,reqwest=warn", config.level)));

    let registry = Registry::default().with(filter);

    let installed = if config.json_format {
        let json_layer = fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_target(true);
        registry.with(json_layer).try_init()
    } else {
        let text_layer = fmt::layer().with_target(true).with_thread_ids(true);
        registry.with(text_layer).try_init()
    };

    installed.map_err(|e| Error::internal_server(format!("Failed to set global subscriber: {}", e)))?;

    LOGGING_INITIALIZED.store(true, Ordering::SeqCst);

    tracing::info!(
        service = %config.service_name,
        level = %config.level,
        json = %config.json_format,
        "Structured logging initialized"
    );

    Ok(())
}

/// Logs a surfaced error with its diagnostics. Caller faults go out at `warn`,
/// everything from 500 upwards at `error`.
pub fn log_structured_error(error: &Error) {
    let message = sanitize_message(error.message());
    let metadata = serde_json::Value::Object(sanitize_map(error.metadata()));
    let diagnostics = serde_json::Value::Object(sanitize_map(error.diagnostics()));
    let cause = std::error::Error::source(error).map(|cause| sanitize_message(&cause.to_string()));

    if error.status_code() >= 500 {
        tracing::error!(
            error_id = %error.error_id(),
            error_kind = %error.kind(),
            code = %error.code(),
            status = error.status_code(),
            message = %message,
            metadata = %metadata,
            diagnostics = %diagnostics,
            cause = ?cause,
            "Request failed"
        );
    } else {
        tracing::warn!(
            error_id = %error.error_id(),
            error_kind = %error.kind(),
            code = %error.code(),
            status = error.status_code(),
            message = %message,
            metadata = %metadata,
            diagnostics = %diagnostics,
            "Request rejected"
        );
    }
}
