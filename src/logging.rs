//! # Structured Logging Module
//!
//! Environment-aware structured logging for query construction and rendering.
//! Library code only emits `tracing` events; applications and tests that want
//! to see them call [`init_structured_logging`] once.

use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration
///
/// `TSQB_LOG` overrides the filter directive; `TSQB_LOG_FORMAT=json` switches
/// the console layer to JSON lines.
pub fn init_structured_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let filter = std::env::var("TSQB_LOG").unwrap_or_else(|_| get_log_level(&environment));
        let json = std::env::var("TSQB_LOG_FORMAT")
            .map(|format| format.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let console = if json {
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_ansi(false)
                .json()
                .with_filter(EnvFilter::new(filter))
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_ansi(true)
                .with_filter(EnvFilter::new(filter))
                .boxed()
        };

        // A host application may already own the global subscriber
        if tracing_subscriber::registry().with(console).try_init().is_err() {
            tracing::debug!("Global tracing subscriber already initialized - continuing with existing subscriber");
        }

        tracing::info!(
            environment = %environment,
            json = json,
            "🔧 STRUCTURED LOGGING: Initialized"
        );
    });
}

/// Get current environment from environment variables
fn get_environment() -> String {
    std::env::var("TSQB_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

/// Get log level based on environment
fn get_log_level(environment: &str) -> String {
    match environment {
        "test" => "debug".to_string(),
        "development" => "debug".to_string(),
        "production" => "info".to_string(),
        _ => "debug".to_string(),
    }
}

/// Log structured data for a completed render
pub fn log_render_operation(query_kind: &str, text_len: usize, param_count: usize, text: Option<&str>) {
    tracing::debug!(
        query_kind = %query_kind,
        text_len = text_len,
        param_count = param_count,
        text = text,
        "🧾 RENDER_OPERATION"
    );
}

/// Log a build operation rejected with a query error
pub fn log_build_rejection(operation: &str, error: &crate::error::QueryError) {
    tracing::warn!(
        operation = %operation,
        error = %error,
        "❌ BUILD_REJECTED"
    );
}
