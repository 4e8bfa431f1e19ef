//! # Structured Logging Module
//!
//! Environment-aware structured logging to the console and to a JSON log
//! file, plus helpers that give cycle, fulfilment and command events a
//! consistent shape.

use chrono::Utc;
use std::fs;
use std::path::PathBuf;
use std::process;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration
pub fn init_structured_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let log_level = get_log_level(&environment);

        let log_dir = PathBuf::from("log");
        let file_logging = fs::create_dir_all(&log_dir).is_ok();

        let pid = process::id();
        let timestamp = Utc::now().format("%Y%m%d_%H%M%S").to_string();
        let log_filename = format!("{environment}.{pid}.{timestamp}.log");

        let console_layer = fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_level(true)
            .with_ansi(true)
            .with_filter(build_filter(&log_level));

        let (file_layer, guard) = if file_logging {
            let file_appender = tracing_appender::rolling::never(&log_dir, &log_filename);
            let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
            let layer = fmt::layer()
                .with_writer(file_writer)
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_ansi(false)
                .json()
                .with_filter(build_filter(&log_level));
            (Some(layer), Some(guard))
        } else {
            (None, None)
        };

        let subscriber = tracing_subscriber::registry()
            .with(console_layer)
            .with(file_layer);

        if subscriber.try_init().is_err() {
            tracing::debug!("Global tracing subscriber already initialized - continuing with existing subscriber");
        }

        tracing::info!(
            pid = pid,
            environment = %environment,
            log_file = %log_dir.join(&log_filename).display(),
            file_logging = file_logging,
            "Structured logging initialized"
        );

        // The writer must outlive the process for the file layer to flush.
        if let Some(guard) = guard {
            std::mem::forget(guard);
        }
    });
}

fn build_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Get current environment from environment variables
fn get_environment() -> String {
    std::env::var("AUTOFULFILL_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

/// Get log level based on environment
fn get_log_level(environment: &str) -> String {
    match environment {
        "production" => "info".to_string(),
        _ => "debug".to_string(),
    }
}

/// Log the outcome of one poll cycle
pub fn log_cycle_operation(
    trigger: &str,
    colonies: usize,
    processed: u64,
    succeeded: u64,
    failed: u64,
    skipped: u64,
    duration_ms: u64,
) {
    tracing::info!(
        trigger = %trigger,
        colonies = colonies,
        processed = processed,
        succeeded = succeeded,
        failed = failed,
        skipped = skipped,
        duration_ms = duration_ms,
        timestamp = %Utc::now().to_rfc3339(),
        "CYCLE_OPERATION"
    );
}

/// Log a single fulfilment attempt
pub fn log_fulfillment(
    colony: &str,
    request_id: &str,
    building: Option<&str>,
    item: Option<&str>,
    count: Option<u32>,
    status: &str,
    details: Option<&str>,
) {
    tracing::debug!(
        colony = %colony,
        request_id = %request_id,
        building = building,
        item = item,
        count = count,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "FULFILLMENT"
    );
}

/// Log a command issued through the command surface
pub fn log_command(command: &str, success: bool, details: Option<&str>) {
    tracing::info!(
        command = %command,
        success = success,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "COMMAND"
    );
}

/// Log error with full context
pub fn log_error(component: &str, operation: &str, error: &str, context: Option<&str>) {
    tracing::error!(
        component = %component,
        operation = %operation,
        error = %error,
        context = context,
        timestamp = %Utc::now().to_rfc3339(),
        "ERROR"
    );
}
