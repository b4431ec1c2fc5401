//! Logging configuration with file-based output and size-based rotation.
//!
//! Writes logs to `~/.config/narrator/narrator.log` (or platform equivalent)
//! with 10 MB size-based rotation. Set `DEBUG_LOGGING=1` to enable debug
//! output for narrator crates.

use rolling_file::{BasicRollingFileAppender, RollingConditionBasic};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const DEBUG_DIRECTIVE: &str = "info,narrator_core=debug,narrator_cli=debug,narrator=debug";
const DEFAULT_DIRECTIVE: &str = "warn,narrator_core=info,narrator_cli=info,narrator=info";

/// Initialize logging with dual output (file + stdout).
///
/// Returns a `WorkerGuard` that must be held for the application lifetime
/// so buffered logs are flushed on exit. Falls back to stdout-only logging
/// (and returns `None`) when the log file cannot be created.
pub fn init() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let debug_logging = std::env::var("DEBUG_LOGGING").is_ok();

    let log_dir = match dirs::config_dir() {
        Some(config) => config.join("narrator"),
        None => {
            init_stdout_only(debug_logging);
            return None;
        }
    };

    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        // Can't use tracing yet since subscriber not initialized
        eprintln!(
            "Failed to create log directory {:?}: {}, using stdout only",
            log_dir, e
        );
        init_stdout_only(debug_logging);
        return None;
    }

    let log_path = log_dir.join("narrator.log");
    let file_appender = match BasicRollingFileAppender::new(
        &log_path,
        RollingConditionBasic::new().max_size(10 * 1024 * 1024), // 10 MB
        1, // narrator.log and narrator.log.1
    ) {
        Ok(appender) => appender,
        Err(e) => {
            eprintln!("Failed to create log file at {:?}: {}", log_path, e);
            init_stdout_only(debug_logging);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_span_events(FmtSpan::NONE);

    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(false)
        .with_span_events(FmtSpan::NONE);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stdout_layer)
        .with(filter(debug_logging))
        .init();

    tracing::debug!(log_file = ?log_path, debug_logging, "Logging initialized");

    Some(guard)
}

fn init_stdout_only(debug_logging: bool) {
    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(false)
        .with_span_events(FmtSpan::NONE);

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(filter(debug_logging))
        .init();

    tracing::debug!(debug_logging, "Logging initialized (stdout only)");
}

fn filter(debug_logging: bool) -> EnvFilter {
    EnvFilter::new(if debug_logging {
        DEBUG_DIRECTIVE
    } else {
        DEFAULT_DIRECTIVE
    })
}
