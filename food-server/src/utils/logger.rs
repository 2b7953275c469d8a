//! Logging Infrastructure
//!
//! Structured logging setup with support for both development and production environments.

use std::path::Path;
use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVES: &str = "food_server=info,tower_http=info";

/// Initialize the logger
pub fn init_logger() {
    init_logger_with_file(None, false, None);
}

/// Initialize the logger with optional JSON format and file output
///
/// `RUST_LOG` takes precedence over `log_level` when set.
pub fn init_logger_with_file(log_level: Option<&str>, json: bool, log_dir: Option<&str>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match log_level {
        Some(level) => EnvFilter::new(format!("food_server={level},tower_http={level}")),
        None => EnvFilter::new(DEFAULT_DIRECTIVES),
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    // Add file output if log_dir is provided
    if let Some(dir) = log_dir {
        let log_path = Path::new(dir);
        if log_path.exists()
            && let Some(dir_str) = log_path.to_str()
        {
            let file_appender = tracing_appender::rolling::daily(dir_str, "food-server");
            let builder = builder.with_ansi(false).with_writer(file_appender);
            let result = if json {
                builder.json().try_init()
            } else {
                builder.try_init()
            };
            if let Err(e) = result {
                eprintln!("Logger already initialized: {e}");
            }
            return;
        }
    }

    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(e) = result {
        eprintln!("Logger already initialized: {e}");
    }
}
