//! ## Sets up logging by reading configuration from environment variables.
//!
//! Environment variables used:
//! - LOG_MODE: "stdout" (default) or "file"
//! - LOG_LEVEL: log level ("trace", "debug", "info", "warn", "error"); default is "info"
//! - LOG_FILE_PATH: when using file mode, the path of the log file (default "logs/wallet-health.log")

use chrono::Utc;
use log::info;
use simplelog::{Config, LevelFilter, SimpleLogger, WriteLogger};
use std::{
    env,
    fs::{create_dir_all, File},
    path::Path,
};

/// Appends the current UTC date before the ".log" suffix so each day gets its
/// own file.
fn rolled_log_path(base_file_path: &str) -> String {
    let date_str = Utc::now().format("%Y-%m-%d");
    match base_file_path.strip_suffix(".log") {
        Some(stem) => format!("{stem}-{date_str}.log"),
        None => format!("{base_file_path}-{date_str}.log"),
    }
}

pub fn setup_logging() {
    let log_mode = env::var("LOG_MODE").unwrap_or_else(|_| "stdout".to_string());
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let level_filter = match log_level.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Info,
    };

    if log_mode.to_lowercase() == "file" {
        let base_file_path =
            env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/wallet-health.log".to_string());
        let rolled_file_path = rolled_log_path(&base_file_path);

        if let Some(parent) = Path::new(&rolled_file_path).parent() {
            create_dir_all(parent).expect("Failed to create log directory");
        }

        let log_file = File::create(&rolled_file_path)
            .unwrap_or_else(|e| panic!("Unable to create log file {}: {}", rolled_file_path, e));

        WriteLogger::init(level_filter, Config::default(), log_file)
            .expect("Failed to initialize file logger");
    } else {
        SimpleLogger::init(level_filter, Config::default())
            .expect("Failed to initialize simple logger");
    }

    info!("Logging is successfully configured (mode: {})", log_mode);
}
