//! Logging setup for the application.

use crate::config::{AppConfig, GlobalLogLevel, ProgressLogLevel};
use env_logger::{Builder, Env};
use log::LevelFilter;

const fn progress_filter(level: ProgressLogLevel) -> LevelFilter {
    match level {
        ProgressLogLevel::Trace => LevelFilter::Trace,
        ProgressLogLevel::Debug => LevelFilter::Debug,
        ProgressLogLevel::Info => LevelFilter::Info,
        ProgressLogLevel::Warn => LevelFilter::Warn,
    }
}

const fn global_filter(level: GlobalLogLevel) -> LevelFilter {
    match level {
        GlobalLogLevel::Trace => LevelFilter::Trace,
        GlobalLogLevel::Debug => LevelFilter::Debug,
        GlobalLogLevel::Info => LevelFilter::Info,
        GlobalLogLevel::Warn => LevelFilter::Warn,
        GlobalLogLevel::Error => LevelFilter::Error,
    }
}

/// Initializes the logger with the appropriate configuration based on the application settings.
///
/// - The progress reporter logs at `config.progress_log_level`.
/// - Everything else logs at `config.global_log_level`, unless RUST_LOG is set,
///   in which case RUST_LOG decides.
///
/// # Arguments
///
/// * `config` - The application configuration containing the log level settings
pub fn init_logger(config: &AppConfig) {
    let progress_level = progress_filter(config.progress_log_level);
    let global_level = global_filter(config.global_log_level);

    let env = Env::default();
    let rust_log_set = std::env::var_os("RUST_LOG").is_some();
    let mut builder = Builder::from_env(env);

    if !rust_log_set {
        builder.filter_level(global_level);
    }

    // The progress module's level takes priority over the global level
    builder.filter_module("maze_forge_app::progress", progress_level);

    if let Err(e) = builder.try_init() {
        eprintln!("Logger already initialized: {e}");
        return;
    }

    log::debug!(
        "Logger initialized with global log level: {:?}, progress log level: {:?}",
        config.global_log_level,
        config.progress_log_level
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_mapping() {
        assert_eq!(progress_filter(ProgressLogLevel::Warn), LevelFilter::Warn);
        assert_eq!(global_filter(GlobalLogLevel::Error), LevelFilter::Error);
        assert_eq!(global_filter(GlobalLogLevel::default()), LevelFilter::Info);
    }
}
