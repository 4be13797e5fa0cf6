use crate::config::Config;
use log::{LevelFilter, SetLoggerError};
use simplelog::{self, ConfigBuilder};

/// Transport and runtime crates whose logs are hidden unless running at Trace.
const FILTERED_MODULES: &[&str] = &["tower", "tower_http", "hyper", "axum", "tokio", "mio"];

pub struct Logger {}

impl Logger {
    /// Initializes the global logger from the provided Config. Call once at startup.
    ///
    /// Trace shows dependency logs too; every other level hides them.
    /// Fails if a global logger was already installed.
    pub fn init_logger(config: &Config) -> Result<(), SetLoggerError> {
        let log_level_filter = Self::convert_level_filter(config.log_level_filter);
        let apply_filters = Self::should_filter_dependencies(config.log_level_filter);
        let log_config = Self::build_log_config(apply_filters);

        simplelog::TermLogger::init(
            log_level_filter,
            log_config,
            simplelog::TerminalMode::Mixed,
            simplelog::ColorChoice::Auto,
        )
    }

    /// Converts log::LevelFilter to simplelog::LevelFilter.
    fn convert_level_filter(level: LevelFilter) -> simplelog::LevelFilter {
        match level {
            LevelFilter::Off => simplelog::LevelFilter::Off,
            LevelFilter::Error => simplelog::LevelFilter::Error,
            LevelFilter::Warn => simplelog::LevelFilter::Warn,
            LevelFilter::Info => simplelog::LevelFilter::Info,
            LevelFilter::Debug => simplelog::LevelFilter::Debug,
            LevelFilter::Trace => simplelog::LevelFilter::Trace,
        }
    }

    /// Determines whether dependency logging should be filtered.
    ///
    /// Returns `false` for Trace level (show all logs), `true` for all other levels.
    fn should_filter_dependencies(level: LevelFilter) -> bool {
        level != LevelFilter::Trace
    }

    /// Builds a simplelog Config with optional module filtering.
    ///
    /// When `apply_filters` is true, logs from noisy dependencies are suppressed.
    fn build_log_config(apply_filters: bool) -> simplelog::Config {
        let mut builder = ConfigBuilder::new();
        builder.set_time_format_rfc3339();

        if apply_filters {
            for module in FILTERED_MODULES {
                builder.add_filter_ignore_str(module);
            }
        }

        builder.build()
    }
}
