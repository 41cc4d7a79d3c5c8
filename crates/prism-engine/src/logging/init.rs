use std::sync::Once;

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info", "warn",
/// "prism_engine=debug,wgpu=warn"). When unset, `RUST_LOG` is consulted and
/// then `default_level` applies.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub default_level: log::LevelFilter,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            default_level: log::LevelFilter::Info,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

static INIT: Once = Once::new();

/// Initializes the global logger once.
///
/// This function is idempotent; subsequent calls are ignored.
/// Intended usage is early in `main`.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = builder_for(&config);
        builder.init();

        log::debug!("logging initialized");
    });
}

/// Routes log output through the test harness capture.
///
/// Safe to call from every test; only the first call installs a logger.
pub fn init_test_logging() {
    let config = LoggingConfig {
        default_level: log::LevelFilter::Debug,
        ..Default::default()
    };
    let _ = builder_for(&config).is_test(true).try_init();
}

fn builder_for(config: &LoggingConfig) -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();

    if let Some(filter) = &config.env_filter {
        builder.parse_filters(filter);
    } else if let Ok(filter) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filter);
    } else {
        // wgpu backends are chatty below warn.
        builder
            .filter_level(config.default_level)
            .filter_module("wgpu_core", log::LevelFilter::Warn)
            .filter_module("wgpu_hal", log::LevelFilter::Warn)
            .filter_module("naga", log::LevelFilter::Warn);
    }

    builder.write_style(config.write_style);
    builder
}
