//! `env_logger` setup for embedding applications.

use crate::models::LoggingConfig;

/// Install `env_logger` as the `log` backend.
///
/// `RUST_LOG` takes precedence over the configured level. Calling this more
/// than once is harmless; later calls are ignored.
pub fn init(config: &LoggingConfig) {
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.level.as_str()),
    )
    .format_timestamp_secs()
    .try_init();
}
