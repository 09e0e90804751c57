use crate::config::ApiConfig;
use env_logger::Env;

/// Initialize the process logger from the API configuration.
///
/// `RUST_LOG` takes precedence over `log_level` when it is set. Calling this
/// more than once is harmless; later calls leave the first logger in place.
pub fn init(config: &ApiConfig) {
    let env = Env::default().default_filter_or(config.log_level.as_str());
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .try_init();
}
