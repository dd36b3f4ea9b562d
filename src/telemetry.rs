use tracing_subscriber::EnvFilter;

use crate::config::LoggingSettings;

pub type InitError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Install the global tracing subscriber
///
/// `RUST_LOG` takes precedence over the configured level. Fails if a
/// subscriber is already installed, which embedding applications and tests
/// can ignore.
pub fn init_tracing(settings: &LoggingSettings) -> Result<(), InitError> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&settings.level))?;

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    match settings.format.as_str() {
        "pretty" => subscriber.pretty().try_init(),
        "compact" => subscriber.compact().try_init(),
        _ => subscriber.json().try_init(),
    }
}
