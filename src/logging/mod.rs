use crate::config::{LoggingConfig, LoggingFormat};

use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// `RUST_LOG` wins over the configured level when set.
pub fn init(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "jitsi_connector={level},tower_http={level}",
            level = config.level.as_str()
        ))
    });

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = match config.format {
        LoggingFormat::Pretty => builder.try_init(),
        LoggingFormat::Json => builder.json().try_init(),
    };

    // Already installed (tests, embedding hosts).
    let _ = result;
}
