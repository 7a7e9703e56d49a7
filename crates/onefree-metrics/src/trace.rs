use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, util::SubscriberInitExt, util::TryInitError};

/// Environment variable holding the log filter directives.
pub const LOG_ENV: &str = "ONEFREE_LOG";

/// Install a formatting subscriber filtered by [`LOG_ENV`].
///
/// Defaults to `DEBUG` in debug builds and `INFO` otherwise. Fails if a global
/// subscriber is already set.
pub fn init_logging() -> Result<(), TryInitError> {
    let default = if cfg!(debug_assertions) {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    let env_filter = EnvFilter::builder()
        .with_default_directive(default.into())
        .with_env_var(LOG_ENV)
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(env_filter)
        .finish()
        .try_init()
}
