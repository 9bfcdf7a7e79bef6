use std::env::var;

use tracing::{level_filters::LevelFilter, warn};
use tracing_subscriber::{
    Layer, Registry, filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt,
    util::TryInitError,
};

/// Install the global subscriber, panicking if one is already set.
pub fn init() {
    build_subscriber(LevelFilter::INFO).init();
}

/// Install the global subscriber unless one is already present.
///
/// Tests call this from many places, so a second install is not an error worth
/// failing over.
pub fn try_init() -> Result<(), TryInitError> {
    build_subscriber(LevelFilter::INFO).try_init()
}

/// Build the subscriber from `RUST_LOG` and `RUST_LOG_FORMAT`.
///
/// `RUST_LOG_FORMAT=json` emits one JSON object per line for log shippers,
/// anything else falls back to the compact human format.
fn build_subscriber(level: LevelFilter) -> impl SubscriberInitExt {
    let env_filter = EnvFilter::builder().with_default_directive(level.into()).from_env_lossy();

    let log_format = var("RUST_LOG_FORMAT")
        .inspect_err(|error| {
            warn!("Failed to read RUST_LOG_FORMAT, falling back to default: {error}")
        })
        .unwrap_or_default();

    let log_layer: Box<dyn Layer<Registry> + Send + Sync> = match log_format.as_str() {
        "json" => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(false)
            .with_target(true)
            .with_filter(env_filter)
            .boxed(),
        _ => tracing_subscriber::fmt::layer()
            .compact()
            .without_time()
            .with_target(false)
            .with_filter(env_filter)
            .boxed(),
    };

    tracing_subscriber::registry().with(log_layer)
}
