use tracing::subscriber::set_global_default;
use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Registry};

use crate::error::AppError;

/// Build a JSON-formatting subscriber writing to `sink`.
///
/// `RUST_LOG` takes precedence over `default_filter`.
pub fn get_subscriber<Sink>(default_filter: &str, sink: Sink) -> impl Subscriber + Send + Sync
where
    Sink: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    let formatting_layer = tracing_subscriber::fmt::layer()
        .with_writer(sink)
        .json()
        .with_current_span(true)
        .with_span_list(false);

    Registry::default().with(env_filter).with(formatting_layer)
}

/// Install `subscriber` as the global default. Must be called only once.
pub fn init_subscriber(subscriber: impl Subscriber + Send + Sync) -> Result<(), AppError> {
    set_global_default(subscriber)
        .map_err(|e| AppError::Internal(format!("Failed to install tracing subscriber: {}", e)))
}
