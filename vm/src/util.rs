use std::any::Any;

use tracing_forest::ForestLayer;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

/// Keeps the profiling layer alive; dropping it flushes the profile.
pub type LoggerGuard = Option<Box<dyn Any>>;

/// Initializes the global tracing subscriber.
///
/// The default `Level` is `INFO`; `RUST_LOG` overrides it. With the
/// `tracing-profile` or `perfetto` feature the profiling layer is installed
/// instead. Calling it again once a subscriber is set is a no-op.
pub fn init_logger() -> LoggerGuard {
    if cfg!(feature = "tracing-profile") || cfg!(feature = "perfetto") {
        match tracing_profile::init_tracing() {
            Ok(guard) => return Some(Box::new(guard)),
            Err(err) => eprintln!("failed to initialize profiling layer: {err:?}"),
        }
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(ForestLayer::default())
        .try_init();
    None
}
