//! Structured logging initialization.
//!
//! The middleware logs through `tracing`; hosts that already run their own
//! subscriber need nothing from here. For standalone use and tests,
//! [`init_logging`] installs an env-filtered fmt subscriber.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global tracing subscriber.
///
/// The filter is taken from `RUST_LOG` when set, falling back to
/// `default_filter`. Calling this more than once is a no-op.
pub fn init_logging(default_filter: &str) {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
