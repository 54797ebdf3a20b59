//! Tracing subscriber setup for binaries embedding sessionward.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs a formatting subscriber filtered by `RUST_LOG`.
///
/// When `RUST_LOG` is unset or invalid, `default_directive` is used
/// instead (for example `"sessionward=debug,info"`). Calling this more than
/// once leaves the first subscriber in place.
pub fn init(default_directive: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
