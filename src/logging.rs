//! Tracing setup for hosts and tests.
//!
//! The resolver only emits `tracing` events; it never installs a subscriber
//! on its own. Hosts that have no subscriber of their own can call
//! [`install`] once at startup.

use std::sync::Once;

use tracing_subscriber::{
    EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

const DEFAULT_FILTER: &str = "info";

static TRACING_INSTALLED: Once = Once::new();

/// Installs a formatted stderr subscriber (idempotent).
///
/// The filter is read from `RUST_LOG`, falling back to `info`. If another
/// global subscriber is already set, this does nothing.
pub fn install() {
    install_with(DEFAULT_FILTER);
}

/// Like [`install`], with an explicit fallback filter such as
/// `"patchui=trace"`.
pub fn install_with(fallback: &str) {
    TRACING_INSTALLED.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(fallback))
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        let console = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_filter(filter);

        if tracing_subscriber::registry()
            .with(console)
            .try_init()
            .is_err()
        {
            tracing::debug!("a global subscriber was already installed");
        }
    });
}

/// Returns `true` once [`install`] or [`install_with`] has run.
#[must_use]
pub fn is_installed() -> bool {
    TRACING_INSTALLED.is_completed()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn install_is_idempotent() {
        install_with("patchui=trace");
        install();
        assert!(is_installed());
    }
}
