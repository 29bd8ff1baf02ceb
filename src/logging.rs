//! Tracing subscriber setup for host applications.

use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize a stderr tracing subscriber.
///
/// Respects `RUST_LOG` when set; otherwise logs this crate at the given
/// level. Safe to call once per process; returns quietly if a global
/// subscriber is already installed (as in test binaries).
pub fn init_logging(default_level: Level) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("taskboard_engine={}", default_level))
    });

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    // A second init (e.g. from another test) is not an error worth surfacing
    let _ = tracing::subscriber::set_global_default(subscriber);
}
