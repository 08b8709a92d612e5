//! Diagnostics for consumers parking and waking, bulk replacement and
//! worker joins.
//!
//! Events are only emitted with `--features tracing`. In default builds the
//! `trace!`, `debug!` and `warn!` names used across the crate resolve to
//! empty macros, so `push` and `wait_and_pop` compile to the bare lock and
//! condvar calls.

/// Installs a global `fmt` subscriber for queue diagnostics.
///
/// Reads `RUST_LOG`; when unset, every event from this crate is shown. Each
/// line carries the thread id and name, which is what matters when following a
/// consumer from "parking" to "woken". Installing a second global subscriber
/// panics, so call this once per process (a demo `main`, a single test).
#[cfg(feature = "tracing")]
pub fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("concurrent_queue_rs=trace"));

    let layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_timer(fmt::time::uptime());

    tracing_subscriber::registry().with(layer).with(filter).init();
}

/// Does nothing; diagnostics are compiled out without the `tracing` feature.
#[cfg(not(feature = "tracing"))]
pub const fn init_tracing() {}

#[cfg(feature = "tracing")]
pub(crate) use tracing::{debug, trace, warn};

// Swallow the arguments unexpanded so field expressions cost nothing.
#[cfg(not(feature = "tracing"))]
macro_rules! discard {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
pub(crate) use discard as debug;
#[cfg(not(feature = "tracing"))]
pub(crate) use discard as trace;
#[cfg(not(feature = "tracing"))]
pub(crate) use discard as warn;
