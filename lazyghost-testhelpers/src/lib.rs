//! Test helpers for the lazyghost workspace.
//!
//! Call [`setup`] at the top of a test to get tracing output on stderr,
//! filtered through the `LAZYGHOST_LOG` environment variable (same syntax
//! as `tracing_subscriber::filter::Targets`, e.g.
//! `LAZYGHOST_LOG=lazyghost=trace`).

#![warn(missing_docs)]

use std::sync::LazyLock;
use std::time::Instant;

use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

static START_TIME: LazyLock<Instant> = LazyLock::new(Instant::now);

struct Uptime;

impl FormatTime for Uptime {
    fn format_time(&self, w: &mut Writer<'_>) -> core::fmt::Result {
        let elapsed = START_TIME.elapsed();
        write!(w, "{:4}.{:03}s", elapsed.as_secs(), elapsed.subsec_millis())
    }
}

/// Lazy initialization of the global tracing subscriber.
///
/// This ensures the subscriber is set up exactly once, regardless of how
/// many tests run in the same process.
static SUBSCRIBER_INIT: LazyLock<()> = LazyLock::new(|| {
    // Force start time initialization
    let _ = *START_TIME;

    let filter = std::env::var("LAZYGHOST_LOG")
        .ok()
        .and_then(|targets| targets.parse::<Targets>().ok())
        .unwrap_or_else(|| Targets::new().with_default(LevelFilter::WARN));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_timer(Uptime)
                .with_writer(std::io::stderr),
        )
        .try_init();
});

/// Installs the test tracing subscriber, once per process.
pub fn setup() {
    LazyLock::force(&SUBSCRIBER_INIT);
}
