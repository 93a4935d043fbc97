//! Log initialization.
//!
//! Logs go to stderr so they never mix with module text printed on stdout.

use std::io;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Environment variable holding a `tracing` filter directive.
pub const LOG_ENV: &str = "QUIRE_LOG";

/// `-v` forces debug; otherwise `QUIRE_LOG` applies, defaulting to warnings only.
pub fn init(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let layer = fmt::layer()
        .compact()
        .with_target(true)
        .with_writer(io::stderr)
        .with_filter(filter);

    // A subscriber may already be set when embedded in tests.
    let _ = tracing_subscriber::registry().with(layer).try_init();
}
