//! Tracing initialization.

use std::sync::Once;

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Environment variable holding a tracing filter, e.g. `SPECGEN_LOG=specgen=debug`.
pub const LOG_ENV: &str = "SPECGEN_LOG";

static INIT: Once = Once::new();

/// Default filter for a `-v` count.
pub fn default_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "specgen=warn",
        1 => "specgen=info",
        2 => "specgen=debug",
        _ => "specgen=trace",
    }
}

/// Initialize logging to stderr.
///
/// `SPECGEN_LOG` takes precedence over `verbosity`. Later calls are no-ops.
pub fn init_tracing(verbosity: u8) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV)
            .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));

        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false),
            )
            .with(filter)
            .init();
    });
}
