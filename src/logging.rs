//! Tracing subscriber setup.
//!
//! Logs always go to stderr because stdout may carry the audio stream.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Filter directive for the given verbosity when `RUST_LOG` is unset.
pub fn default_directive(verbosity: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbosity {
        0 => "warn",
        1 => "readaloud=info,warn",
        2 => "readaloud=debug,info",
        _ => "readaloud=trace,debug",
    }
}

/// Install the global subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init(verbosity: u8, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_directive(verbosity, quiet).into());

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbosity >= 3),
        )
        .try_init();

    if installed.is_err() {
        tracing::debug!("global subscriber already installed");
    }
}
