// src/logging.rs
// Sets up tracing output on stderr, so stdout stays clean for --json.

use tracing_subscriber::EnvFilter;

// Installs the global subscriber
//
// RUST_LOG wins when set; otherwise -v gives info, -vv debug, -vvv trace.
// Without -v only warnings (skipped pages) are shown.
pub fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("scoped_links={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
