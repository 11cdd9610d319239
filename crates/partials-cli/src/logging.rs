//! Diagnostic output for the command-line tool.

use tracing_subscriber::EnvFilter;

/// Level used when neither `RUST_LOG` nor `--verbose` is given.
pub const DEFAULT_LEVEL: &str = "warn";

/// Installs a stderr subscriber.
///
/// `--verbose` forces `debug`; otherwise `RUST_LOG` is honored and falls
/// back to [`DEFAULT_LEVEL`]. Calling this twice is harmless.
pub fn init(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
