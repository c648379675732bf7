//! Logging initialization

use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Initialize logging based on debug flag
///
/// With `debug`, everything down to `debug` goes to a temp log file whose
/// path is returned. Otherwise warnings go to stderr. `RUST_LOG` overrides
/// the level in both modes.
pub fn init_logging(debug: bool) -> Option<PathBuf> {
    if debug {
        match open_log_file() {
            Ok((path, file)) => {
                tracing_subscriber::fmt()
                    .with_writer(file)
                    .with_env_filter(
                        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
                    )
                    .with_ansi(false)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .init();
                return Some(path);
            }
            Err(e) => {
                eprintln!("Could not open debug log file ({}); logging to stderr", e);
            }
        }
    }

    let default_level = if debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .compact()
        .init();

    None
}

fn open_log_file() -> std::io::Result<(PathBuf, std::fs::File)> {
    let temp = tempfile::Builder::new()
        .prefix("starcat-")
        .suffix(".log")
        .tempfile()?;

    // Keep the file after exit so it can be inspected
    let (file, path) = temp.keep().map_err(|e| e.error)?;
    Ok((path, file))
}
