use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::EnvFilter;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Append-only diagnostic log. Falls back to stderr when the file cannot be
/// opened. Filtering follows `GENESIS_LOG`, default `info`.
pub fn init(log_file: &Path) {
    let filter = EnvFilter::try_from_env("GENESIS_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new(TIME_FORMAT.to_string()))
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if let Some(parent) = log_file.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let file = OpenOptions::new().create(true).append(true).open(log_file);

    // A subscriber may already be installed (tests, repeated init).
    let _ = match file {
        Ok(file) => builder
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .try_init(),
        Err(e) => {
            eprintln!("Cannot open log file {}: {e}", log_file.display());
            builder.with_writer(std::io::stderr).try_init()
        }
    };
}
