//! File logging for the CLI.
//!
//! Library crates log through `log`; the subscriber installed here bridges
//! those records into `tracing` and writes them to a daily-rotated file under
//! `<config_dir>/scriptedit/logs/`. Nothing goes to the terminal, which the
//! edit TUI owns while it runs.
//!
//! Filter with `RUST_LOG` (default `info`), e.g. `RUST_LOG=scriptedit_session=debug`.

use std::path::Path;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILE_PREFIX: &str = "scriptedit.log";

/// Install the global subscriber. Failures are not fatal: the CLI runs without logs.
pub fn init() {
    let logs_dir = scriptedit_config::logs_dir();
    if let Err(e) = init_in(&logs_dir) {
        // Pre-TUI, so stderr is still ours.
        eprintln!("warning: file logging disabled: {}", e);
    }
}

fn init_in(logs_dir: &Path) -> Result<(), String> {
    std::fs::create_dir_all(logs_dir)
        .map_err(|e| format!("cannot create {}: {}", logs_dir.display(), e))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let file_appender = tracing_appender::rolling::daily(logs_dir, LOG_FILE_PREFIX);

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init()
        .map_err(|e| e.to_string())?;

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "logging to {}", logs_dir.display());
    Ok(())
}
