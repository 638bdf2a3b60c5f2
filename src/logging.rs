use anyhow::Result;
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,volley=debug"))
}

/// Initialize structured logging to `~/.local/state/volley/volley.log`.
///
/// Uses the XDG base directory spec via the `xdg` crate to locate the state
/// directory. Host applications that install their own subscriber should skip
/// this; the library only emits `tracing` events and never requires it.
pub fn init_logging() -> Result<()> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("volley")?;
    let log_dir = xdg_dirs.get_state_home();

    fs::create_dir_all(&log_dir)?;
    let log_file_path: PathBuf = log_dir.join("volley.log");

    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file_path)?;

    // Clones the file handle per event; falls back to a sink when the clone
    // fails instead of panicking inside the subscriber.
    struct FileMakeWriter(std::fs::File);

    impl<'a> MakeWriter<'a> for FileMakeWriter {
        type Writer = Box<dyn io::Write>;

        fn make_writer(&'a self) -> Self::Writer {
            match self.0.try_clone() {
                Ok(file) => Box::new(file),
                Err(_) => Box::new(io::sink()),
            }
        }
    }

    let writer: BoxMakeWriter = BoxMakeWriter::new(FileMakeWriter(file));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(writer)
        .with_ansi(false)
        .init();

    tracing::info!("volley logging initialized at {}", log_file_path.display());

    Ok(())
}

/// Initialize logging to stderr. Handy in tests and short-lived tools.
pub fn init_logging_stderr() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(io::stderr)
        .init();
}
