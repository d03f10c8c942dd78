//! Logging initialization.
//!
//! Every crate logs through `tracing` macros. The binary calls
//! [`init_logging`] once at startup, which installs:
//! - a JSON-lines layer appending to `~/.nuvault/logs/nuvault.jsonl`
//! - an optional compact stderr layer for interactive use
//!
//! `RUST_LOG` overrides the configured level when set.

use crate::{CoreError, CoreResult};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Where logs go and how verbose they are.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Level used when `RUST_LOG` is unset.
    pub default_level: String,
    /// JSONL log file. No file layer is installed when unset.
    pub log_path: Option<PathBuf>,
    /// Also emit compact logs to stderr.
    pub also_stderr: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            default_level: "info".into(),
            log_path: None,
            also_stderr: false,
        }
    }
}

/// Append-only file writer, flushed after every line so concurrent
/// processes tailing the file see whole records.
#[derive(Clone)]
struct LogFileWriter {
    inner: Arc<Mutex<BufWriter<File>>>,
}

impl LogFileWriter {
    fn open(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            inner: Arc::new(Mutex::new(BufWriter::with_capacity(8192, file))),
        })
    }
}

impl Write for LogFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self.inner.lock();
        let written = guard.write(buf)?;
        guard.flush()?;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.lock().flush()
    }
}

impl<'a> MakeWriter<'a> for LogFileWriter {
    type Writer = LogFileWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// `RUST_LOG` if set, else the configured level normalised by [`parse_level`].
fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = parse_level(default_level);
        EnvFilter::new(level.as_str().to_ascii_lowercase())
    })
}

/// Install the global tracing subscriber.
///
/// Fails if the log file cannot be opened or a subscriber is already set.
pub fn init_logging(config: &LogConfig) -> CoreResult<()> {
    let file_layer = match &config.log_path {
        Some(path) => {
            let writer = LogFileWriter::open(path)?;
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_current_span(false)
                    .with_writer(writer)
                    .with_filter(env_filter(&config.default_level)),
            )
        }
        None => None,
    };

    let stderr_layer = config.also_stderr.then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .compact()
            .with_writer(io::stderr)
            .with_filter(env_filter(&config.default_level))
    });

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .map_err(|e| CoreError::Config(format!("Failed to install logger: {}", e)))?;

    if let Some(path) = &config.log_path {
        tracing::debug!(log_path = %path.display(), "logging initialized");
    }

    Ok(())
}

/// Map a user-supplied level name to a `tracing::Level`.
///
/// Accepts any case and the `warning` alias. Anything unrecognised is INFO.
pub fn parse_level(level: &str) -> tracing::Level {
    let level = level.trim();
    if level.eq_ignore_ascii_case("warning") {
        return tracing::Level::WARN;
    }
    level.parse().unwrap_or(tracing::Level::INFO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_level_names_and_aliases() {
        let cases = [
            ("TRACE", tracing::Level::TRACE),
            (" debug ", tracing::Level::DEBUG),
            ("Info", tracing::Level::INFO),
            ("warn", tracing::Level::WARN),
            ("Warning", tracing::Level::WARN),
            ("error", tracing::Level::ERROR),
            ("", tracing::Level::INFO),
            ("chatty", tracing::Level::INFO),
        ];
        for (input, expected) in cases {
            assert_eq!(parse_level(input), expected, "input {input:?}");
        }
    }

    #[test]
    fn test_log_writer_appends_across_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logs").join("nuvault.jsonl");

        let mut writer = LogFileWriter::open(&path).unwrap();
        writer.write_all(b"first\n").unwrap();
        drop(writer);

        let mut writer = LogFileWriter::open(&path).unwrap();
        writer.write_all(b"second\n").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }
}
