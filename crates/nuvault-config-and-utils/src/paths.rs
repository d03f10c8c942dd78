//! File system paths for the client.

use crate::{CoreError, CoreResult};
use std::path::PathBuf;

/// Directory name under the user's home.
const BASE_DIR_NAME: &str = ".nuvault";
const CONFIG_FILE_NAME: &str = "config.json";
const LOGS_DIR_NAME: &str = "logs";
/// Session store filename.
const SESSION_FILE_NAME: &str = "session.json";
/// Central log filename under the logs directory.
const LOG_FILE_NAME: &str = "nuvault.jsonl";

/// Manages file system paths for the client.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Base directory for client files (~/.nuvault)
    base_dir: PathBuf,
}

impl Paths {
    /// Create a new Paths instance rooted at `~/.nuvault`.
    pub fn new() -> CoreResult<Self> {
        match dirs::home_dir() {
            Some(home) => Ok(Self::with_base_dir(home.join(BASE_DIR_NAME))),
            None => Err(CoreError::Path("no home directory for the current user".into())),
        }
    }

    /// Root everything at `base_dir` instead of the home directory.
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory (~/.nuvault).
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the config file path (~/.nuvault/config.json).
    pub fn config_file(&self) -> PathBuf {
        self.base_dir.join(CONFIG_FILE_NAME)
    }

    /// Get the session store path (~/.nuvault/session.json).
    pub fn session_file(&self) -> PathBuf {
        self.base_dir.join(SESSION_FILE_NAME)
    }

    /// Get the logs directory (~/.nuvault/logs).
    pub fn logs_dir(&self) -> PathBuf {
        self.base_dir.join(LOGS_DIR_NAME)
    }

    /// Get the central JSONL log file (~/.nuvault/logs/nuvault.jsonl).
    pub fn log_file(&self) -> PathBuf {
        self.logs_dir().join(LOG_FILE_NAME)
    }

    /// Create the base and logs directories.
    pub fn ensure_dirs(&self) -> CoreResult<()> {
        // `logs` sits under the base, so one call builds both.
        std::fs::create_dir_all(self.logs_dir())?;
        Ok(())
    }
}
