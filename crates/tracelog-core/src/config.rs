//! Logger configuration.
//!
//! The core never reads configuration on its own; hosts build a
//! [`TraceLogConfig`] (usually from a TOML file) and push it into a logger
//! with [`TraceLogConfig::apply`].
//!
//! ```toml
//! file_name = "logs/trace.bin"
//! max_size = 4096
//! enabled = true
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::TraceLogError;
use crate::logger::TraceLogger;
use crate::storage::LogStorage;

/// Byte budget used when none is given.
pub const DEFAULT_MAX_SIZE: u32 = 2048;

/// Longest accepted log file name, in bytes.
pub const FILE_NAME_MAX: usize = 255;

/// Host-supplied settings for one trace logger.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct TraceLogConfig {
    /// Target log file. `None` leaves the logger unconfigured.
    pub file_name: Option<PathBuf>,
    /// Byte budget for the file.
    pub max_size: u32,
    /// Initial state of the enable gate.
    pub enabled: bool,
}

impl Default for TraceLogConfig {
    fn default() -> Self {
        Self {
            file_name: None,
            max_size: DEFAULT_MAX_SIZE,
            enabled: true,
        }
    }
}

impl TraceLogConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(src: &str) -> Result<Self> {
        toml::from_str(src).context("parse trace log config toml")
    }

    /// Read and parse a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let src = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        Self::from_toml_str(&src).with_context(|| format!("load config {}", path.display()))
    }

    /// Push these settings into `logger`.
    ///
    /// The enable gate is always applied; the file is configured only when a
    /// name is present. Fails if the name is invalid or a file is already open.
    pub fn apply<S: LogStorage>(&self, logger: &mut TraceLogger<S>) -> Result<(), TraceLogError> {
        logger.writer_mut().set_enabled(self.enabled);
        match &self.file_name {
            Some(name) => logger.set_log_file(name, self.max_size),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::FileMode;

    #[test]
    fn defaults_fill_missing_keys() {
        let cfg = TraceLogConfig::from_toml_str(r#"file_name = "t.bin""#).unwrap();
        assert_eq!(cfg.file_name.as_deref(), Some(Path::new("t.bin")));
        assert_eq!(cfg.max_size, DEFAULT_MAX_SIZE);
        assert!(cfg.enabled);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = TraceLogConfig::from_toml_str("max_sise = 10").unwrap_err();
        assert!(format!("{err:#}").contains("max_sise"));
    }

    #[test]
    fn apply_sets_gate_and_file_without_opening() {
        let cfg = TraceLogConfig::from_toml_str(
            r#"
            file_name = "never-created.bin"
            max_size = 64
            enabled = false
            "#,
        )
        .unwrap();
        let mut logger = TraceLogger::new();
        cfg.apply(&mut logger).unwrap();
        assert!(!logger.writer().enabled());
        assert_eq!(logger.writer().max_size(), 64);
        assert_eq!(logger.writer().mode(), FileMode::Closed);
        assert!(!Path::new("never-created.bin").exists());
    }
}
