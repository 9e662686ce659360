// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Optional `config.toml` in the state directory.
//!
//! ```toml
//! [engine]
//! max_active = 1
//! work_root = "/tmp/sj"
//! shell = "bash"
//!
//! [dump]
//! socket = "/run/collector.sock"
//! retry_secs = 20
//! ```
//!
//! Every key is optional. Environment variables take precedence.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::lifecycle::LifecycleError;

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub engine: EngineSection,
    pub dump: DumpSection,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineSection {
    pub max_active: Option<usize>,
    pub work_root: Option<PathBuf>,
    pub shell: Option<PathBuf>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DumpSection {
    pub socket: Option<PathBuf>,
    pub retry_secs: Option<u64>,
}

impl FileConfig {
    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Read `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, LifecycleError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(LifecycleError::Io(e)),
        };
        Self::parse(&text).map_err(|source| LifecycleError::Config { path: path.to_path_buf(), source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_all_defaults() {
        assert_eq!(FileConfig::parse("").unwrap(), FileConfig::default());
    }

    #[test]
    fn parses_both_sections() {
        let config = FileConfig::parse(
            r#"
            [engine]
            max_active = 2
            shell = "/bin/sh"

            [dump]
            retry_secs = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.engine.max_active, Some(2));
        assert_eq!(config.engine.shell, Some(PathBuf::from("/bin/sh")));
        assert_eq!(config.engine.work_root, None);
        assert_eq!(config.dump.retry_secs, Some(5));
        assert_eq!(config.dump.socket, None);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(FileConfig::parse("[engine]\nmax_jobs = 2\n").is_err());
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = FileConfig::load(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, FileConfig::default());
    }

    #[test]
    fn invalid_file_names_its_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[engine\n").unwrap();
        let err = FileConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("config.toml"), "{err}");
    }
}
