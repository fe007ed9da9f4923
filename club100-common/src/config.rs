//! Configuration loading and root folder resolution
//!
//! The root folder holds everything the worker persists: the SQLite database,
//! the download cache, finished mixtapes, and the bundled effect files.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable consulted when no command-line argument is given
pub const ROOT_ENV_VAR: &str = "CLUB100_ROOT";

/// Resolve the root folder in priority order:
/// 1. Command-line argument (highest priority)
/// 2. `CLUB100_ROOT` environment variable
/// 3. `root_folder` key in the TOML config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(cli_arg: Option<&str>) -> PathBuf {
    if let Some(path) = cli_arg {
        return PathBuf::from(path);
    }

    if let Ok(path) = std::env::var(ROOT_ENV_VAR) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(config_path) = default_config_file() {
        if let Ok(content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<toml::Value>(&content) {
                if let Some(root) = config.get("root_folder").and_then(|v| v.as_str()) {
                    return PathBuf::from(root);
                }
            }
        }
    }

    default_root_folder()
}

/// Platform config file location (`~/.config/club100/club100.toml` on Linux)
pub fn default_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("club100").join("club100.toml"))
}

/// OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("club100"))
        .unwrap_or_else(|| PathBuf::from("./club100_data"))
}

/// On-disk layout derived from the root folder
#[derive(Debug, Clone)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// SQLite database file
    pub fn database_path(&self) -> PathBuf {
        self.root.join("club100.db")
    }

    /// Persistent full-length download cache
    pub fn cache_dir(&self) -> PathBuf {
        self.root.join("cache")
    }

    /// Finished mixtapes
    pub fn output_dir(&self) -> PathBuf {
        self.root.join("output")
    }

    /// Bundled effect audio files
    pub fn effects_dir(&self) -> PathBuf {
        self.root.join("effects")
    }

    /// Create the root folder and all derived directories if missing
    pub fn ensure_directories(&self) -> Result<()> {
        for dir in [
            self.root.clone(),
            self.cache_dir(),
            self.output_dir(),
            self.effects_dir(),
        ] {
            std::fs::create_dir_all(&dir)
                .map_err(|e| Error::Config(format!("Cannot create {}: {}", dir.display(), e)))?;
        }
        Ok(())
    }
}

/// Worker tunables, loaded from the TOML config file when present
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// HTTP bind address
    pub bind_address: String,
    /// Concurrent workers per fan-out round
    pub workers: usize,
    /// Length of the song window taken from each source, in seconds
    pub segment_seconds: u64,
    /// Cache entries older than this many days are swept
    pub cache_ttl_days: u64,
    /// Hard timeout applied to every external tool invocation, in seconds
    pub tool_timeout_secs: u64,
    /// Snippet language used when a request does not specify one
    pub default_language: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:5001".to_string(),
            workers: 4,
            segment_seconds: 60,
            cache_ttl_days: 7,
            tool_timeout_secs: 300,
            default_language: "da".to_string(),
        }
    }
}

impl WorkerConfig {
    /// Load from the default config file, falling back to defaults when the
    /// file is absent. A present-but-malformed file is a hard error so typos
    /// do not silently revert tunables.
    pub fn load() -> Result<Self> {
        match default_config_file() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_argument_wins() {
        let root = resolve_root_folder(Some("/tmp/club100-test"));
        assert_eq!(root, PathBuf::from("/tmp/club100-test"));
    }

    #[test]
    fn layout_derives_paths_from_root() {
        let layout = Layout::new("/data/club100");
        assert_eq!(layout.database_path(), PathBuf::from("/data/club100/club100.db"));
        assert_eq!(layout.cache_dir(), PathBuf::from("/data/club100/cache"));
        assert_eq!(layout.output_dir(), PathBuf::from("/data/club100/output"));
        assert_eq!(layout.effects_dir(), PathBuf::from("/data/club100/effects"));
    }

    #[test]
    fn ensure_directories_creates_tree() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = Layout::new(tmp.path().join("root"));
        layout.ensure_directories().unwrap();
        assert!(layout.cache_dir().is_dir());
        assert!(layout.output_dir().is_dir());
        assert!(layout.effects_dir().is_dir());
    }

    #[test]
    fn worker_config_defaults() {
        let config = WorkerConfig::default();
        assert_eq!(config.workers, 4);
        assert_eq!(config.segment_seconds, 60);
        assert_eq!(config.cache_ttl_days, 7);
        assert_eq!(config.default_language, "da");
    }

    #[test]
    fn worker_config_partial_file_keeps_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("club100.toml");
        std::fs::write(&path, "workers = 8\ndefault_language = \"en\"\n").unwrap();
        let config = WorkerConfig::load_from(&path).unwrap();
        assert_eq!(config.workers, 8);
        assert_eq!(config.default_language, "en");
        assert_eq!(config.segment_seconds, 60);
    }

    #[test]
    fn worker_config_malformed_file_errors() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("club100.toml");
        std::fs::write(&path, "workers = \"many\"").unwrap();
        assert!(WorkerConfig::load_from(&path).is_err());
    }
}
