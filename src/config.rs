//! Server and client settings, with optional TOML file overrides
//!
//! ```toml
//! [server]
//! dest_dir = "/srv/inbox"
//! max_connections = 4
//!
//! [client]
//! exclude_files = ["*.tmp"]
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::protocol::{timeouts, DEFAULT_CHUNK_SIZE, DEFAULT_MAX_NAME_LEN, DEFAULT_PORT};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Where received files land; created if missing
    pub dest_dir: PathBuf,
    pub port: u16,
    pub max_name_len: u32,
    /// Frames declaring a bigger payload are refused (None = unlimited)
    pub max_file_size: Option<u64>,
    pub chunk_size: usize,
    /// Accept poll and socket read timeout; bounds shutdown latency
    pub poll_interval_ms: u64,
    /// 1 = serve sessions one at a time on the accept thread
    pub max_connections: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            dest_dir: PathBuf::from("."),
            port: DEFAULT_PORT,
            max_name_len: DEFAULT_MAX_NAME_LEN,
            max_file_size: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
            poll_interval_ms: timeouts::POLL_MS,
            max_connections: 1,
        }
    }
}

impl ServerConfig {
    pub fn with_dest<P: Into<PathBuf>>(dest_dir: P) -> Self {
        Self {
            dest_dir: dest_dir.into(),
            ..Self::default()
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    pub port: u16,
    pub connect_timeout_ms: u64,
    /// How long to wait for the server to hang up after the last frame
    pub close_timeout_ms: u64,
    pub chunk_size: usize,
    /// Send batch files in file-name order instead of listing order
    pub sort_batch: bool,
    /// Glob patterns (`*` wildcards) skipped in batch mode
    pub exclude_files: Vec<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            connect_timeout_ms: timeouts::CONNECT_MS,
            close_timeout_ms: timeouts::CLOSE_WAIT_MS,
            chunk_size: DEFAULT_CHUNK_SIZE,
            sort_batch: true,
            exclude_files: Vec::new(),
        }
    }
}

impl ClientConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms.max(1))
    }

    pub fn close_timeout(&self) -> Duration {
        Duration::from_millis(self.close_timeout_ms.max(1))
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FileConfig {
    pub server: ServerConfig,
    pub client: ClientConfig,
}

pub fn config_dir() -> PathBuf {
    #[cfg(windows)]
    {
        if let Ok(appdata) = std::env::var("APPDATA") {
            return PathBuf::from(appdata).join("tcpdrop");
        }
    }
    // Unix-like default
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".config").join("tcpdrop");
    }
    PathBuf::from(".tcpdrop")
}

pub fn default_config_path() -> PathBuf {
    config_dir().join("tcpdrop.toml")
}

/// Load settings from `path`, or from the default location when `path` is
/// None. An explicit path must exist; a missing default file means defaults.
pub fn load_config(path: Option<&Path>) -> Result<FileConfig> {
    let (p, required) = match path {
        Some(p) => (p.to_path_buf(), true),
        None => (default_config_path(), false),
    };
    match std::fs::read_to_string(&p) {
        Ok(data) => parse_config(&data).with_context(|| format!("parse config {}", p.display())),
        Err(e) if !required && e.kind() == std::io::ErrorKind::NotFound => Ok(FileConfig::default()),
        Err(e) => Err(e).with_context(|| format!("read config {}", p.display())),
    }
}

pub fn parse_config(data: &str) -> Result<FileConfig> {
    Ok(toml::from_str(data)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_default() {
        let cfg = parse_config("").unwrap();
        assert_eq!(cfg, FileConfig::default());
        assert_eq!(cfg.server.port, 12345);
        assert_eq!(cfg.server.max_connections, 1);
        assert!(cfg.client.sort_batch);
    }

    #[test]
    fn test_partial_tables_keep_defaults() {
        let cfg = parse_config(
            r#"
            [server]
            dest_dir = "/srv/inbox"
            max_connections = 4
            max_file_size = 1048576

            [client]
            exclude_files = ["*.tmp", "*.part"]
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.dest_dir, PathBuf::from("/srv/inbox"));
        assert_eq!(cfg.server.max_connections, 4);
        assert_eq!(cfg.server.max_file_size, Some(1_048_576));
        assert_eq!(cfg.server.max_name_len, DEFAULT_MAX_NAME_LEN);
        assert_eq!(cfg.client.exclude_files.len(), 2);
        assert_eq!(cfg.client.connect_timeout_ms, timeouts::CONNECT_MS);
    }

    #[test]
    fn test_unknown_types_rejected() {
        assert!(parse_config("[server]\nport = \"not a port\"").is_err());
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(load_config(Some(&tmp.path().join("nope.toml"))).is_err());
    }

    #[test]
    fn test_load_config_from_file() {
        let tmp = tempfile::tempdir().unwrap();
        let p = tmp.path().join("tcpdrop.toml");
        std::fs::write(&p, "[client]\nport = 9000\n").unwrap();
        let cfg = load_config(Some(&p)).unwrap();
        assert_eq!(cfg.client.port, 9000);
        assert_eq!(cfg.server.port, DEFAULT_PORT);
    }

    #[test]
    fn test_poll_interval_never_zero() {
        let cfg = ServerConfig {
            poll_interval_ms: 0,
            ..ServerConfig::default()
        };
        assert_eq!(cfg.poll_interval(), Duration::from_millis(1));
    }
}
