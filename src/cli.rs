//! Shared CLI helpers and small reusable Clap fragments

use anyhow::{Context, Result};
use clap::{ArgAction, Args, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{load_config, ClientConfig, ServerConfig};
use crate::logger::{JsonLogger, Logger, NoopLogger, TextLogger};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Log file selection shared by both binaries
#[derive(Clone, Debug, Default, Args)]
pub struct LogOpts {
    /// Append log entries to this file
    #[arg(long = "log-file")]
    pub log_file: Option<PathBuf>,

    /// Format of --log-file entries
    #[arg(long = "log-format", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl LogOpts {
    /// Choose logger once; NoopLogger when no file was requested
    pub fn build_logger(&self) -> Result<Arc<dyn Logger>> {
        let Some(ref p) = self.log_file else {
            return Ok(Arc::new(NoopLogger));
        };
        let logger: Arc<dyn Logger> = match self.log_format {
            LogFormat::Text => Arc::new(
                TextLogger::new(p).with_context(|| format!("open log file {}", p.display()))?,
            ),
            LogFormat::Json => Arc::new(
                JsonLogger::new(p).with_context(|| format!("open log file {}", p.display()))?,
            ),
        };
        Ok(logger)
    }
}

/// Daemon options used by tcpdropd and `tcpdrop --serve`
#[derive(Clone, Debug, Default, Args)]
pub struct DaemonOpts {
    /// Bind address (host or host:port); defaults to the outbound interface
    #[arg(long)]
    pub bind: Option<String>,

    /// Port to listen on when --bind has none [default: 12345]
    #[arg(long)]
    pub port: Option<u16>,

    /// Directory that receives files [default: .]
    #[arg(long)]
    pub dest: Option<PathBuf>,

    /// Reject frames whose name is longer than this many bytes [default: 4096]
    #[arg(long = "max-name-len")]
    pub max_name_len: Option<u32>,

    /// Reject frames whose payload is larger than this many bytes
    #[arg(long = "max-file-size")]
    pub max_file_size: Option<u64>,

    /// Serve up to N connections at once (1 = one at a time) [default: 1]
    #[arg(long = "max-connections")]
    pub max_connections: Option<usize>,

    /// Accept poll / shutdown check interval in milliseconds [default: 100]
    #[arg(long = "poll-ms")]
    pub poll_ms: Option<u64>,

    /// TOML config file (default: ~/.config/tcpdrop/tcpdrop.toml if present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub log: LogOpts,
}

impl DaemonOpts {
    /// File values first, then any flag given on the command line
    pub fn server_config(&self) -> Result<ServerConfig> {
        let mut cfg = load_config(self.config.as_deref())?.server;
        if let Some(ref d) = self.dest {
            cfg.dest_dir = d.clone();
        }
        if let Some(p) = self.port {
            cfg.port = p;
        }
        if let Some(n) = self.max_name_len {
            cfg.max_name_len = n;
        }
        if let Some(n) = self.max_file_size {
            cfg.max_file_size = Some(n);
        }
        if let Some(n) = self.max_connections {
            cfg.max_connections = n;
        }
        if let Some(ms) = self.poll_ms {
            cfg.poll_interval_ms = ms;
        }
        Ok(cfg)
    }
}

/// Client options: what to send and where
#[derive(Clone, Debug, Default, Args)]
pub struct SendOpts {
    /// File to send, or directory whose top-level files are sent
    #[arg(required_unless_present = "serve")]
    pub source: Option<PathBuf>,

    /// Server host or host:port
    #[arg(required_unless_present = "serve")]
    pub host: Option<String>,

    /// Server port when HOST has none [default: 12345]
    #[arg(long)]
    pub port: Option<u16>,

    /// Show a progress bar per file
    #[arg(short, long)]
    pub progress: bool,

    /// Exclude files matching patterns in directory mode
    #[arg(long = "xf", action = ArgAction::Append)]
    pub exclude_files: Vec<String>,

    /// Keep directory listing order instead of sorting by name
    #[arg(long)]
    pub unsorted: bool,

    /// Connection timeout in milliseconds [default: 5000]
    #[arg(long = "connect-timeout-ms")]
    pub connect_timeout_ms: Option<u64>,

    /// TOML config file (default: ~/.config/tcpdrop/tcpdrop.toml if present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub log: LogOpts,
}

impl SendOpts {
    pub fn client_config(&self) -> Result<ClientConfig> {
        let mut cfg = load_config(self.config.as_deref())?.client;
        if let Some(p) = self.port {
            cfg.port = p;
        }
        if let Some(ms) = self.connect_timeout_ms {
            cfg.connect_timeout_ms = ms;
        }
        if self.unsorted {
            cfg.sort_batch = false;
        }
        cfg.exclude_files.extend(self.exclude_files.iter().cloned());
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct DaemonCli {
        #[command(flatten)]
        opts: DaemonOpts,
    }

    #[derive(Parser, Debug)]
    struct SendCli {
        #[arg(long)]
        serve: bool,
        #[command(flatten)]
        opts: SendOpts,
    }

    fn empty_config() -> (tempfile::TempDir, String) {
        let tmp = tempfile::tempdir().unwrap();
        let p = tmp.path().join("cfg.toml");
        std::fs::write(&p, "").unwrap();
        let s = p.to_string_lossy().into_owned();
        (tmp, s)
    }

    #[test]
    fn test_daemon_flags_override_defaults() {
        let (_tmp, cfg_path) = empty_config();
        let cli = DaemonCli::parse_from([
            "tcpdropd",
            "--config",
            &cfg_path,
            "--dest",
            "./recv",
            "--max-connections",
            "3",
            "--poll-ms",
            "20",
        ]);
        let cfg = cli.opts.server_config().unwrap();
        assert_eq!(cfg.dest_dir, PathBuf::from("./recv"));
        assert_eq!(cfg.max_connections, 3);
        assert_eq!(cfg.poll_interval_ms, 20);
        assert_eq!(cfg.port, 12345);
    }

    #[test]
    fn test_send_opts_positional_and_excludes() {
        let (_tmp, cfg_path) = empty_config();
        let cli = SendCli::parse_from([
            "tcpdrop",
            "--config",
            &cfg_path,
            "./outbox",
            "10.0.0.2",
            "--xf",
            "*.tmp",
            "--xf",
            "*.part",
            "--unsorted",
        ]);
        assert_eq!(cli.opts.source, Some(PathBuf::from("./outbox")));
        assert_eq!(cli.opts.host.as_deref(), Some("10.0.0.2"));
        let cfg = cli.opts.client_config().unwrap();
        assert_eq!(cfg.exclude_files, vec!["*.tmp", "*.part"]);
        assert!(!cfg.sort_batch);
    }

    #[test]
    fn test_send_opts_not_required_with_serve() {
        let cli = SendCli::try_parse_from(["tcpdrop", "--serve"]).unwrap();
        assert!(cli.serve);
        assert!(cli.opts.source.is_none());
        assert!(SendCli::try_parse_from(["tcpdrop"]).is_err());
    }

    #[test]
    fn test_log_format_json() {
        let tmp = tempfile::tempdir().unwrap();
        let opts = LogOpts {
            log_file: Some(tmp.path().join("x.jsonl")),
            log_format: LogFormat::Json,
        };
        let logger = opts.build_logger().unwrap();
        logger.error("test", "boom");
        let text = std::fs::read_to_string(tmp.path().join("x.jsonl")).unwrap();
        assert!(text.contains("\"event\":\"error\""));
    }
}
