use anyhow::Result;
use chrono::Utc;
use parking_lot::Mutex;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Event sink for server and client activity. Every method defaults to a
/// no-op so implementations only pick the events they care about.
pub trait Logger: Send + Sync {
    fn listening(&self, _addr: &str, _dest: &Path) {}
    fn session_start(&self, _session: &str, _peer: &str) {}
    fn file_received(&self, _session: &str, _name: &str, _path: &Path, _bytes: u64) {}
    fn file_sent(&self, _name: &str, _path: &Path, _bytes: u64) {}
    fn error(&self, _context: &str, _msg: &str) {}
    fn session_end(&self, _session: &str, _files: u64, _bytes: u64, _seconds: f64) {}
}

pub struct NoopLogger;
impl Logger for NoopLogger {}

/// Plain-text log, one `[timestamp] EVENT key=value...` line per event.
pub struct TextLogger {
    file: Mutex<File>,
}

fn open_append(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}

impl TextLogger {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            file: Mutex::new(open_append(path.as_ref())?),
        })
    }

    fn line(&self, s: &str) {
        let mut f = self.file.lock();
        let _ = writeln!(f, "[{}] {}", Utc::now().to_rfc3339(), s);
    }
}

impl Logger for TextLogger {
    fn listening(&self, addr: &str, dest: &Path) {
        self.line(&format!("LISTEN addr={} dest={}", addr, dest.display()));
    }
    fn session_start(&self, session: &str, peer: &str) {
        self.line(&format!("SESSION session={} peer={}", session, peer));
    }
    fn file_received(&self, session: &str, name: &str, path: &Path, bytes: u64) {
        self.line(&format!(
            "RECV session={} name={} path={} bytes={}",
            session,
            name,
            path.display(),
            bytes
        ));
    }
    fn file_sent(&self, name: &str, path: &Path, bytes: u64) {
        self.line(&format!(
            "SEND name={} path={} bytes={}",
            name,
            path.display(),
            bytes
        ));
    }
    fn error(&self, context: &str, msg: &str) {
        self.line(&format!("ERROR ctx={} msg={}", context, msg));
    }
    fn session_end(&self, session: &str, files: u64, bytes: u64, seconds: f64) {
        self.line(&format!(
            "DONE session={session} files={files} bytes={bytes} seconds={seconds:.3}"
        ));
    }
}

#[derive(Serialize, Debug)]
#[serde(tag = "event", rename_all = "snake_case")]
enum LogRecord<'a> {
    Listening {
        addr: &'a str,
        dest: &'a Path,
    },
    SessionStart {
        session: &'a str,
        peer: &'a str,
    },
    FileReceived {
        session: &'a str,
        name: &'a str,
        path: &'a Path,
        bytes: u64,
    },
    FileSent {
        name: &'a str,
        path: &'a Path,
        bytes: u64,
    },
    Error {
        context: &'a str,
        msg: &'a str,
    },
    SessionEnd {
        session: &'a str,
        files: u64,
        bytes: u64,
        seconds: f64,
    },
}

#[derive(Serialize)]
struct Stamped<'a> {
    timestamp: String,
    #[serde(flatten)]
    record: LogRecord<'a>,
}

/// JSON Lines log for machine consumption.
pub struct JsonLogger {
    file: Mutex<File>,
}

impl JsonLogger {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            file: Mutex::new(open_append(path.as_ref())?),
        })
    }

    fn record(&self, record: LogRecord<'_>) {
        let entry = Stamped {
            timestamp: Utc::now().to_rfc3339(),
            record,
        };
        let mut f = self.file.lock();
        if serde_json::to_writer(&mut *f, &entry).is_ok() {
            let _ = f.write_all(b"\n");
        }
    }
}

impl Logger for JsonLogger {
    fn listening(&self, addr: &str, dest: &Path) {
        self.record(LogRecord::Listening { addr, dest });
    }
    fn session_start(&self, session: &str, peer: &str) {
        self.record(LogRecord::SessionStart { session, peer });
    }
    fn file_received(&self, session: &str, name: &str, path: &Path, bytes: u64) {
        self.record(LogRecord::FileReceived {
            session,
            name,
            path,
            bytes,
        });
    }
    fn file_sent(&self, name: &str, path: &Path, bytes: u64) {
        self.record(LogRecord::FileSent { name, path, bytes });
    }
    fn error(&self, context: &str, msg: &str) {
        self.record(LogRecord::Error { context, msg });
    }
    fn session_end(&self, session: &str, files: u64, bytes: u64, seconds: f64) {
        self.record(LogRecord::SessionEnd {
            session,
            files,
            bytes,
            seconds,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_text_logger_lines() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("logs").join("tcpdrop.log");
        let log = TextLogger::new(&path).unwrap();
        log.session_start("ab12", "127.0.0.1:5000");
        log.file_received("ab12", "a.txt", Path::new("/srv/a.txt"), 42);
        log.session_end("ab12", 1, 42, 0.5);

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("SESSION session=ab12 peer=127.0.0.1:5000"));
        assert!(lines[1].contains("RECV session=ab12 name=a.txt"));
        assert!(lines[1].ends_with("bytes=42"));
        assert!(lines[2].contains("files=1 bytes=42 seconds=0.500"));
    }

    #[test]
    fn test_json_logger_records() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("tcpdrop.jsonl");
        let log = JsonLogger::new(&path).unwrap();
        log.file_sent("b.bin", Path::new("src/b.bin"), 7);
        log.error("session", "peer closed early");

        let text = std::fs::read_to_string(&path).unwrap();
        let values: Vec<serde_json::Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(values.len(), 2);
        assert_eq!(values[0]["event"], "file_sent");
        assert_eq!(values[0]["bytes"], 7);
        assert_eq!(values[1]["event"], "error");
        assert_eq!(values[1]["msg"], "peer closed early");
        assert!(values[1]["timestamp"].is_string());
    }
}
