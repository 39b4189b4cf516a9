//! TCP transport: the receiving daemon and the sending client.
//!
//! Both sides speak the frame format from `protocol`. The server reads frames
//! until the peer closes; the client writes frames and then half-closes its
//! side, waiting for the server to hang up so that "done" means "persisted".

use std::io;
use std::net::{IpAddr, UdpSocket};
use std::time::Duration;

use crate::protocol::ROUTE_PROBE_ADDR;

/// Totals for a session, a job, or the lifetime of a server.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TransferStats {
    pub files: u64,
    pub bytes: u64,
    pub elapsed: Duration,
}

impl TransferStats {
    pub fn merge(&mut self, other: &TransferStats) {
        self.files += other.files;
        self.bytes += other.bytes;
    }

    pub fn throughput_mb_s(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs <= 0.0 {
            return 0.0;
        }
        self.bytes as f64 / secs / 1_048_576.0
    }
}

/// Address of the interface that routes to the outside world.
///
/// Connecting a UDP socket only selects a route; no datagram is sent.
pub fn outbound_local_ip() -> io::Result<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0")?;
    socket.connect(ROUTE_PROBE_ADDR)?;
    Ok(socket.local_addr()?.ip())
}

pub mod server {
    use super::TransferStats;
    use crate::config::ServerConfig;
    use crate::error::{Cancelled, Result, TransferError};
    use crate::logger::{Logger, NoopLogger};
    use crate::path_lock::PathLocks;
    use crate::protocol_core::{decode_header, ensure_dir_exists, normalize_under_root, stream_payload, FrameHeader};
    use parking_lot::Mutex;
    use std::fs::File;
    use std::io::{self, ErrorKind, Read};
    use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread::{self, JoinHandle};
    use std::time::{Duration, Instant};

    /// Cloneable request to stop a running `Server`.
    ///
    /// Signal handlers capture a clone and call `shutdown()`; the accept loop
    /// and every session notice within one poll interval.
    #[derive(Clone, Debug, Default)]
    pub struct ShutdownHandle {
        flag: Arc<AtomicBool>,
    }

    impl ShutdownHandle {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn shutdown(&self) {
            self.flag.store(true, Ordering::SeqCst);
        }

        pub fn is_shutdown(&self) -> bool {
            self.flag.load(Ordering::SeqCst)
        }
    }

    /// One accepted connection, from the receiver's point of view.
    #[derive(Debug, Clone)]
    pub struct Session {
        pub id: String,
        pub peer: String,
        pub stats: TransferStats,
        started: Instant,
    }

    impl Session {
        pub fn new(peer: impl Into<String>) -> Self {
            let id = uuid::Uuid::new_v4().simple().to_string();
            Self {
                id: id[..8].to_string(),
                peer: peer.into(),
                stats: TransferStats::default(),
                started: Instant::now(),
            }
        }

        pub fn elapsed(&self) -> Duration {
            self.started.elapsed()
        }
    }

    /// Socket reader whose timeouts turn into shutdown checks.
    ///
    /// The socket carries a read timeout of one poll interval. A timed-out read
    /// is retried unless shutdown was requested, in which case the read fails
    /// with a `Cancelled` marker that surfaces as `ShutdownRequested`.
    struct ShutdownAwareStream<'a> {
        stream: &'a TcpStream,
        shutdown: &'a ShutdownHandle,
    }

    impl Read for ShutdownAwareStream<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            loop {
                let mut s = self.stream;
                match s.read(buf) {
                    Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                        if self.shutdown.is_shutdown() {
                            return Err(Cancelled::io_error());
                        }
                    }
                    other => return other,
                }
            }
        }
    }

    /// Connection handler: turns a stream of frames into files under `dest`.
    #[derive(Clone)]
    pub struct FileReceiver {
        dest: PathBuf,
        max_name_len: u32,
        max_file_size: Option<u64>,
        chunk_size: usize,
        locks: Arc<PathLocks>,
        logger: Arc<dyn Logger>,
        shutdown: ShutdownHandle,
    }

    impl FileReceiver {
        /// Creates the destination directory if absent.
        pub fn new(config: &ServerConfig) -> Result<Self> {
            ensure_dir_exists(&config.dest_dir)?;
            let dest = config
                .dest_dir
                .canonicalize()
                .map_err(|e| TransferError::file_io(&config.dest_dir, e))?;
            Ok(Self {
                dest,
                max_name_len: config.max_name_len,
                max_file_size: config.max_file_size,
                chunk_size: config.chunk_size,
                locks: PathLocks::new(),
                logger: Arc::new(NoopLogger),
                shutdown: ShutdownHandle::new(),
            })
        }

        pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
            self.logger = logger;
            self
        }

        pub fn with_shutdown(mut self, shutdown: ShutdownHandle) -> Self {
            self.shutdown = shutdown;
            self
        }

        /// Canonical destination directory
        pub fn dest(&self) -> &Path {
            &self.dest
        }

        /// Receive frames until the peer closes on a frame boundary.
        ///
        /// Frames are handled strictly in arrival order. `session.stats` counts
        /// the files completed so far, also when an error ends the session.
        pub fn handle_conn<R: Read + ?Sized>(&self, reader: &mut R, session: &mut Session) -> Result<()> {
            loop {
                if self.shutdown.is_shutdown() {
                    return Err(TransferError::ShutdownRequested);
                }
                let Some(header) = decode_header(reader, self.max_name_len)? else {
                    break;
                };
                let bytes = self.receive_file(reader, &header, session)?;
                session.stats.files += 1;
                session.stats.bytes += bytes;
            }
            session.stats.elapsed = session.elapsed();
            Ok(())
        }

        fn receive_file<R: Read + ?Sized>(
            &self,
            reader: &mut R,
            header: &FrameHeader,
            session: &Session,
        ) -> Result<u64> {
            if let Some(max) = self.max_file_size {
                if header.size > max {
                    return Err(TransferError::FileTooLarge {
                        size: header.size,
                        max,
                    });
                }
            }
            let dst = normalize_under_root(&self.dest, &header.name)?;

            let _guard = self.locks.lock(&dst);
            // The previous holder may have been cancelled; don't truncate after shutdown
            if self.shutdown.is_shutdown() {
                return Err(TransferError::ShutdownRequested);
            }
            let mut file = File::create(&dst).map_err(|e| TransferError::file_io(&dst, e))?;
            let bytes = stream_payload(reader, header.size, &mut file, &dst, self.chunk_size, |_| {})?;

            eprintln!(
                "File {} has been received and saved ({} bytes)",
                header.name, bytes
            );
            self.logger.file_received(&session.id, &header.name, &dst, bytes);
            Ok(bytes)
        }

        /// Run one accepted socket to completion. Errors are logged here and
        /// never propagate to the accept loop.
        pub fn serve_stream(&self, stream: TcpStream, peer: SocketAddr, poll: Duration) -> TransferStats {
            let mut session = Session::new(peer.to_string());
            // Accepted sockets can inherit non-blocking mode from the listener
            if let Err(e) = stream
                .set_nonblocking(false)
                .and_then(|_| stream.set_read_timeout(Some(poll)))
            {
                eprintln!("socket setup failed for {}: {}", peer, e);
                self.logger.error("socket", &e.to_string());
                return TransferStats::default();
            }
            let _ = stream.set_nodelay(true);

            eprintln!("Connection from {} (session {})", peer, session.id);
            self.logger.session_start(&session.id, &session.peer);

            let mut reader = ShutdownAwareStream {
                stream: &stream,
                shutdown: &self.shutdown,
            };
            let result = self.handle_conn(&mut reader, &mut session);
            // Only a clean session gets a FIN. On error the socket is dropped with
            // unread input, which resets the connection and fails the sender.
            if result.is_ok() {
                let _ = stream.shutdown(Shutdown::Both);
            }
            session.stats.elapsed = session.elapsed();

            match result {
                Ok(()) => {
                    eprintln!(
                        "Session {} from {} closed: {} files, {} bytes",
                        session.id, peer, session.stats.files, session.stats.bytes
                    );
                }
                Err(TransferError::ShutdownRequested) => {
                    eprintln!("Session {} from {} cancelled by shutdown", session.id, peer);
                    self.logger.error(&format!("session {}", session.id), "shutdown requested");
                }
                Err(e) => {
                    eprintln!("Session {} from {} aborted: {}", session.id, peer, e);
                    self.logger.error(&format!("session {}", session.id), &e.to_string());
                }
            }
            self.logger.session_end(
                &session.id,
                session.stats.files,
                session.stats.bytes,
                session.stats.elapsed.as_secs_f64(),
            );
            session.stats
        }
    }

    /// Listening socket plus everything needed to serve it.
    pub struct Server {
        listener: TcpListener,
        config: ServerConfig,
        receiver: FileReceiver,
        shutdown: ShutdownHandle,
        logger: Arc<dyn Logger>,
    }

    impl Server {
        pub fn bind<A: ToSocketAddrs>(addr: A, config: ServerConfig) -> Result<Self> {
            let shutdown = ShutdownHandle::new();
            let receiver = FileReceiver::new(&config)?.with_shutdown(shutdown.clone());
            let listener = TcpListener::bind(addr)?;
            listener.set_nonblocking(true)?;
            Ok(Self {
                listener,
                config,
                receiver,
                shutdown,
                logger: Arc::new(NoopLogger),
            })
        }

        pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
            self.receiver = self.receiver.with_logger(Arc::clone(&logger));
            self.logger = logger;
            self
        }

        pub fn local_addr(&self) -> Result<SocketAddr> {
            Ok(self.listener.local_addr()?)
        }

        pub fn dest(&self) -> &Path {
            self.receiver.dest()
        }

        pub fn shutdown_handle(&self) -> ShutdownHandle {
            self.shutdown.clone()
        }

        /// Accept loop. Returns once shutdown is requested; the listener is
        /// closed before returning, so the port is free again.
        pub fn run(self) -> Result<TransferStats> {
            let Server {
                listener,
                config,
                receiver,
                shutdown,
                logger,
            } = self;

            let addr = listener.local_addr()?;
            eprintln!(
                "tcpdrop listening on {} dest={}",
                addr,
                receiver.dest().display()
            );
            logger.listening(&addr.to_string(), receiver.dest());

            let poll = config.poll_interval();
            let max_conns = config.max_connections.max(1);
            let started = Instant::now();
            let totals = Arc::new(Mutex::new(TransferStats::default()));
            let active = Arc::new(AtomicUsize::new(0));
            let mut workers: Vec<JoinHandle<()>> = Vec::new();

            while !shutdown.is_shutdown() {
                if max_conns > 1 && active.load(Ordering::SeqCst) >= max_conns {
                    // Extra clients wait in the TCP backlog
                    thread::sleep(poll);
                    workers.retain(|h| !h.is_finished());
                    continue;
                }
                match listener.accept() {
                    Ok((stream, peer)) => {
                        if max_conns == 1 {
                            let stats = receiver.serve_stream(stream, peer, poll);
                            totals.lock().merge(&stats);
                        } else {
                            active.fetch_add(1, Ordering::SeqCst);
                            let receiver = receiver.clone();
                            let totals = Arc::clone(&totals);
                            let worker_active = Arc::clone(&active);
                            let spawned = thread::Builder::new()
                                .name(format!("tcpdrop-{}", peer))
                                .spawn(move || {
                                    let stats = receiver.serve_stream(stream, peer, poll);
                                    totals.lock().merge(&stats);
                                    worker_active.fetch_sub(1, Ordering::SeqCst);
                                });
                            match spawned {
                                Ok(h) => workers.push(h),
                                Err(e) => {
                                    active.fetch_sub(1, Ordering::SeqCst);
                                    eprintln!("failed to spawn session thread: {}", e);
                                    logger.error("spawn", &e.to_string());
                                }
                            }
                        }
                    }
                    Err(e) if e.kind() == ErrorKind::WouldBlock => thread::sleep(poll),
                    Err(e) if e.kind() == ErrorKind::Interrupted => {}
                    Err(e) => {
                        eprintln!("accept error: {}", e);
                        logger.error("accept", &e.to_string());
                        thread::sleep(poll);
                    }
                }
                workers.retain(|h| !h.is_finished());
            }

            drop(listener);
            eprintln!("\nShutdown requested, stopped listening on {}", addr);
            for h in workers {
                let _ = h.join();
            }

            let mut totals = *totals.lock();
            totals.elapsed = started.elapsed();
            Ok(totals)
        }
    }

}

pub mod client {
    use super::TransferStats;
    use crate::config::ClientConfig;
    use crate::error::{Result, TransferError};
    use crate::fs_enum::{enumerate_top_level, FileEntry, FileFilter};
    use crate::logger::{Logger, NoopLogger};
    use crate::progress::{NoopProgress, ProgressSink};
    use crate::protocol_core::{encode_header, send_payload};
    use std::fs::File;
    use std::io::{ErrorKind, Read, Write};
    use std::net::{IpAddr, Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
    use std::path::Path;
    use std::sync::Arc;
    use std::time::Instant;

    /// Ordered list of files to push over one connection.
    #[derive(Debug, Clone, Default)]
    pub struct TransferJob {
        entries: Vec<FileEntry>,
    }

    impl TransferJob {
        pub fn single(path: &Path) -> Result<Self> {
            Ok(Self {
                entries: vec![FileEntry::from_path(path)?],
            })
        }

        /// Top-level regular files of `dir`; subdirectories are not entered.
        pub fn from_dir(dir: &Path, filter: &FileFilter, sorted: bool) -> Result<Self> {
            Ok(Self {
                entries: enumerate_top_level(dir, filter, sorted)?,
            })
        }

        pub fn entries(&self) -> &[FileEntry] {
            &self.entries
        }

        pub fn len(&self) -> usize {
            self.entries.len()
        }

        pub fn is_empty(&self) -> bool {
            self.entries.is_empty()
        }

        pub fn total_bytes(&self) -> u64 {
            self.entries.iter().map(|e| e.size).sum()
        }
    }

    /// Append the default port unless `addr` already carries one.
    pub fn with_default_port(addr: &str, port: u16) -> String {
        if addr.parse::<SocketAddr>().is_ok() {
            return addr.to_string();
        }
        if let Ok(ip) = addr.trim_matches(|c| c == '[' || c == ']').parse::<IpAddr>() {
            return SocketAddr::new(ip, port).to_string();
        }
        if addr
            .rsplit_once(':')
            .map_or(false, |(_, p)| p.parse::<u16>().is_ok())
        {
            return addr.to_string();
        }
        format!("{}:{}", addr, port)
    }

    pub struct Client {
        config: ClientConfig,
        progress: Arc<dyn ProgressSink>,
        logger: Arc<dyn Logger>,
    }

    impl Client {
        pub fn new(config: ClientConfig) -> Self {
            Self {
                config,
                progress: Arc::new(NoopProgress),
                logger: Arc::new(NoopLogger),
            }
        }

        pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
            self.progress = progress;
            self
        }

        pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
            self.logger = logger;
            self
        }

        /// Connect with the configured timeout, trying every resolved address.
        pub fn connect(&self, addr: &str) -> Result<TcpStream> {
            let target = with_default_port(addr, self.config.port);
            let addrs = target.to_socket_addrs().map_err(|source| TransferError::Connect {
                addr: target.clone(),
                source,
            })?;
            let mut last_err = None;
            for sa in addrs {
                match TcpStream::connect_timeout(&sa, self.config.connect_timeout()) {
                    Ok(stream) => {
                        let _ = stream.set_nodelay(true);
                        return Ok(stream);
                    }
                    Err(e) => last_err = Some(e),
                }
            }
            Err(TransferError::Connect {
                addr: target,
                source: last_err.unwrap_or_else(|| {
                    std::io::Error::new(ErrorKind::AddrNotAvailable, "address resolved to nothing")
                }),
            })
        }

        /// Send one file over its own connection.
        ///
        /// The source is checked before connecting, so a missing file never
        /// opens a connection.
        pub fn send_one(&self, addr: &str, path: &Path) -> Result<TransferStats> {
            let job = TransferJob::single(path)?;
            self.run_job(addr, &job)
        }

        /// Send every top-level file in `dir` over a single connection.
        pub fn send_batch(&self, addr: &str, dir: &Path) -> Result<TransferStats> {
            let filter = FileFilter {
                exclude_files: self.config.exclude_files.clone(),
                ..FileFilter::default()
            };
            let job = TransferJob::from_dir(dir, &filter, self.config.sort_batch)?;
            self.run_job(addr, &job)
        }

        /// Connect, send the job, then close and wait for the server to hang
        /// up. The first error aborts the job; nothing is retried.
        pub fn run_job(&self, addr: &str, job: &TransferJob) -> Result<TransferStats> {
            let mut stream = self.connect(addr)?;
            let stats = self.send_job(&mut stream, job)?;
            stream.shutdown(Shutdown::Write)?;
            self.wait_for_close(&stream)?;
            Ok(stats)
        }

        /// The server closes its end once every frame is on disk. Waiting for
        /// that makes completion mean "persisted", without any extra bytes on
        /// the wire. A reset means the server refused a frame. Hitting the
        /// close timeout is not an error.
        fn wait_for_close(&self, stream: &TcpStream) -> Result<()> {
            stream.set_read_timeout(Some(self.config.close_timeout()))?;
            let mut s = stream;
            let mut buf = [0u8; 64];
            loop {
                match s.read(&mut buf) {
                    Ok(0) => return Ok(()),
                    Ok(_) => continue,
                    Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                    Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                        return Ok(())
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        }

        /// Write every frame of `job` to `w`, in job order.
        pub fn send_job<W: Write + ?Sized>(&self, w: &mut W, job: &TransferJob) -> Result<TransferStats> {
            let started = Instant::now();
            let mut stats = TransferStats::default();
            for entry in job.entries() {
                stats.bytes += self.send_file(w, entry)?;
                stats.files += 1;
            }
            stats.elapsed = started.elapsed();
            Ok(stats)
        }

        /// Write one frame: header, then exactly `entry.size` bytes.
        pub fn send_file<W: Write + ?Sized>(&self, w: &mut W, entry: &FileEntry) -> Result<u64> {
            let mut file = File::open(&entry.path).map_err(|e| {
                if e.kind() == ErrorKind::NotFound {
                    TransferError::FileNotFound(entry.path.clone())
                } else {
                    TransferError::file_io(&entry.path, e)
                }
            })?;
            let header = encode_header(&entry.name, entry.size)?;
            w.write_all(&header)?;

            let total = entry.size;
            self.progress.begin(&entry.name, total);
            let sent = send_payload(
                &mut file,
                &entry.path,
                total,
                w,
                self.config.chunk_size,
                |sent| self.progress.advance(sent, total),
            )?;
            self.progress.finish(&entry.name, sent);
            self.logger.file_sent(&entry.name, &entry.path, sent);
            Ok(sent)
        }
    }

    /// `Client::send_one` with default settings
    pub fn send_one(addr: &str, path: &Path) -> Result<TransferStats> {
        Client::new(ClientConfig::default()).send_one(addr, path)
    }

    /// `Client::send_batch` with default settings
    pub fn send_batch(addr: &str, dir: &Path) -> Result<TransferStats> {
        Client::new(ClientConfig::default()).send_batch(addr, dir)
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::config::ServerConfig;
        use crate::net::server::{FileReceiver, Session};
        use crate::progress::{ProgressEvent, RecordingProgress};
        use crate::protocol_core::decode_header;
        use std::io::Cursor;
        use tempfile::TempDir;

        #[test]
        fn test_with_default_port() {
            assert_eq!(with_default_port("10.0.0.5", 12345), "10.0.0.5:12345");
            assert_eq!(with_default_port("10.0.0.5:9000", 12345), "10.0.0.5:9000");
            assert_eq!(with_default_port("example.com", 12345), "example.com:12345");
            assert_eq!(with_default_port("example.com:80", 12345), "example.com:80");
            assert_eq!(with_default_port("::1", 12345), "[::1]:12345");
            assert_eq!(with_default_port("[::1]:7", 12345), "[::1]:7");
        }

        #[test]
        fn test_send_job_wire_format_and_progress() {
            let src = TempDir::new().unwrap();
            std::fs::write(src.path().join("a.txt"), b"abc").unwrap();
            std::fs::write(src.path().join("b.txt"), vec![5u8; 10]).unwrap();
            let job = TransferJob::from_dir(src.path(), &FileFilter::default(), true).unwrap();
            assert_eq!(job.len(), 2);
            assert_eq!(job.total_bytes(), 13);

            let progress = Arc::new(RecordingProgress::default());
            let config = ClientConfig {
                chunk_size: 4,
                ..ClientConfig::default()
            };
            let client = Client::new(config).with_progress(progress.clone());
            let mut wire = Vec::new();
            let stats = client.send_job(&mut wire, &job).unwrap();
            assert_eq!(stats.files, 2);
            assert_eq!(stats.bytes, 13);

            let mut r = Cursor::new(wire);
            let first = decode_header(&mut r, 4096).unwrap().unwrap();
            assert_eq!((first.name.as_str(), first.size), ("a.txt", 3));

            let events = progress.events();
            assert_eq!(events[0], ProgressEvent::Begin("a.txt".into(), 3));
            assert_eq!(events[1], ProgressEvent::Advance(3, 3));
            assert_eq!(events[2], ProgressEvent::Finish("a.txt".into(), 3));
            assert_eq!(events[3], ProgressEvent::Begin("b.txt".into(), 10));
            assert_eq!(events[4], ProgressEvent::Advance(4, 10));
            assert_eq!(events.last().unwrap(), &ProgressEvent::Finish("b.txt".into(), 10));
        }

        #[test]
        fn test_send_job_feeds_receiver() {
            let src = TempDir::new().unwrap();
            let dst = TempDir::new().unwrap();
            std::fs::write(src.path().join("empty"), b"").unwrap();
            std::fs::write(src.path().join("data.bin"), vec![42u8; 200_000]).unwrap();

            let client = Client::new(ClientConfig::default());
            let job = TransferJob::from_dir(src.path(), &FileFilter::default(), true).unwrap();
            let mut wire = Vec::new();
            client.send_job(&mut wire, &job).unwrap();

            let rx = FileReceiver::new(&ServerConfig::with_dest(dst.path())).unwrap();
            let mut session = Session::new("mem");
            rx.handle_conn(&mut Cursor::new(wire), &mut session).unwrap();
            assert_eq!(session.stats.files, 2);
            assert_eq!(
                std::fs::read(dst.path().join("data.bin")).unwrap(),
                vec![42u8; 200_000]
            );
            assert_eq!(std::fs::metadata(dst.path().join("empty")).unwrap().len(), 0);
        }

        #[test]
        fn test_send_one_missing_file_does_not_connect() {
            let tmp = TempDir::new().unwrap();
            // Nothing listens on port 1; FileNotFound must win over Connect
            let err = send_one("127.0.0.1:1", &tmp.path().join("missing.bin")).unwrap_err();
            assert!(matches!(err, TransferError::FileNotFound(_)));
        }

        #[test]
        fn test_send_batch_rejects_file_path() {
            let tmp = TempDir::new().unwrap();
            let f = tmp.path().join("f");
            std::fs::write(&f, b"x").unwrap();
            let err = send_batch("127.0.0.1:1", &f).unwrap_err();
            assert!(matches!(err, TransferError::NotADirectory(_)));
        }

        #[test]
        fn test_connect_error_for_closed_port() {
            let port = {
                let l = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
                l.local_addr().unwrap().port()
            };
            let client = Client::new(ClientConfig::default());
            let err = client.connect(&format!("127.0.0.1:{}", port)).unwrap_err();
            assert!(matches!(err, TransferError::Connect { .. }));
        }
    }
}
