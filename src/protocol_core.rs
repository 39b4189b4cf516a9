//! Frame codec and destination-path helpers shared by server and client
//!
//! Everything here works on plain `Read`/`Write`, so the same functions drive
//! a `TcpStream`, a file, or an in-memory cursor in tests.

use crate::error::{Result, TransferError};
use crate::protocol::{NAME_LEN_BYTES, SIZE_BYTES};
use std::ffi::OsStr;
use std::fs;
use std::io::{ErrorKind, Read, Write};
use std::path::{Component, Path, PathBuf};

/// Decoded frame header: the name and the payload length that follows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameHeader {
    pub name: String,
    pub size: u64,
}

/// Build a frame header
/// Format: NAME_LEN u32 BE | NAME | SIZE u64 BE
pub fn encode_header(name: &str, size: u64) -> Result<Vec<u8>> {
    let name_bytes = name.as_bytes();
    let name_len = u32::try_from(name_bytes.len()).map_err(|_| TransferError::NameTooLong {
        len: name_bytes.len() as u64,
        max: u32::MAX,
    })?;
    let mut buf = Vec::with_capacity(NAME_LEN_BYTES + name_bytes.len() + SIZE_BYTES);
    buf.extend_from_slice(&name_len.to_be_bytes());
    buf.extend_from_slice(name_bytes);
    buf.extend_from_slice(&size.to_be_bytes());
    Ok(buf)
}

/// Fill `buf` completely, looping over short reads.
///
/// Returns `Ok(false)` only when `allow_eof` is set and the stream ended before
/// a single byte arrived. Any other early end is a `ShortRead`.
pub fn read_full<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8], allow_eof: bool) -> Result<bool> {
    let mut filled = 0usize;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => {
                if filled == 0 && allow_eof {
                    return Ok(false);
                }
                return Err(TransferError::ShortRead {
                    expected: buf.len() as u64,
                    received: filled as u64,
                });
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(true)
}

/// Read the next frame header.
///
/// `Ok(None)` means the peer closed cleanly on a frame boundary. The declared
/// name length is checked against `max_name_len` before anything is allocated.
pub fn decode_header<R: Read + ?Sized>(reader: &mut R, max_name_len: u32) -> Result<Option<FrameHeader>> {
    let mut len_buf = [0u8; NAME_LEN_BYTES];
    if !read_full(reader, &mut len_buf, true)? {
        return Ok(None);
    }
    let name_len = u32::from_be_bytes(len_buf);
    if name_len > max_name_len {
        return Err(TransferError::NameTooLong {
            len: name_len as u64,
            max: max_name_len,
        });
    }

    let mut name_buf = vec![0u8; name_len as usize];
    read_full(reader, &mut name_buf, false)?;
    let name = String::from_utf8(name_buf).map_err(|_| TransferError::InvalidName)?;

    let mut size_buf = [0u8; SIZE_BYTES];
    read_full(reader, &mut size_buf, false)?;

    Ok(Some(FrameHeader {
        name,
        size: u64::from_be_bytes(size_buf),
    }))
}

fn chunk_buffer(chunk_size: usize, size: u64) -> Vec<u8> {
    let cap = (chunk_size.max(1) as u64).min(size) as usize;
    vec![0u8; cap]
}

/// Receive exactly `size` payload bytes from `reader` into `sink`.
///
/// Each chunk is written as soon as it arrives and `on_chunk` sees the running
/// total. If the peer hangs up early the bytes already written stay in the
/// sink and `ShortRead` is returned.
pub fn stream_payload<R, W, F>(
    reader: &mut R,
    size: u64,
    sink: &mut W,
    sink_path: &Path,
    chunk_size: usize,
    mut on_chunk: F,
) -> Result<u64>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
    F: FnMut(u64),
{
    let mut buf = chunk_buffer(chunk_size, size);
    let mut received = 0u64;
    while received < size {
        let want = (size - received).min(buf.len() as u64) as usize;
        let n = match reader.read(&mut buf[..want]) {
            Ok(0) => {
                let _ = sink.flush();
                return Err(TransferError::ShortRead {
                    expected: size,
                    received,
                });
            }
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                let _ = sink.flush();
                return Err(e.into());
            }
        };
        sink.write_all(&buf[..n])
            .map_err(|e| TransferError::file_io(sink_path, e))?;
        received += n as u64;
        on_chunk(received);
    }
    sink.flush().map_err(|e| TransferError::file_io(sink_path, e))?;
    Ok(received)
}

/// Send exactly `size` bytes from a local file to the peer.
///
/// A source that ends before `size` bytes (file truncated while we were
/// sending) is reported as a file error; the frame on the wire is then
/// incomplete and the connection must be dropped.
pub fn send_payload<R, W, F>(
    source: &mut R,
    source_path: &Path,
    size: u64,
    sink: &mut W,
    chunk_size: usize,
    mut on_chunk: F,
) -> Result<u64>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
    F: FnMut(u64),
{
    let mut buf = chunk_buffer(chunk_size, size);
    let mut sent = 0u64;
    while sent < size {
        let want = (size - sent).min(buf.len() as u64) as usize;
        let n = match source.read(&mut buf[..want]) {
            Ok(0) => {
                return Err(TransferError::file_io(
                    source_path,
                    std::io::Error::new(
                        ErrorKind::UnexpectedEof,
                        format!("source ended after {} of {} bytes", sent, size),
                    ),
                ))
            }
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(TransferError::file_io(source_path, e)),
        };
        sink.write_all(&buf[..n])?;
        sent += n as u64;
        on_chunk(sent);
    }
    sink.flush()?;
    Ok(sent)
}

/// Resolve a received file name to a path safely under `root`.
///
/// Rejects:
/// 1. Empty names and names containing NUL
/// 2. Absolute paths, root/prefix components and parent directory components
/// 3. On Windows, ':' in a component (ADS defense)
/// 4. Intermediate directories or a final symlink resolving outside `root`
///
/// Missing intermediate directories are created one level at a time, each
/// after its parent was verified to be under `root`.
pub fn normalize_under_root(root: &Path, name: &str) -> Result<PathBuf> {
    use Component::{CurDir, Normal, ParentDir, Prefix, RootDir};

    if name.contains('\0') {
        return Err(TransferError::unsafe_path(name, "contains NUL byte"));
    }

    let mut parts: Vec<&OsStr> = Vec::new();
    for component in Path::new(name).components() {
        match component {
            CurDir => {}
            Normal(s) => {
                #[cfg(windows)]
                if s.to_string_lossy().contains(':') {
                    return Err(TransferError::unsafe_path(name, "component contains ':'"));
                }
                parts.push(s);
            }
            ParentDir => {
                return Err(TransferError::unsafe_path(name, "contains parent directory component"))
            }
            RootDir | Prefix(_) => {
                return Err(TransferError::unsafe_path(name, "absolute paths are not accepted"))
            }
        }
    }
    let (file_name, dirs) = parts
        .split_last()
        .ok_or_else(|| TransferError::unsafe_path(name, "does not name a file"))?;

    let canonical_root = root
        .canonicalize()
        .map_err(|e| TransferError::file_io(root, e))?;

    let mut current = canonical_root.clone();
    for dir in dirs {
        current.push(dir);
        match fs::symlink_metadata(&current) {
            Ok(_) => {
                let resolved = current
                    .canonicalize()
                    .map_err(|e| TransferError::file_io(&current, e))?;
                if !resolved.starts_with(&canonical_root) {
                    return Err(TransferError::unsafe_path(name, "escapes destination directory"));
                }
                if !resolved.is_dir() {
                    return Err(TransferError::unsafe_path(name, "parent is not a directory"));
                }
                current = resolved;
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                fs::create_dir(&current).map_err(|e| TransferError::file_io(&current, e))?;
            }
            Err(e) => return Err(TransferError::file_io(&current, e)),
        }
    }

    let target = current.join(file_name);
    if let Ok(meta) = fs::symlink_metadata(&target) {
        if meta.file_type().is_symlink() {
            let resolved = target
                .canonicalize()
                .map_err(|_| TransferError::unsafe_path(name, "dangling symlink"))?;
            if !resolved.starts_with(&canonical_root) {
                return Err(TransferError::unsafe_path(name, "symlink escapes destination directory"));
            }
        }
        if target.is_dir() {
            return Err(TransferError::unsafe_path(name, "is an existing directory"));
        }
    }

    Ok(target)
}

/// Create directory with parent creation
pub fn ensure_dir_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(|e| TransferError::file_io(path, e))?;
    }
    Ok(())
}
