//! Shared protocol constants for the tcpdrop framed transport
//!
//! One frame per file, repeated until the sender closes the connection:
//!
//! ```text
//! [4 bytes BE: name_len] [name_len bytes: UTF-8 name]
//! [8 bytes BE: payload_len] [payload_len bytes: file content]
//! ```

// Default TCP port for both daemon and client
pub const DEFAULT_PORT: u16 = 12345;

// Header field widths
pub const NAME_LEN_BYTES: usize = 4;
pub const SIZE_BYTES: usize = 8;

// Upper bound on a received name. Checked before the name buffer is allocated,
// so a corrupt or hostile length prefix cannot make us reserve gigabytes.
pub const DEFAULT_MAX_NAME_LEN: u32 = 4096;

// Payload is moved in bounded chunks; no chunk framing on the wire
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

// Address used only to pick the outbound interface; nothing is sent to it
pub const ROUTE_PROBE_ADDR: &str = "8.8.8.8:80";

// Centralized timeout constants
pub mod timeouts {
    // Accept poll and socket read timeout (ms). Bounds shutdown latency both
    // while idle and while a transfer is in flight.
    pub const POLL_MS: u64 = 100;

    // Client connection establishment timeout (ms)
    pub const CONNECT_MS: u64 = 5_000;

    // Client wait for the server to close after the last frame (ms)
    pub const CLOSE_WAIT_MS: u64 = 30_000;

    // Progress redraw interval for UI updates (ms)
    pub const PROGRESS_TICK_MS: u64 = 120;
}
