//! tcpdrop library
//!
//! Point-to-point file drop over TCP: a daemon that writes every received
//! frame into a destination directory, and a client that pushes one file or
//! the top-level files of a directory over a single connection.

pub mod cli;
pub mod config;
pub mod daemon;
pub mod error;
pub mod fs_enum;
pub mod logger;
pub mod net;
pub mod path_lock;
pub mod progress;
pub mod protocol;
pub mod protocol_core;

pub use error::{Result, TransferError};
