//! One writer per destination path
//!
//! Sessions running on different threads may receive frames with the same
//! name. A writer holds a `PathGuard` for as long as its file is open; a second
//! writer for the same path blocks until the first guard drops.

use parking_lot::{Condvar, Mutex};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Default)]
pub struct PathLocks {
    held: Mutex<HashSet<PathBuf>>,
    released: Condvar,
}

impl PathLocks {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Block until `path` is free, then hold it until the guard drops.
    pub fn lock(self: &Arc<Self>, path: &Path) -> PathGuard {
        let mut held = self.held.lock();
        while held.contains(path) {
            self.released.wait(&mut held);
        }
        held.insert(path.to_path_buf());
        PathGuard {
            locks: Arc::clone(self),
            path: path.to_path_buf(),
        }
    }
}

pub struct PathGuard {
    locks: Arc<PathLocks>,
    path: PathBuf,
}

impl Drop for PathGuard {
    fn drop(&mut self) {
        self.locks.held.lock().remove(&self.path);
        self.locks.released.notify_all();
    }
}
