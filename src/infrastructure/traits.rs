//! I/O boundary traits for testability
//!
//! These traits abstract the collaborators around the visibility engine,
//! allowing services to be tested with in-memory implementations.

use std::collections::HashSet;
use std::io;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use crate::domain::{Layout, LinkKey, Snapshot};

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Check if path is a file.
    fn is_file(&self, path: &Path) -> bool;
}

/// Cache of link keys the presentation layer has already animated in.
///
/// The visibility engine tells it to forget links that stop being visible,
/// so a later re-expand replays their entrance.
pub trait LinkCache: Send + Sync {
    /// Record that a link has been rendered.
    fn remember(&self, key: &LinkKey);

    /// Drop a link so its next appearance counts as new.
    fn forget(&self, key: &LinkKey);

    fn contains(&self, key: &LinkKey) -> bool;
}

/// External layout routine turning a visible subgraph into geometry.
pub trait LayoutEngine: Send + Sync {
    fn layout(&self, snapshot: &Snapshot) -> Layout;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// Process-local link cache.
#[derive(Debug, Default)]
pub struct InMemoryLinkCache {
    keys: Mutex<HashSet<LinkKey>>,
}

impl InMemoryLinkCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.keys.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LinkCache for InMemoryLinkCache {
    fn remember(&self, key: &LinkKey) {
        self.keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.clone());
    }

    fn forget(&self, key: &LinkKey) {
        self.keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }

    fn contains(&self, key: &LinkKey) -> bool {
        self.keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(key)
    }
}
