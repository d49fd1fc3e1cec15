use std::ffi::OsStr;
use std::path::PathBuf;

use crate::types::FileMetadata;

/// A single visited filesystem entry, handed to filter and converter
/// callbacks during a traversal.
///
/// Entries are ephemeral: one is created per visited element and dropped
/// once that element has been processed. Callbacks receive their own clone,
/// so an asynchronous callback may keep it as long as it needs.
#[derive(Debug, Clone)]
pub struct FindEntry {
    /// Path relative to the traversal root; `.` denotes the root itself.
    pub local_path: PathBuf,
    /// Absolute path of the entry.
    pub full_path: PathBuf,
    /// Metadata reported by the stat lookup for this entry.
    pub metadata: FileMetadata,
    /// Distance from the root; the root has depth 0.
    pub depth: usize,
    /// Whether this entry is the traversal root.
    pub is_root: bool,
}

impl FindEntry {
    /// Returns the file name associated with the entry, if any.
    ///
    /// The traversal root has no name of its own and yields `None`; every
    /// other entry returns the final component of its relative path.
    pub fn file_name(&self) -> Option<&OsStr> {
        if self.is_root {
            None
        } else {
            self.local_path.file_name()
        }
    }
}
