//! Common types shared by the traversal engine and the one-shot operations.

pub mod entry;
pub mod metadata;

pub use entry::FindEntry;
pub use metadata::{FileMetadata, FileType};
