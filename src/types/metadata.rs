use std::fs;
use std::time::SystemTime;

/// Represents the type of a filesystem entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
    /// Regular file
    File,
    /// Directory
    Directory,
    /// Symbolic link
    Symlink,
}

/// Platform-agnostic view of the metadata a stat lookup reports.
///
/// Creation time is not available on every platform and filesystem, so the
/// timestamps are optional rather than failing the whole lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct FileMetadata {
    /// Type of filesystem entry
    pub file_type: FileType,
    /// Size in bytes
    pub size: u64,
    /// Last modification time
    pub modified: Option<SystemTime>,
    /// Last access time
    pub accessed: Option<SystemTime>,
    /// Creation time
    pub created: Option<SystemTime>,
    /// Whether the entry is read-only for the current user
    pub readonly: bool,
}

impl FileMetadata {
    /// Returns true if this entry is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self.file_type, FileType::Directory)
    }

    /// Returns true if this entry is a regular file.
    pub fn is_file(&self) -> bool {
        matches!(self.file_type, FileType::File)
    }

    /// Returns true if this entry is a symbolic link.
    pub fn is_symlink(&self) -> bool {
        matches!(self.file_type, FileType::Symlink)
    }
}

impl From<&fs::Metadata> for FileMetadata {
    fn from(metadata: &fs::Metadata) -> Self {
        let file_type = if metadata.is_dir() {
            FileType::Directory
        } else if metadata.file_type().is_symlink() {
            FileType::Symlink
        } else {
            FileType::File
        };

        Self {
            file_type,
            size: metadata.len(),
            modified: metadata.modified().ok(),
            accessed: metadata.accessed().ok(),
            created: metadata.created().ok(),
            readonly: metadata.permissions().readonly(),
        }
    }
}
