use std::io;
use std::path::Path;

use tokio::fs;

use crate::error::{Error, Result};
use crate::types::FileMetadata;

/// Fetches metadata for `path`, following symlinks.
///
/// Resolves to `None` when the path does not exist, so callers can tell
/// absence apart from failure without matching on errors.
pub async fn stat(path: impl AsRef<Path>) -> Result<Option<FileMetadata>> {
    let path = path.as_ref();
    match fs::metadata(path).await {
        Ok(metadata) => Ok(Some(FileMetadata::from(&metadata))),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(error) => Err(Error::io(path, error)),
    }
}
