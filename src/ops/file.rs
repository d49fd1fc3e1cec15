use std::path::Path;

use bytes::Bytes;
use tokio::fs;

use crate::error::{Error, Result};

/// Reads the content of the file at `path`.
pub async fn read(path: impl AsRef<Path>) -> Result<Bytes> {
    let path = path.as_ref();
    let content = fs::read(path).await.map_err(|error| Error::io(path, error))?;
    Ok(Bytes::from(content))
}

/// Writes `content` to the file at `path`, replacing what was there.
pub async fn write(path: impl AsRef<Path>, content: impl AsRef<[u8]>) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, content.as_ref())
        .await
        .map_err(|error| Error::io(path, error))
}

/// Removes the file at `path`.
///
/// Unlike [`rmdir`](crate::ops::rmdir()), this does not remove folders.
pub async fn remove(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    fs::remove_file(path)
        .await
        .map_err(|error| Error::io(path, error))
}
