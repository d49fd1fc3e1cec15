use std::io;
use std::path::{Component, Path, PathBuf};

use tokio::fs;

use crate::error::{Error, Result};
use crate::ops::absolutize;

/// Recursively creates `sub` below `base`, segment by segment.
///
/// `base` itself is created when missing. Resolves to the absolute path of
/// the deepest folder, so an empty `sub` simply ensures `base` exists. A
/// segment that already exists as something other than a directory fails
/// with [`Error::NotADirectory`].
pub async fn mkdir(base: impl AsRef<Path>, sub: impl AsRef<Path>) -> Result<PathBuf> {
    let sub = sub.as_ref();

    let mut segments = Vec::new();
    for component in sub.components() {
        match component {
            Component::Normal(segment) => segments.push(segment.to_os_string()),
            Component::CurDir => {}
            _ => {
                return Err(Error::InvalidPath {
                    path: sub.to_path_buf(),
                    reason: "subfolder must be relative and free of parent references".into(),
                });
            }
        }
    }

    let mut current = absolutize(base.as_ref())?;
    ensure_folder(&current).await?;
    for segment in segments {
        current.push(segment);
        ensure_folder(&current).await?;
    }
    Ok(current)
}

/// Creates one folder level unless it already exists as a directory.
async fn ensure_folder(path: &Path) -> Result<()> {
    match fs::metadata(path).await {
        Ok(metadata) if metadata.is_dir() => return Ok(()),
        Ok(_) => {
            return Err(Error::NotADirectory {
                path: path.to_path_buf(),
            })
        }
        Err(error) if error.kind() == io::ErrorKind::NotFound => {}
        Err(error) => return Err(Error::io(path, error)),
    }

    match fs::create_dir(path).await {
        Ok(()) => Ok(()),
        // Lost a creation race with another writer.
        Err(error) if error.kind() == io::ErrorKind::AlreadyExists => {
            match fs::metadata(path).await {
                Ok(metadata) if metadata.is_dir() => Ok(()),
                Ok(_) => Err(Error::NotADirectory {
                    path: path.to_path_buf(),
                }),
                Err(error) => Err(Error::io(path, error)),
            }
        }
        Err(error) => Err(Error::io(path, error)),
    }
}
