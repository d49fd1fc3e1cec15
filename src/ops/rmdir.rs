use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;

use crate::error::{Error, Result};
use crate::find::Find;

/// Options for [`rmdir_with`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RmdirOptions {
    /// Removes everything inside the folder but keeps the folder itself.
    pub subs_only: bool,
}

/// Recursively removes `path` and everything below it.
///
/// Resolves to the absolute paths of all removed elements, children before
/// their parents. A `path` naming a file removes just that file.
pub async fn rmdir(path: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    rmdir_with(path, RmdirOptions::default()).await
}

/// Recursively removes `path` with behavior customizations.
///
/// Built on the traversal engine: folders are visited after their
/// contents, and a converter deletes each visited element and delivers its
/// pathname, so any deletion failure aborts the traversal as a whole.
pub async fn rmdir_with(path: impl AsRef<Path>, options: RmdirOptions) -> Result<Vec<PathBuf>> {
    let removed = Find::new(path.as_ref())
        .depth_first(true)
        .qualified(true)
        .min_depth(usize::from(options.subs_only))
        .wait_for_converter(true)
        .converter(|entry, _ctx| async move {
            if entry.metadata.is_dir() {
                fs::remove_dir(&entry.full_path)
                    .await
                    .map_err(|error| Error::io(&entry.full_path, error))?;
            } else {
                fs::remove_file(&entry.full_path)
                    .await
                    .map_err(|error| Error::io(&entry.full_path, error))?;
            }
            Ok(Some(entry.full_path))
        })
        .collect()
        .await?;

    debug!(count = removed.len(), "recursive removal finished");
    Ok(removed)
}
