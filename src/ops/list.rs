use std::path::Path;

use tokio::fs;

use crate::error::{Error, Result};

/// Options for [`list_with`].
#[derive(Debug, Clone)]
pub struct ListOptions {
    /// Excludes names starting with a dot. Enabled by default.
    pub no_hidden: bool,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self { no_hidden: true }
    }
}

/// Lists the names of elements directly subordinate to `path`, hidden
/// entries excluded.
pub async fn list(path: impl AsRef<Path>) -> Result<Vec<String>> {
    list_with(path, ListOptions::default()).await
}

/// Lists the names of elements directly subordinate to `path`.
///
/// Only one folder level is enumerated; see [`Find`](crate::Find) for deep
/// enumeration.
pub async fn list_with(path: impl AsRef<Path>, options: ListOptions) -> Result<Vec<String>> {
    let path = path.as_ref();
    let mut reader = fs::read_dir(path)
        .await
        .map_err(|error| Error::io(path, error))?;

    let mut names = Vec::new();
    loop {
        match reader.next_entry().await {
            Ok(Some(entry)) => {
                let name = entry.file_name().to_string_lossy().into_owned();
                if options.no_hidden && name.starts_with('.') {
                    continue;
                }
                names.push(name);
            }
            Ok(None) => break,
            Err(error) => return Err(Error::io(path, error)),
        }
    }
    Ok(names)
}
