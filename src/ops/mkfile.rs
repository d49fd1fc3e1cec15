use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::fs::{File, OpenOptions};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::ops::mkdir;

/// Default bound on name-collision retries.
const MAX_ATTEMPTS: usize = 20;

/// Maps a picked UUID to the relative path segments of the file to create;
/// the last segment becomes the file name.
pub type PathMapper = Arc<dyn Fn(Uuid) -> Vec<String> + Send + Sync>;

/// Behavior customizations for [`mkfile`].
#[derive(Clone)]
pub struct MkFileOptions {
    /// Appended to the resulting file's name.
    pub suffix: String,
    /// Limits attempts at picking a non-conflicting random name.
    pub max_attempts: usize,
    /// Custom mapping from UUID to the file's relative pathname segments;
    /// intermediate segments become subfolders. Defaults to the bare UUID
    /// as the file name.
    pub path_mapper: Option<PathMapper>,
}

impl Default for MkFileOptions {
    fn default() -> Self {
        Self {
            suffix: String::new(),
            max_attempts: MAX_ATTEMPTS,
            path_mapper: None,
        }
    }
}

impl fmt::Debug for MkFileOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MkFileOptions")
            .field("suffix", &self.suffix)
            .field("max_attempts", &self.max_attempts)
            .field("path_mapper", &self.path_mapper.as_ref().map(|_| "..."))
            .finish()
    }
}

/// A freshly created unique file.
#[derive(Debug)]
pub struct MkFileResult {
    /// The exclusively created file, open for reading and writing.
    pub file: File,
    /// Full pathname of the created file.
    pub path: PathBuf,
    /// The random UUID its name was derived from.
    pub uuid: Uuid,
}

/// Creates a new file with a random UUIDv4-derived name inside `folder`.
///
/// The file is opened exclusively with owner-only permissions, so clashing
/// with a concurrently picked name is detected at open time and retried
/// with a fresh UUID, up to `max_attempts` times. `folder` and any
/// intermediate segments produced by the path mapper are created on the
/// way.
pub async fn mkfile(folder: impl AsRef<Path>, options: MkFileOptions) -> Result<MkFileResult> {
    let folder = folder.as_ref();

    for _ in 0..options.max_attempts {
        let uuid = Uuid::new_v4();
        let mut segments = match &options.path_mapper {
            Some(mapper) => mapper(uuid),
            None => vec![uuid.to_string()],
        };
        let Some(file_name) = segments.pop() else {
            return Err(Error::InvalidPath {
                path: folder.to_path_buf(),
                reason: "path mapper returned no segments".into(),
            });
        };

        let parent = mkdir(folder, segments.iter().collect::<PathBuf>()).await?;
        let path = parent.join(format!("{file_name}{}", options.suffix));

        let mut open = OpenOptions::new();
        open.read(true).write(true).create_new(true);
        #[cfg(unix)]
        open.mode(0o600);

        match open.open(&path).await {
            Ok(file) => return Ok(MkFileResult { file, path, uuid }),
            Err(error) if error.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(error) => return Err(Error::io(path, error)),
        }
    }

    Err(Error::ExhaustedAttempts {
        attempts: options.max_attempts,
    })
}
