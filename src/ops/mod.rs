//! Thin, single-purpose wrappers around individual filesystem calls.
//!
//! Each operation here maps onto one or two primitives; the exception is
//! [`rmdir`](rmdir()), which consumes the traversal engine with a deleting
//! converter.

pub mod file;
pub mod list;
pub mod mkdir;
pub mod mkfile;
pub mod rmdir;
pub mod stat;

pub use file::{read, remove, write};
pub use list::{list, list_with, ListOptions};
pub use mkdir::mkdir;
pub use mkfile::{mkfile, MkFileOptions, MkFileResult, PathMapper};
pub use rmdir::{rmdir, rmdir_with, RmdirOptions};
pub use stat::stat;

use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Resolves `path` against the current working directory without touching
/// symlinks or the filesystem itself.
pub(crate) fn absolutize(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        let cwd = env::current_dir().map_err(|error| Error::io(path, error))?;
        Ok(cwd.join(path))
    }
}
