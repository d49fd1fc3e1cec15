//! # file-essentials
//!
//! Async filesystem essentials built on tokio: a deep traversal engine
//! with caller-supplied filter and converter callbacks, dual delivery
//! modes — an ordered collection or a backpressure-aware stream — and
//! cooperative mid-traversal cancellation, surrounded by the small
//! single-call helpers such tooling always ends up needing.
//!
//! ## Enumerating a subtree
//!
//! ```no_run
//! use file_essentials::Find;
//!
//! # async fn example() -> file_essentials::Result<()> {
//! let folders = Find::new("assets")
//!     .filter(|entry, _ctx| async move { Ok(entry.metadata.is_dir()) })
//!     .collect()
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Streaming with backpressure
//!
//! ```no_run
//! use file_essentials::Find;
//! use futures::StreamExt;
//!
//! # async fn example() -> file_essentials::Result<()> {
//! let mut entries = Find::new("assets").buffer(32).stream();
//! while let Some(entry) = entries.next().await {
//!     println!("{}", entry?.display());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`find`](mod@find): the traversal engine, its configuration and its
//!   delivery modes
//! - [`ops`]: one-call wrappers (list, stat, mkdir, mkfile, rmdir,
//!   read/write/remove)
//! - [`types`]: entry and metadata types shared by both
//! - [`error`]: error types and handling

pub mod error;
pub mod find;
pub mod ops;
pub mod types;

pub use error::{BoxError, Error, Result};
pub use find::{find, CancelLatch, ConvertFn, FilterFn, Find, FindStream, IterationContext};
pub use ops::{
    list, list_with, mkdir, mkfile, read, remove, rmdir, rmdir_with, stat, write, ListOptions,
    MkFileOptions, MkFileResult, PathMapper, RmdirOptions,
};
pub use types::{FileMetadata, FileType, FindEntry};
