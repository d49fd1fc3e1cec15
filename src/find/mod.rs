//! Deep enumeration of a filesystem subtree.
//!
//! [`Find`] configures one traversal: which subtree to walk, which entries
//! to include, how an included entry becomes a delivered value, and whether
//! the result is collected into a `Vec` or pushed through a
//! backpressure-aware [`FindStream`]. The same filter and converter
//! callbacks drive either mode identically, and either mode can be
//! cancelled mid-traversal through the [`IterationContext`] handed to every
//! callback.

mod context;
mod engine;
mod sink;
mod stream;
#[cfg(test)]
mod tests;

pub use context::{CancelLatch, IterationContext};
pub use stream::FindStream;

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use tokio::sync::mpsc;

use crate::error::Result;
use crate::types::FindEntry;
use sink::{CollectionSink, StreamSink};

/// Stream buffer capacity used when none is configured.
const DEFAULT_BUFFER: usize = 64;

/// Decides whether a visited entry is part of the result.
pub type FilterFn =
    Arc<dyn Fn(FindEntry, IterationContext) -> BoxFuture<'static, Result<bool>> + Send + Sync>;

/// Maps an included entry to its delivered value; `None` suppresses
/// delivery of that entry.
pub type ConvertFn<T> = Arc<
    dyn Fn(FindEntry, IterationContext) -> BoxFuture<'static, Result<Option<T>>> + Send + Sync,
>;

/// How an included entry becomes a delivered value.
pub(crate) enum Convert<T> {
    /// Deliver the entry's own path name (local or qualified).
    Path(fn(PathBuf) -> T),
    /// Run the caller's converter.
    Custom(ConvertFn<T>),
}

/// Configures and runs one traversal of a filesystem subtree.
///
/// The type parameter is the delivered value type: path names by default,
/// or whatever a [`converter`](Find::converter) produces.
///
/// # Examples
///
/// ```no_run
/// use file_essentials::Find;
///
/// # async fn example() -> file_essentials::Result<()> {
/// let folders = Find::new("assets")
///     .filter(|entry, _ctx| async move { Ok(entry.metadata.is_dir()) })
///     .collect()
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct Find<T = PathBuf> {
    pub(crate) root: PathBuf,
    pub(crate) filter: Option<FilterFn>,
    pub(crate) convert: Convert<T>,
    pub(crate) depth_first: bool,
    pub(crate) qualified: bool,
    pub(crate) min_depth: usize,
    pub(crate) max_depth: usize,
    pub(crate) skip_filtered_folder: bool,
    pub(crate) filter_self: bool,
    pub(crate) wait_for_converter: bool,
    pub(crate) buffer: usize,
}

impl Find<PathBuf> {
    /// Creates a traversal of the subtree rooted at `root`, delivering the
    /// path name of every included entry.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            filter: None,
            convert: Convert::Path(std::convert::identity),
            depth_first: false,
            qualified: false,
            min_depth: 0,
            max_depth: usize::MAX,
            skip_filtered_folder: true,
            filter_self: false,
            wait_for_converter: false,
            buffer: DEFAULT_BUFFER,
        }
    }
}

impl<T: Send + 'static> Find<T> {
    /// Installs the inclusion filter.
    ///
    /// The filter is invoked once per visited entry that satisfies the
    /// depth window, with that entry's [`IterationContext`]. Resolving to
    /// `Ok(false)` excludes the entry; for a directory this also stops the
    /// descent unless [`skip_filtered_folder`](Find::skip_filtered_folder)
    /// is disabled. An error aborts the whole traversal.
    pub fn filter<F, Fut>(mut self, filter: F) -> Self
    where
        F: Fn(FindEntry, IterationContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<bool>> + Send + 'static,
    {
        self.filter = Some(Arc::new(move |entry, ctx| filter(entry, ctx).boxed()));
        self
    }

    /// Replaces the delivered-value computation, changing the result type.
    ///
    /// The converter runs for every included entry, bound to the same
    /// [`IterationContext`] instance its filter call used. Resolving to
    /// `Ok(None)` delivers nothing for that entry, independently of the
    /// filter's verdict; an error aborts the whole traversal.
    pub fn converter<U, F, Fut>(self, convert: F) -> Find<U>
    where
        U: Send + 'static,
        F: Fn(FindEntry, IterationContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<U>>> + Send + 'static,
    {
        Find {
            root: self.root,
            filter: self.filter,
            convert: Convert::Custom(Arc::new(move |entry, ctx| convert(entry, ctx).boxed())),
            depth_first: self.depth_first,
            qualified: self.qualified,
            min_depth: self.min_depth,
            max_depth: self.max_depth,
            skip_filtered_folder: self.skip_filtered_folder,
            filter_self: self.filter_self,
            wait_for_converter: self.wait_for_converter,
            buffer: self.buffer,
        }
    }

    /// Delivers every folder after its contents instead of before them.
    pub fn depth_first(mut self, depth_first: bool) -> Self {
        self.depth_first = depth_first;
        self
    }

    /// Delivers absolute path names instead of root-relative ones.
    ///
    /// Ignored when a [`converter`](Find::converter) is installed.
    pub fn qualified(mut self, qualified: bool) -> Self {
        self.qualified = qualified;
        self
    }

    /// Minimum depth an entry must have to be included; the root has
    /// depth 0. Entries above the window are still descended through.
    pub fn min_depth(mut self, min_depth: usize) -> Self {
        self.min_depth = min_depth;
        self
    }

    /// Maximum depth to include. Folders at the bound are processed
    /// themselves but their children are not listed; a bound of 0 yields an
    /// empty result.
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Whether a folder the filter excluded is also kept from being
    /// descended into. Enabled by default.
    pub fn skip_filtered_folder(mut self, skip: bool) -> Self {
        self.skip_filtered_folder = skip;
        self
    }

    /// Applies the filter to the root entry too. Disabled by default: the
    /// root is normally included without consulting the filter.
    pub fn filter_self(mut self, filter_self: bool) -> Self {
        self.filter_self = filter_self;
        self
    }

    /// Waits for an asynchronous converter result before visiting the next
    /// entry. Disabled by default: pending conversions then complete on
    /// their own time and their delivery order is unspecified.
    pub fn wait_for_converter(mut self, wait: bool) -> Self {
        self.wait_for_converter = wait;
        self
    }

    /// High-water mark of the stream buffer used by [`stream`](Find::stream).
    pub fn buffer(mut self, capacity: usize) -> Self {
        self.buffer = capacity.max(1);
        self
    }

    /// Runs the traversal, collecting every delivered value in traversal
    /// order.
    ///
    /// A cancelled traversal resolves with the values delivered up to the
    /// cancellation point; a fatal error discards them and fails.
    pub async fn collect(self) -> Result<Vec<T>> {
        let latch = CancelLatch::new();
        let mut sink = CollectionSink::new();
        engine::run(&self, &latch, &mut sink).await?;
        Ok(sink.into_values())
    }

    /// Runs the traversal as a push stream with backpressure.
    ///
    /// The engine is spawned onto the current tokio runtime and suspends
    /// whenever the stream's buffer is full, resuming as the consumer
    /// drains it. Must be called from within a runtime.
    pub fn stream(self) -> FindStream<T> {
        let latch = CancelLatch::new();
        let (tx, rx) = mpsc::channel(self.buffer);
        let engine_latch = latch.clone();
        tokio::spawn(async move {
            let mut sink = StreamSink::new(tx.clone());
            if let Err(error) = engine::run(&self, &engine_latch, &mut sink).await {
                let _ = tx.send(Err(error)).await;
            }
        });
        FindStream::new(rx, latch)
    }
}

/// Enumerates the subtree under `root` with default options, resolving to
/// the root-relative path names of everything below (and including) it.
pub async fn find(root: impl Into<PathBuf>) -> Result<Vec<PathBuf>> {
    Find::new(root).collect().await
}
