//! The traversal engine.
//!
//! An iterative stack machine rather than a recursive descent: each
//! directory being walked is a [`Level`] holding the steps left inside it,
//! and the main loop pops one step at a time. Call-stack depth therefore
//! stays flat no matter how wide or deep the tree is, and every step
//! contains an await point, so independent traversals interleave on the
//! runtime's task queue.

use std::collections::VecDeque;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use futures::future::{BoxFuture, FutureExt};
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::fs;
use tracing::{debug, trace};

use super::context::{CancelLatch, IterationContext};
use super::sink::{ResultSink, SinkFlow};
use super::{Convert, Find};
use crate::error::{Error, Result};
use crate::ops::{absolutize, stat};
use crate::types::FindEntry;

/// Conversion futures whose completion does not gate sibling progress.
type PendingConversions<T> = FuturesUnordered<BoxFuture<'static, Result<Option<T>>>>;

/// One directory being traversed: its identity plus the steps left in it.
struct Level {
    full_path: PathBuf,
    /// Relative prefix for children; empty at the root level.
    local_path: PathBuf,
    depth: usize,
    steps: VecDeque<Step>,
}

/// A unit of work inside a directory.
enum Step {
    /// Deliver the directory's own entry. Queued behind the children in
    /// children-first mode.
    Slf(Box<PendingSelf>),
    /// Visit one child by name.
    Child(OsString),
}

/// A directory entry whose inclusion was already decided but whose
/// delivery is ordered after its children.
struct PendingSelf {
    entry: FindEntry,
    ctx: IterationContext,
}

/// Drives one traversal into `sink`.
///
/// Returns when the subtree is exhausted, the latch is tripped, or the
/// sink's consumer has gone away. Fatal errors abort immediately; values
/// delivered before the failure stay delivered.
pub(crate) async fn run<T, S>(find: &Find<T>, latch: &CancelLatch, sink: &mut S) -> Result<()>
where
    T: Send + 'static,
    S: ResultSink<T>,
{
    if find.max_depth < 1 {
        return Ok(());
    }

    let root = absolutize(&find.root)?;
    debug!(root = %root.display(), "starting traversal");

    let mut pending: PendingConversions<T> = FuturesUnordered::new();
    let mut stack: Vec<Level> = Vec::new();

    let Some(metadata) = stat(&root).await? else {
        return Err(Error::NotFound { path: root });
    };
    let root_entry = FindEntry {
        local_path: PathBuf::from("."),
        full_path: root,
        metadata,
        depth: 0,
        is_root: true,
    };
    if visit(find, latch, sink, &mut pending, &mut stack, root_entry).await? == SinkFlow::Halt {
        return Ok(());
    }

    loop {
        if latch.is_cancelled() {
            debug!("traversal cancelled");
            break;
        }
        if drain_ready(&mut pending, sink).await? == SinkFlow::Halt {
            return Ok(());
        }

        let (step, dir_full, dir_local, dir_depth) = match stack.last_mut() {
            None => break,
            Some(level) => match level.steps.pop_front() {
                Some(step) => (
                    step,
                    level.full_path.clone(),
                    level.local_path.clone(),
                    level.depth,
                ),
                None => {
                    stack.pop();
                    continue;
                }
            },
        };

        match step {
            Step::Slf(pending_self) => {
                let PendingSelf { entry, ctx } = *pending_self;
                if deliver(find, sink, &mut pending, entry, ctx).await? == SinkFlow::Halt {
                    return Ok(());
                }
            }
            Step::Child(name) => {
                let full_path = dir_full.join(&name);
                let local_path = if dir_local.as_os_str().is_empty() {
                    PathBuf::from(&name)
                } else {
                    dir_local.join(&name)
                };
                let Some(metadata) = stat(&full_path).await? else {
                    // Vanished between listing and inspection; the branch
                    // contributes nothing.
                    trace!(path = %full_path.display(), "entry vanished, skipping");
                    continue;
                };
                let entry = FindEntry {
                    local_path,
                    full_path,
                    metadata,
                    depth: dir_depth + 1,
                    is_root: false,
                };
                if visit(find, latch, sink, &mut pending, &mut stack, entry).await? == SinkFlow::Halt
                {
                    return Ok(());
                }
            }
        }
    }

    // Conversions still in flight complete before the sink is finalized.
    while let Some(converted) = pending.next().await {
        if let Some(value) = converted? {
            if sink.accept(value).await == SinkFlow::Halt {
                return Ok(());
            }
        }
    }

    Ok(())
}

/// Processes one visited entry: inclusion, delivery and, for directories,
/// the descend decision.
async fn visit<T, S>(
    find: &Find<T>,
    latch: &CancelLatch,
    sink: &mut S,
    pending: &mut PendingConversions<T>,
    stack: &mut Vec<Level>,
    entry: FindEntry,
) -> Result<SinkFlow>
where
    T: Send + 'static,
    S: ResultSink<T>,
{
    let ctx = IterationContext::new(latch.clone());

    // The depth window is checked first: an entry below the minimum depth
    // never reaches the filter, the root included.
    let mut included = entry.depth >= find.min_depth;
    let mut rejected = false;
    if included {
        if let Some(filter) = &find.filter {
            if !entry.is_root || find.filter_self {
                included = filter(entry.clone(), ctx.clone()).await?;
                rejected = !included;
            }
        }
    }

    if !entry.metadata.is_dir() {
        if included {
            return deliver(find, sink, pending, entry, ctx).await;
        }
        return Ok(SinkFlow::Continue);
    }

    // Whether the folder is delivered and whether it is descended into are
    // separate decisions; a filter rejection closes the branch only under
    // the default skip policy.
    if rejected && find.skip_filtered_folder {
        trace!(path = %entry.full_path.display(), "folder excluded, not descending");
        return Ok(SinkFlow::Continue);
    }

    let mut steps = VecDeque::new();
    if entry.depth < find.max_depth {
        let names = list_children(&entry.full_path).await?;
        steps.extend(names.into_iter().map(Step::Child));
    }

    let mut level = Level {
        full_path: entry.full_path.clone(),
        local_path: if entry.is_root {
            PathBuf::new()
        } else {
            entry.local_path.clone()
        },
        depth: entry.depth,
        steps,
    };

    if included {
        if find.depth_first {
            level
                .steps
                .push_back(Step::Slf(Box::new(PendingSelf { entry, ctx })));
            stack.push(level);
            return Ok(SinkFlow::Continue);
        }
        // Parent first: the folder's own entry goes out before any child
        // is visited.
        if deliver(find, sink, pending, entry, ctx).await? == SinkFlow::Halt {
            return Ok(SinkFlow::Halt);
        }
    }

    if !level.steps.is_empty() {
        stack.push(level);
    }
    Ok(SinkFlow::Continue)
}

/// Runs the transformation stage for an included entry and hands the value
/// to the sink.
async fn deliver<T, S>(
    find: &Find<T>,
    sink: &mut S,
    pending: &mut PendingConversions<T>,
    entry: FindEntry,
    ctx: IterationContext,
) -> Result<SinkFlow>
where
    T: Send + 'static,
    S: ResultSink<T>,
{
    match &find.convert {
        Convert::Path(project) => {
            let path = if find.qualified {
                entry.full_path
            } else {
                entry.local_path
            };
            Ok(sink.accept(project(path)).await)
        }
        Convert::Custom(convert) => {
            let conversion = convert(entry, ctx);
            if find.wait_for_converter {
                match conversion.await? {
                    Some(value) => Ok(sink.accept(value).await),
                    None => Ok(SinkFlow::Continue),
                }
            } else {
                pending.push(conversion);
                Ok(SinkFlow::Continue)
            }
        }
    }
}

/// Delivers whatever ungated conversions have completed, without waiting
/// for the ones that have not.
async fn drain_ready<T, S>(pending: &mut PendingConversions<T>, sink: &mut S) -> Result<SinkFlow>
where
    T: Send + 'static,
    S: ResultSink<T>,
{
    while let Some(Some(converted)) = pending.next().now_or_never() {
        if let Some(value) = converted? {
            if sink.accept(value).await == SinkFlow::Halt {
                return Ok(SinkFlow::Halt);
            }
        }
    }
    Ok(SinkFlow::Continue)
}

/// Lists a directory's children, sorted by name for a stable visiting
/// order. A directory that vanished contributes no children.
async fn list_children(path: &Path) -> Result<Vec<OsString>> {
    let mut reader = match fs::read_dir(path).await {
        Ok(reader) => reader,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(error) => return Err(Error::io(path, error)),
    };

    let mut names = Vec::new();
    loop {
        match reader.next_entry().await {
            Ok(Some(child)) => names.push(child.file_name()),
            Ok(None) => break,
            Err(error) => return Err(Error::io(path, error)),
        }
    }
    names.sort();
    trace!(path = %path.display(), children = names.len(), "listed folder");
    Ok(names)
}
