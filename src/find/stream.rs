use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;

use super::context::CancelLatch;
use crate::error::Result;

/// Push stream of delivered traversal values.
///
/// Values arrive as `Ok` items in the same order the collected mode would
/// produce them. A fatal traversal error arrives as one final `Err` item,
/// after which the stream ends; consumer-initiated cancellation ends the
/// stream without an error item.
///
/// Dropping the stream halts production at the engine's next delivery.
pub struct FindStream<T> {
    rx: mpsc::Receiver<Result<T>>,
    latch: CancelLatch,
}

impl<T> FindStream<T> {
    pub(crate) fn new(rx: mpsc::Receiver<Result<T>>, latch: CancelLatch) -> Self {
        Self { rx, latch }
    }

    /// Stops production from the consumer side.
    ///
    /// Already-buffered values can still be drained; nothing new is
    /// produced. This is cooperative and is not surfaced as an error.
    pub fn cancel(&mut self) {
        self.latch.cancel();
        self.rx.close();
    }

    /// Whether cancellation has been requested, by this consumer or by a
    /// filter/converter callback inside the traversal.
    pub fn is_cancelled(&self) -> bool {
        self.latch.is_cancelled()
    }
}

impl<T> Stream for FindStream<T> {
    type Item = Result<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}
