use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::Result;

/// Outcome of handing a value to a sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SinkFlow {
    /// Keep traversing.
    Continue,
    /// The consumer is gone; stop producing.
    Halt,
}

/// Delivery target the traversal engine writes into.
///
/// The engine is implemented against this interface exclusively, so the
/// collected and streamed modes (and any future delivery mode) share one
/// traversal algorithm.
#[async_trait]
pub(crate) trait ResultSink<T: Send>: Send {
    /// Accepts one delivered value, suspending while the sink is full.
    async fn accept(&mut self, value: T) -> SinkFlow;
}

/// Buffers every delivered value in traversal order.
pub(crate) struct CollectionSink<T> {
    values: Vec<T>,
}

impl<T> CollectionSink<T> {
    pub(crate) fn new() -> Self {
        Self { values: Vec::new() }
    }

    pub(crate) fn into_values(self) -> Vec<T> {
        self.values
    }
}

#[async_trait]
impl<T: Send> ResultSink<T> for CollectionSink<T> {
    async fn accept(&mut self, value: T) -> SinkFlow {
        self.values.push(value);
        SinkFlow::Continue
    }
}

/// Pushes delivered values into a bounded channel.
///
/// The channel capacity is the stream's high-water mark: a send against a
/// full buffer suspends the engine until the consumer has drained capacity,
/// which is what keeps production paced to consumption.
pub(crate) struct StreamSink<T> {
    tx: mpsc::Sender<Result<T>>,
}

impl<T> StreamSink<T> {
    pub(crate) fn new(tx: mpsc::Sender<Result<T>>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl<T: Send> ResultSink<T> for StreamSink<T> {
    async fn accept(&mut self, value: T) -> SinkFlow {
        match self.tx.send(Ok(value)).await {
            Ok(()) => SinkFlow::Continue,
            Err(_) => SinkFlow::Halt,
        }
    }
}
