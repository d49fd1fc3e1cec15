use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Traversal-wide cancellation flag.
///
/// Tripping the latch is idempotent and immediately visible to every part
/// of the same traversal. The engine consults it before scheduling any
/// further visit or descent, so work already in flight finishes while
/// nothing new starts.
#[derive(Debug, Clone, Default)]
pub struct CancelLatch {
    flag: Arc<AtomicBool>,
}

impl CancelLatch {
    /// Creates an untripped latch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

type Bag = HashMap<String, Box<dyn Any + Send>>;

/// Scope shared by the filter and converter invoked for the same entry.
///
/// A fresh, empty context is created for every visited entry and handed to
/// exactly that entry's filter and converter calls. Besides the cancel
/// capability it is an open key/value bag: whatever the filter stores under
/// a key, the converter of the same entry can read back.
#[derive(Clone)]
pub struct IterationContext {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    latch: CancelLatch,
    values: Mutex<Bag>,
}

impl IterationContext {
    pub(crate) fn new(latch: CancelLatch) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                latch,
                values: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Requests cancellation of the whole traversal this entry belongs to.
    pub fn cancel(&self) {
        self.inner.latch.cancel();
    }

    /// Whether the surrounding traversal has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.inner.latch.is_cancelled()
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub fn set<V: Any + Send>(&self, key: impl Into<String>, value: V) {
        self.bag().insert(key.into(), Box::new(value));
    }

    /// Returns a clone of the value stored under `key`, if it exists and
    /// has the requested type.
    pub fn get<V: Any + Clone + Send>(&self, key: &str) -> Option<V> {
        self.bag().get(key).and_then(|value| value.downcast_ref::<V>()).cloned()
    }

    /// Removes and returns the value stored under `key`.
    ///
    /// A value of a different type is left in place.
    pub fn take<V: Any + Send>(&self, key: &str) -> Option<V> {
        let boxed = self.bag().remove(key)?;
        match boxed.downcast::<V>() {
            Ok(value) => Some(*value),
            Err(original) => {
                self.bag().insert(key.to_string(), original);
                None
            }
        }
    }

    fn bag(&self) -> MutexGuard<'_, Bag> {
        self.inner
            .values
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl fmt::Debug for IterationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IterationContext")
            .field("cancelled", &self.is_cancelled())
            .finish_non_exhaustive()
    }
}
