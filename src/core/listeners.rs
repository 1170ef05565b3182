//! # Session observers
//!
//! [`StateListener`] is notified on every lifecycle write. Membership in a
//! [`ListenerSet`] is by `Arc` identity, so registering the same handle twice
//! yields one notification per event.
//!
//! ## Rules
//! - Mutation and snapshotting share one lock per set.
//! - Notification runs on the snapshot, outside the lock: a listener may
//!   register or unregister listeners from its callback.
//! - A listener added during an in-flight notification may miss it.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::Mutex;

use super::{TaskId, TaskState};
use crate::error::panic_info;

/// Observer of session lifecycle changes.
///
/// Called synchronously on the thread that changed the state; must not block.
///
/// Closures implement this trait:
/// ```
/// use std::sync::Arc;
/// use tracevisor::{StateListener, TaskState};
///
/// let listener: Arc<dyn StateListener> = Arc::new(|state: TaskState| {
///     println!("now {state}");
/// });
/// # let _ = listener;
/// ```
pub trait StateListener: Send + Sync + 'static {
    /// The session moved to `state`.
    fn state_changed(&self, state: TaskState);
}

impl<F> StateListener for F
where
    F: Fn(TaskState) + Send + Sync + 'static,
{
    fn state_changed(&self, state: TaskState) {
        self(state)
    }
}

/// Identity-unique set of shared listeners.
pub(crate) struct ListenerSet<T: ?Sized> {
    inner: Mutex<Vec<Arc<T>>>,
}

impl<T: ?Sized> ListenerSet<T> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Vec::new()),
        }
    }

    /// Adds `listener`; false if that handle is already present.
    pub fn add(&self, listener: Arc<T>) -> bool {
        let mut inner = self.inner.lock();
        if inner.iter().any(|l| same(l, &listener)) {
            return false;
        }
        inner.push(listener);
        true
    }

    /// Removes `listener`; false if it was not present.
    pub fn remove(&self, listener: &Arc<T>) -> bool {
        let mut inner = self.inner.lock();
        let before = inner.len();
        inner.retain(|l| !same(l, listener));
        inner.len() != before
    }

    pub fn snapshot(&self) -> Vec<Arc<T>> {
        self.inner.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }
}

impl ListenerSet<dyn StateListener> {
    /// Delivers `state` to every listener, isolating panics.
    pub fn notify(&self, task: &TaskId, state: TaskState) {
        for listener in self.snapshot() {
            if let Err(panic_err) =
                panic::catch_unwind(AssertUnwindSafe(|| listener.state_changed(state)))
            {
                tracing::warn!(
                    task = %task,
                    state = state.as_label(),
                    info = %panic_info(panic_err.as_ref()),
                    "state listener panicked"
                );
            }
        }
    }
}

/// Compares data pointers only; vtable pointers of the same object may differ.
fn same<T: ?Sized>(a: &Arc<T>, b: &Arc<T>) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}
