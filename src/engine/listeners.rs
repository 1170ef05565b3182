//! # EngineListeners: registry of engine listeners
//!
//! ## Rules
//! - Notification iterates a snapshot; callbacks run outside the lock.
//! - Closed listeners are pruned on every notification.
//! - A panicking listener is logged and does not stop the others.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::Mutex;

use super::{EngineListener, ListenerId};
use crate::core::TaskId;
use crate::error::panic_info;

/// Listener registry for [`Engine`](super::Engine) implementations.
#[derive(Default)]
pub struct EngineListeners {
    inner: Mutex<Vec<(ListenerId, Arc<dyn EngineListener>)>>,
}

impl EngineListeners {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener` and returns its id.
    pub fn add(&self, listener: Arc<dyn EngineListener>) -> ListenerId {
        let id = ListenerId::next();
        self.inner.lock().push((id, listener));
        id
    }

    /// Unregisters `id`; returns false if it was not registered.
    pub fn remove(&self, id: ListenerId) -> bool {
        let mut inner = self.inner.lock();
        let before = inner.len();
        inner.retain(|(lid, _)| *lid != id);
        inner.len() != before
    }

    /// Number of registered listeners (closed ones included until pruned).
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Reports that `task` started.
    pub fn notify_start(&self, task: &TaskId) {
        self.notify("on_task_start", |l| l.on_task_start(task));
    }

    /// Reports that `task` stopped.
    pub fn notify_stop(&self, task: &TaskId) {
        self.notify("on_task_stop", |l| l.on_task_stop(task));
    }

    /// Reports that `task` is being instrumented.
    pub fn notify_instrumenting(&self, task: &TaskId) {
        self.notify("on_task_instrumenting", |l| l.on_task_instrumenting(task));
    }

    fn notify(&self, callback: &'static str, f: impl Fn(&dyn EngineListener)) {
        let snapshot: Vec<Arc<dyn EngineListener>> = {
            let mut inner = self.inner.lock();
            inner.retain(|(_, l)| !l.is_closed());
            inner.iter().map(|(_, l)| Arc::clone(l)).collect()
        };

        for listener in snapshot {
            if let Err(panic_err) = panic::catch_unwind(AssertUnwindSafe(|| f(listener.as_ref()))) {
                tracing::warn!(
                    callback,
                    info = %panic_info(panic_err.as_ref()),
                    "engine listener panicked"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineId;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counting {
        starts: AtomicUsize,
        stops: AtomicUsize,
        closed: AtomicBool,
    }

    impl EngineListener for Counting {
        fn on_task_start(&self, _task: &TaskId) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }
        fn on_task_stop(&self, _task: &TaskId) {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }
        fn is_closed(&self) -> bool {
            self.closed.load(Ordering::SeqCst)
        }
    }

    struct Panicking;

    impl EngineListener for Panicking {
        fn on_task_start(&self, _task: &TaskId) {
            panic!("boom");
        }
        fn on_task_stop(&self, _task: &TaskId) {}
    }

    #[test]
    fn test_remove_unregisters() {
        let reg = EngineListeners::new();
        let l = Arc::new(Counting::default());
        let id = reg.add(l.clone());
        let task = TaskId::new(1, EngineId::next());

        reg.notify_start(&task);
        assert!(reg.remove(id));
        assert!(!reg.remove(id));
        reg.notify_start(&task);

        assert_eq!(l.starts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_closed_listeners_are_pruned() {
        let reg = EngineListeners::new();
        let l = Arc::new(Counting::default());
        reg.add(l.clone());
        l.closed.store(true, Ordering::SeqCst);

        reg.notify_stop(&TaskId::new(1, EngineId::next()));
        assert!(reg.is_empty());
        assert_eq!(l.stops.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_panicking_listener_is_isolated() {
        let reg = EngineListeners::new();
        let l = Arc::new(Counting::default());
        reg.add(Arc::new(Panicking));
        reg.add(l.clone());

        reg.notify_start(&TaskId::new(7, EngineId::next()));
        assert_eq!(l.starts.load(Ordering::SeqCst), 1);
        assert_eq!(reg.len(), 2);
    }
}
