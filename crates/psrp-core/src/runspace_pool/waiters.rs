use std::sync::{Arc, Mutex};

use crate::result_waiter::ResultWaiter;

/// Per-event-kind storage for pending [`ResultWaiter`]s.
///
/// Using one `Vec` per kind (rather than a single heterogeneous list keyed
/// by a runtime tag) keeps dispatch statically typed, but the FIFO-within-
/// kind resolution order the dispatcher relies on is exactly what each
/// `Vec` already gives for free.
pub struct WaiterSlot<E> {
    pending: Mutex<Vec<Arc<ResultWaiter<E>>>>,
}

impl<E: Clone> Default for WaiterSlot<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Clone> WaiterSlot<E> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(Vec::new()),
        }
    }

    pub fn register(&self, waiter: Arc<ResultWaiter<E>>) {
        self.pending.lock().expect("waiter slot lock poisoned").push(waiter);
    }

    /// Offers `event` to every pending waiter in registration order,
    /// removing the first one that accepts it.
    pub fn offer(&self, event: &E) {
        let mut pending = self.pending.lock().expect("waiter slot lock poisoned");
        if let Some(index) = pending.iter().position(|waiter| waiter.set(event)) {
            pending.remove(index);
        }
    }

    #[must_use]
    pub fn new_registered(&self) -> Arc<ResultWaiter<E>> {
        let waiter = Arc::new(ResultWaiter::new());
        self.register(Arc::clone(&waiter));
        waiter
    }

    #[must_use]
    pub fn new_registered_with<F>(&self, predicate: F) -> Arc<ResultWaiter<E>>
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        let waiter = Arc::new(ResultWaiter::with_predicate(predicate));
        self.register(Arc::clone(&waiter));
        waiter
    }
}
