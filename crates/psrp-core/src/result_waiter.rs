use std::sync::{Condvar, Mutex};

/// A one-shot correlator between an outbound request and the single inbound
/// event that answers it.
///
/// `set` resolves the waiter at most once: the first matching call wins and
/// every later call (even a matching one) returns `false`. Callers register
/// a [`ResultWaiter`] before issuing the request that will eventually
/// trigger the matching event, to avoid a race where the event arrives
/// before the waiter exists.
pub struct ResultWaiter<E> {
    inner: Mutex<Option<E>>,
    condvar: Condvar,
    predicate: Option<Box<dyn Fn(&E) -> bool + Send + Sync>>,
}

impl<E: Clone> ResultWaiter<E> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(None),
            condvar: Condvar::new(),
            predicate: None,
        }
    }

    #[must_use]
    pub fn with_predicate<F>(predicate: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        Self {
            inner: Mutex::new(None),
            condvar: Condvar::new(),
            predicate: Some(Box::new(predicate)),
        }
    }

    /// Attempts to resolve the waiter with `event`. Returns `true` the first
    /// time a matching event is offered, `false` otherwise (predicate
    /// rejected it, or the waiter was already resolved).
    pub fn set(&self, event: &E) -> bool {
        if let Some(predicate) = &self.predicate {
            if !predicate(event) {
                return false;
            }
        }
        let mut slot = self.inner.lock().expect("result waiter lock poisoned");
        if slot.is_some() {
            return false;
        }
        *slot = Some(event.clone());
        self.condvar.notify_all();
        true
    }

    /// Blocks until an event resolves this waiter.
    pub fn wait(&self) -> E {
        let mut slot = self.inner.lock().expect("result waiter lock poisoned");
        loop {
            if let Some(event) = slot.clone() {
                return event;
            }
            slot = self.condvar.wait(slot).expect("result waiter lock poisoned");
        }
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.inner.lock().expect("result waiter lock poisoned").is_some()
    }
}

impl<E: Clone> Default for ResultWaiter<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn set_resolves_only_once() {
        let waiter: ResultWaiter<i32> = ResultWaiter::new();
        assert!(waiter.set(&1));
        assert!(!waiter.set(&2));
        assert_eq!(waiter.wait(), 1);
    }

    #[test]
    fn predicate_rejects_non_matching_events() {
        let waiter: ResultWaiter<i32> = ResultWaiter::with_predicate(|v| *v == 7);
        assert!(!waiter.set(&3));
        assert!(waiter.set(&7));
        assert_eq!(waiter.wait(), 7);
    }

    #[test]
    fn wait_blocks_until_set_from_another_thread() {
        let waiter = Arc::new(ResultWaiter::<i32>::new());
        let setter = Arc::clone(&waiter);
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            setter.set(&9);
        });
        assert_eq!(waiter.wait(), 9);
    }
}
