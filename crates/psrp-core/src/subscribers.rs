use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Handle returned by [`EventSubscribers::subscribe`], used to unsubscribe later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

/// A registry of callbacks for one event kind, mirroring the add/remove
/// event-handler pattern used throughout the runspace pool and pipeline
/// APIs (`state_changed`, `user_event`, and the data-collection hooks).
///
/// Firing never aborts part-way: a callback that panics is caught, logged,
/// and the remaining callbacks still run.
pub struct EventSubscribers<T> {
    next_id: AtomicU64,
    callbacks: Mutex<Vec<(u64, Box<dyn Fn(&T) + Send + Sync>)>>,
}

impl<T> Default for EventSubscribers<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> EventSubscribers<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(0),
            callbacks: Mutex::new(Vec::new()),
        }
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.callbacks
            .lock()
            .expect("subscriber lock poisoned")
            .push((id, Box::new(callback)));
        SubscriptionId(id)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.callbacks
            .lock()
            .expect("subscriber lock poisoned")
            .retain(|(existing, _)| *existing != id.0);
    }

    pub fn fire(&self, value: &T) {
        let callbacks = self.callbacks.lock().expect("subscriber lock poisoned");
        for (_, callback) in callbacks.iter() {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| callback(value))) {
                let message = payload
                    .downcast_ref::<&str>()
                    .copied()
                    .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
                    .unwrap_or("<non-string panic payload>");
                tracing::error!(panic = message, "callback panicked during event delivery");
            }
        }
    }

    pub fn len(&self) -> usize {
        self.callbacks.lock().expect("subscriber lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    #[test]
    fn fire_invokes_all_subscribers_in_registration_order() {
        let subs: EventSubscribers<i32> = EventSubscribers::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_a = Arc::clone(&seen);
        let seen_b = Arc::clone(&seen);
        subs.subscribe(move |v| seen_a.lock().unwrap().push(("a", *v)));
        subs.subscribe(move |v| seen_b.lock().unwrap().push(("b", *v)));
        subs.fire(&42);
        assert_eq!(*seen.lock().unwrap(), vec![("a", 42), ("b", 42)]);
    }

    #[test]
    fn unsubscribe_stops_future_delivery() {
        let subs: EventSubscribers<i32> = EventSubscribers::new();
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = Arc::clone(&count);
        let id = subs.subscribe(move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });
        subs.fire(&1);
        subs.unsubscribe(id);
        subs.fire(&1);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn a_panicking_callback_does_not_stop_delivery_to_the_rest() {
        let subs: EventSubscribers<i32> = EventSubscribers::new();
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = Arc::clone(&count);
        subs.subscribe(|_| panic!("boom"));
        subs.subscribe(move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });
        subs.fire(&1);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
