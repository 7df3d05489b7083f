use std::sync::{Condvar, Mutex};

use crate::error::PsrpError;
use crate::subscribers::EventSubscribers;

struct State<T> {
    items: Vec<T>,
    completed: bool,
}

/// An append-only stream of protocol records (output, errors, warnings, ...).
///
/// Two append paths exist: [`DataCollection::append`] is for application
/// code adding local items and rejects writes once the collection is
/// completed; `protocol_append` is used by the dispatcher for
/// protocol-originated records and silently drops writes after completion
/// instead of failing, since the peer cannot be made to un-send a record
/// that raced with completion.
///
/// When `blocking_iterator` is set, an iterator obtained via
/// [`DataCollection::iter`] blocks for more items until the collection is
/// completed rather than ending at the current length — this is what lets
/// a pipeline invocation be consumed as a blocking `for` loop.
pub struct DataCollection<T> {
    state: Mutex<State<T>>,
    condvar: Condvar,
    blocking_iterator: bool,
    pub data_adding: EventSubscribers<T>,
    pub data_added: EventSubscribers<T>,
    pub on_completed: EventSubscribers<()>,
}

impl<T> Default for DataCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> DataCollection<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::with_blocking_iterator(false)
    }

    #[must_use]
    pub fn with_blocking_iterator(blocking_iterator: bool) -> Self {
        Self {
            state: Mutex::new(State {
                items: Vec::new(),
                completed: false,
            }),
            condvar: Condvar::new(),
            blocking_iterator,
            data_adding: EventSubscribers::new(),
            data_added: EventSubscribers::new(),
            on_completed: EventSubscribers::new(),
        }
    }

    /// Appends an application-originated item. Fails if the collection is
    /// already completed.
    pub fn append(&self, value: T) -> Result<(), PsrpError>
    where
        T: Clone,
    {
        let mut state = self.state.lock().expect("data collection lock poisoned");
        if state.completed {
            return Err(PsrpError::ClosedCollection);
        }
        self.data_adding.fire(&value);
        state.items.push(value.clone());
        self.condvar.notify_all();
        drop(state);
        self.data_added.fire(&value);
        Ok(())
    }

    /// Appends a protocol-originated record. A no-op once completed.
    pub(crate) fn protocol_append(&self, value: T)
    where
        T: Clone,
    {
        {
            let state = self.state.lock().expect("data collection lock poisoned");
            if state.completed {
                return;
            }
        }
        self.data_adding.fire(&value);
        {
            let mut state = self.state.lock().expect("data collection lock poisoned");
            if state.completed {
                return;
            }
            state.items.push(value.clone());
            self.condvar.notify_all();
        }
        self.data_added.fire(&value);
    }

    /// Marks the collection as completed. Idempotent: firing `on_completed`
    /// and waking blocked iterators only happens on the transition.
    pub fn complete(&self) {
        {
            let mut state = self.state.lock().expect("data collection lock poisoned");
            if state.completed {
                return;
            }
            state.completed = true;
            self.condvar.notify_all();
        }
        self.on_completed.fire(&());
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.state.lock().expect("data collection lock poisoned").completed
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().expect("data collection lock poisoned").items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.state.lock().expect("data collection lock poisoned").items.clone()
    }

    #[must_use]
    pub fn iter(&self) -> Iter<'_, T>
    where
        T: Clone,
    {
        Iter { collection: self, index: 0 }
    }
}

/// Iterator over a [`DataCollection`]. Blocks for more items when the
/// collection was constructed with `blocking_iterator = true` and isn't
/// completed yet; otherwise stops at the current length.
pub struct Iter<'a, T> {
    collection: &'a DataCollection<T>,
    index: usize,
}

impl<T: Clone> Iterator for Iter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let mut state = self
            .collection
            .state
            .lock()
            .expect("data collection lock poisoned");
        loop {
            if let Some(value) = state.items.get(self.index) {
                self.index += 1;
                return Some(value.clone());
            }
            if state.completed || !self.collection.blocking_iterator {
                return None;
            }
            state = self
                .collection
                .condvar
                .wait(state)
                .expect("data collection lock poisoned");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn append_after_complete_is_rejected() {
        let collection: DataCollection<i32> = DataCollection::new();
        collection.complete();
        assert!(matches!(collection.append(1), Err(PsrpError::ClosedCollection)));
    }

    #[test]
    fn protocol_append_after_complete_is_a_silent_no_op() {
        let collection: DataCollection<i32> = DataCollection::new();
        collection.protocol_append(1);
        collection.complete();
        collection.protocol_append(2);
        assert_eq!(collection.to_vec(), vec![1]);
    }

    #[test]
    fn complete_is_idempotent() {
        let collection: DataCollection<i32> = DataCollection::new();
        let fired = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let fired_clone = Arc::clone(&fired);
        collection
            .on_completed
            .subscribe(move |()| {
                fired_clone.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            });
        collection.complete();
        collection.complete();
        assert_eq!(fired.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[test]
    fn non_blocking_iterator_stops_at_current_length() {
        let collection: DataCollection<i32> = DataCollection::new();
        collection.protocol_append(1);
        collection.protocol_append(2);
        assert_eq!(collection.iter().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn blocking_iterator_waits_for_completion() {
        let collection: Arc<DataCollection<i32>> =
            Arc::new(DataCollection::with_blocking_iterator(true));
        let writer = Arc::clone(&collection);
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            writer.protocol_append(1);
            writer.protocol_append(2);
            writer.complete();
        });
        let items: Vec<i32> = collection.iter().collect();
        handle.join().unwrap();
        assert_eq!(items, vec![1, 2]);
    }
}
