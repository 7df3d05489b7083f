//! The two primitives every async wrapper in this crate is built from:
//! turning one blocking call into a `Future`, and turning a push-based
//! subscriber registry into a polled `Stream`.

use std::future::Future;
use std::thread;

use futures::channel::{mpsc, oneshot};

use psrp_core::{DataCollection, EventSubscribers};

/// Runs a blocking engine call on a dedicated thread and resolves once it
/// completes. The engine's waits (runspace pool negotiation, pipeline
/// completion, ...) are condvar-based rather than poll-based, so there is
/// no way to drive them from an executor directly; this is the seam.
pub fn spawn_blocking<T, F>(f: F) -> impl Future<Output = T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    thread::spawn(move || {
        let _ = tx.send(f());
    });
    async move { rx.await.expect("psrp-core worker thread panicked before producing a result") }
}

/// Bridges a [`DataCollection`]'s `data_added`/`on_completed` subscribers
/// into an [`mpsc::UnboundedReceiver`] (which already implements `Stream`).
///
/// Subscribe before the operation that produces the collection's items
/// starts (before `invoke`/`open`): items appended before this call runs
/// are not replayed, only subsequent ones are forwarded.
pub fn stream_of<T>(collection: &DataCollection<T>) -> mpsc::UnboundedReceiver<T>
where
    T: Clone + Send + Sync + 'static,
{
    let (tx, rx) = mpsc::unbounded();
    let forward_tx = tx.clone();
    collection.data_added.subscribe(move |value: &T| {
        let _ = forward_tx.unbounded_send(value.clone());
    });
    collection.on_completed.subscribe(move |()| {
        tx.close_channel();
    });
    rx
}

/// Bridges an [`EventSubscribers`] registry into an unbounded `Stream`.
///
/// Unlike `stream_of`, there's no completion signal for a subscriber
/// registry, so the returned stream runs for as long as the pool/pipeline
/// it's attached to does; dropping the receiver just stops delivery.
pub fn subscription_stream<T>(subscribers: &EventSubscribers<T>) -> mpsc::UnboundedReceiver<T>
where
    T: Clone + Send + Sync + 'static,
{
    let (tx, rx) = mpsc::unbounded();
    subscribers.subscribe(move |value: &T| {
        let _ = tx.unbounded_send(value.clone());
    });
    rx
}
