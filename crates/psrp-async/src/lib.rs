//! Async adapters over the blocking `psrp-core` engine.
//!
//! The engine's own API is thread-based: opening a runspace pool or
//! invoking a pipeline blocks the calling thread on a condvar until the
//! dispatcher resolves it. This crate does not reimplement any of that
//! state machine — it offloads each blocking call to a worker thread and
//! resolves a `Future`, and turns each data collection's push-based
//! subscribers into a polled `Stream`, so the engine can be driven from an
//! async executor without its own internals ever touching one.

mod bridge;
mod pipeline;
mod pool;

pub use bridge::{spawn_blocking, stream_of, subscription_stream};
pub use pipeline::{AsyncCommandMetadataPipeline, AsyncPowerShell, PipelineEvent};
pub use pool::{AsyncRunspacePool, PoolEvent};
