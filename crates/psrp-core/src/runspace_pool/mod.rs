mod enums;
mod pool;
pub(crate) mod waiters;

pub use enums::{ApartmentState, PsThreadOptions, RunspacePoolState};
pub use pool::{RunspacePool, RunspacePoolCreator};
pub(crate) use pool::RunspacePoolInner;
