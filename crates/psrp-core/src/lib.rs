//! Client-side PowerShell Remoting Protocol runtime: a state-machine engine
//! that multiplexes pipelines over a runspace pool and routes typed PSRP
//! events between application code and a pluggable transport.

mod command_metadata;
mod data_collection;
mod dispatcher;
mod error;
pub mod event;
pub mod host;
mod pipeline;
mod powershell;
mod result_waiter;
mod runspace_pool;
mod subscribers;
mod transport;
mod value;

#[cfg(any(test, feature = "test-helpers"))]
pub mod testing;

pub use command_metadata::CommandMetadataPipeline;
pub use data_collection::{DataCollection, Iter as DataCollectionIter};
pub use error::{PsrpError, PsrpResult};
pub use pipeline::Pipeline;
pub use powershell::PowerShell;
pub use result_waiter::ResultWaiter;
pub use runspace_pool::{ApartmentState, PsThreadOptions, RunspacePool, RunspacePoolCreator, RunspacePoolState};
pub use subscribers::{EventSubscribers, SubscriptionId};
pub use transport::{CommandTypes, MissingCipherError, PipelineSpec, PoolHandle, Transport, TransportOpError};
pub use value::PsValue;
