/// Errors surfaced at the public API boundary of the runtime.
///
/// Protocol-originated failures are recorded on streams or as a terminal
/// pipeline/pool state and only reach the caller through the handful of
/// variants below; `MissingCipher` never does (it is retried internally) and
/// `HostInvocationFailed` never does either (it is written to an error
/// stream or sent back to the peer as part of a host response).
#[derive(Debug, thiserror::Error)]
pub enum PsrpError {
    #[error("objects cannot be added to a closed collection")]
    ClosedCollection,

    #[error("invalid runspace pool configuration: {0}")]
    ConfigInvalid(&'static str),

    #[error("the pipeline failed: {0}")]
    PipelineFailed(String),

    #[error("the pipeline has been stopped: {0}")]
    PipelineStopped(String),

    #[error("transport is broken: {0}")]
    TransportBroken(String),

    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    #[error("host error: {0}")]
    Host(#[from] crate::host::HostError),
}

pub type PsrpResult<T> = Result<T, PsrpError>;
