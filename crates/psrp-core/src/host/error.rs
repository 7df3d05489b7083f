/// Failure modes of host-call parameter decoding and invocation.
///
/// Never reaches the application directly: a [`HostError`] raised while
/// invoking a method is caught by the runspace pool and turned into either
/// an `ErrorRecord` on the relevant error stream (void methods) or a host
/// response carrying the error back to the peer (non-void methods).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    NotImplemented,
    InvalidParameters,
    RequestReturnMismatch,
    Cancelled,
    Other(String),
}

impl std::fmt::Display for HostError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotImplemented => f.write_str("host method is not implemented"),
            Self::InvalidParameters => f.write_str("host call parameters did not match the expected shape"),
            Self::RequestReturnMismatch => f.write_str("host call return value did not match the expected shape"),
            Self::Cancelled => f.write_str("host call was cancelled"),
            Self::Other(message) => f.write_str(message),
        }
    }
}

impl std::error::Error for HostError {}

pub type HostResult<T> = Result<T, HostError>;
