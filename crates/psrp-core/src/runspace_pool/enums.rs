/// Lifecycle states of a [`super::RunspacePool`] (MS-PSRP `RunspacePoolStateInfo`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunspacePoolState {
    BeforeOpen,
    Opening,
    NegotiationSent,
    NegotiationSucceeded,
    Opened,
    Disconnecting,
    Disconnected,
    Closing,
    Closed,
    Broken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApartmentState {
    Sta,
    Mta,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PsThreadOptions {
    Default,
    UseNewThread,
    ReuseThread,
    UseCurrentThread,
}
