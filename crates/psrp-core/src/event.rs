use uuid::Uuid;

use crate::host::HostCallRequest;
use crate::runspace_pool::RunspacePoolState;
use crate::value::PsValue;

/// A single PSRP record, as carried by one of the six informational streams.
#[derive(Debug, Clone, PartialEq)]
pub struct DebugRecord {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VerboseRecord {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WarningRecord {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InformationRecord {
    pub message_data: String,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressRecord {
    pub activity: String,
    pub status_description: String,
    pub percent_complete: i32,
}

/// A synthesized or peer-reported error, attached to a pipeline's error
/// stream or to a pipeline's terminal `Failed` state.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorRecord {
    pub message: String,
    pub fully_qualified_error_id: String,
    pub category: String,
}

impl ErrorRecord {
    /// Builds the error record synthesized when a host method invocation
    /// raises locally instead of returning a value.
    #[must_use]
    pub fn from_host_invocation_failure(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            fully_qualified_error_id: "RemoteHostExecutionException".to_owned(),
            category: "Exception".to_owned(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionCapabilityEvent {
    pub pool_id: Uuid,
    pub protocol_version: String,
}

#[derive(Debug, Clone)]
pub struct RunspacePoolInitDataEvent {
    pub pool_id: Uuid,
    pub min_runspaces: usize,
    pub max_runspaces: usize,
}

#[derive(Debug, Clone)]
pub struct ApplicationPrivateDataEvent {
    pub pool_id: Uuid,
    pub data: PsValue,
}

#[derive(Debug, Clone)]
pub struct EncryptedSessionKeyEvent {
    pub pool_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct RunspacePoolStateEvent {
    pub pool_id: Uuid,
    pub state: RunspacePoolState,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    NotStarted,
    Running,
    Stopping,
    Stopped,
    Completed,
    Failed,
    Disconnected,
}

#[derive(Debug, Clone)]
pub struct PipelineStateEvent {
    pub pool_id: Uuid,
    pub pipeline_id: Uuid,
    pub state: PipelineState,
    pub reason: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PipelineOutputEvent {
    pub pool_id: Uuid,
    pub pipeline_id: Uuid,
    pub data: PsValue,
}

#[derive(Debug, Clone)]
pub struct UserEventEvent {
    pub pool_id: Uuid,
    pub event_id: i32,
    pub data: PsValue,
}

#[derive(Debug, Clone)]
pub struct RunspacePoolHostCallEvent {
    pub pool_id: Uuid,
    pub call: HostCallRequest,
}

#[derive(Debug, Clone)]
pub struct PipelineHostCallEvent {
    pub pool_id: Uuid,
    pub pipeline_id: Uuid,
    pub call: HostCallRequest,
}

#[derive(Debug, Clone)]
pub struct GetRunspaceAvailabilityEvent {
    pub pool_id: Uuid,
    pub ci: i64,
    pub count: i64,
}

#[derive(Debug, Clone)]
pub struct SetRunspaceAvailabilityEvent {
    pub pool_id: Uuid,
    pub ci: i64,
    pub success: bool,
}

macro_rules! record_event {
    ($name:ident, $record:ty) => {
        #[derive(Debug, Clone)]
        pub struct $name {
            pub pool_id: Uuid,
            /// `None` when the record was emitted at runspace-pool scope
            /// rather than by a specific pipeline.
            pub pipeline_id: Option<Uuid>,
            pub record: $record,
        }
    };
}

record_event!(DebugRecordEvent, DebugRecord);
record_event!(VerboseRecordEvent, VerboseRecord);
record_event!(WarningRecordEvent, WarningRecord);
record_event!(InformationRecordEvent, InformationRecord);
record_event!(ProgressRecordEvent, ProgressRecord);
record_event!(ErrorRecordEvent, ErrorRecord);

/// The union of everything the dispatcher can read off the transport.
///
/// Every variant that is scoped to a pipeline carries its `pipeline_id`;
/// `PsrpEvent::pipeline_id` extracts it uniformly so the dispatcher can
/// route without re-matching on the concrete kind.
#[derive(Debug, Clone)]
pub enum PsrpEvent {
    SessionCapability(SessionCapabilityEvent),
    RunspacePoolInitData(RunspacePoolInitDataEvent),
    ApplicationPrivateData(ApplicationPrivateDataEvent),
    EncryptedSessionKey(EncryptedSessionKeyEvent),
    RunspacePoolState(RunspacePoolStateEvent),
    PipelineState(PipelineStateEvent),
    PipelineOutput(PipelineOutputEvent),
    UserEvent(UserEventEvent),
    RunspacePoolHostCall(RunspacePoolHostCallEvent),
    PipelineHostCall(PipelineHostCallEvent),
    DebugRecord(DebugRecordEvent),
    VerboseRecord(VerboseRecordEvent),
    WarningRecord(WarningRecordEvent),
    InformationRecord(InformationRecordEvent),
    ProgressRecord(ProgressRecordEvent),
    ErrorRecord(ErrorRecordEvent),
    GetRunspaceAvailability(GetRunspaceAvailabilityEvent),
    SetRunspaceAvailability(SetRunspaceAvailabilityEvent),
}

impl PsrpEvent {
    #[must_use]
    pub fn pool_id(&self) -> Uuid {
        match self {
            Self::SessionCapability(e) => e.pool_id,
            Self::RunspacePoolInitData(e) => e.pool_id,
            Self::ApplicationPrivateData(e) => e.pool_id,
            Self::EncryptedSessionKey(e) => e.pool_id,
            Self::RunspacePoolState(e) => e.pool_id,
            Self::PipelineState(e) => e.pool_id,
            Self::PipelineOutput(e) => e.pool_id,
            Self::UserEvent(e) => e.pool_id,
            Self::RunspacePoolHostCall(e) => e.pool_id,
            Self::PipelineHostCall(e) => e.pool_id,
            Self::DebugRecord(e) => e.pool_id,
            Self::VerboseRecord(e) => e.pool_id,
            Self::WarningRecord(e) => e.pool_id,
            Self::InformationRecord(e) => e.pool_id,
            Self::ProgressRecord(e) => e.pool_id,
            Self::ErrorRecord(e) => e.pool_id,
            Self::GetRunspaceAvailability(e) => e.pool_id,
            Self::SetRunspaceAvailability(e) => e.pool_id,
        }
    }

    #[must_use]
    pub fn pipeline_id(&self) -> Option<Uuid> {
        match self {
            Self::PipelineState(e) => Some(e.pipeline_id),
            Self::PipelineOutput(e) => Some(e.pipeline_id),
            Self::PipelineHostCall(e) => Some(e.pipeline_id),
            Self::DebugRecord(e) => e.pipeline_id,
            Self::VerboseRecord(e) => e.pipeline_id,
            Self::WarningRecord(e) => e.pipeline_id,
            Self::InformationRecord(e) => e.pipeline_id,
            Self::ProgressRecord(e) => e.pipeline_id,
            Self::ErrorRecord(e) => e.pipeline_id,
            _ => None,
        }
    }
}
