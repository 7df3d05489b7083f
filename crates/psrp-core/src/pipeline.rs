use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};

use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::error::PsrpError;
use crate::event::{
    DebugRecord, ErrorRecord, InformationRecord, PipelineState, PipelineStateEvent, ProgressRecord,
    VerboseRecord, WarningRecord,
};
use crate::runspace_pool::RunspacePoolInner;
use crate::subscribers::EventSubscribers;
use crate::transport::{CommandMetadataSpec, CommandSpec, CommandTypes, ParameterSpec, PipelineSpec};
use crate::value::PsValue;
use crate::data_collection::DataCollection;
use crate::runspace_pool::waiters::WaiterSlot;

#[derive(Debug, Clone)]
pub(crate) enum PipelineKindState {
    PowerShell {
        commands: Vec<CommandSpec>,
        redirect_shell_error_to_out: bool,
        is_nested: bool,
    },
    CommandMetadata(CommandMetadataSpec),
}

impl PipelineKindState {
    fn to_spec(&self, no_input: bool) -> PipelineSpec {
        match self {
            Self::PowerShell {
                commands,
                redirect_shell_error_to_out,
                is_nested,
            } => PipelineSpec::PowerShell {
                commands: commands.clone(),
                is_nested: *is_nested,
                no_input,
                redirect_shell_error_to_out: *redirect_shell_error_to_out,
            },
            Self::CommandMetadata(spec) => PipelineSpec::CommandMetadata(spec.clone()),
        }
    }
}

/// Shared state behind every pipeline handle (a `PowerShell` or a
/// `CommandMetadataPipeline` both wrap one of these).
pub(crate) struct PipelineInner {
    pub id: Uuid,
    pub(crate) pool: Weak<RunspacePoolInner>,
    pub(crate) kind: Mutex<PipelineKindState>,
    pub(crate) no_input: Mutex<bool>,
    state: Mutex<PipelineState>,
    closed: AtomicBool,
    pub state_changed: EventSubscribers<PipelineStateEvent>,
    pub stream_output: DataCollection<PsValue>,
    pub stream_debug: DataCollection<DebugRecord>,
    pub stream_error: DataCollection<ErrorRecord>,
    pub stream_information: DataCollection<InformationRecord>,
    pub stream_progress: DataCollection<ProgressRecord>,
    pub stream_verbose: DataCollection<VerboseRecord>,
    pub stream_warning: DataCollection<WarningRecord>,
    pub(crate) waiters: WaiterSlot<PipelineStateEvent>,
}

impl PipelineInner {
    pub(crate) fn new(pool: Weak<RunspacePoolInner>, kind: PipelineKindState) -> Arc<Self> {
        Self::with_id(Uuid::new_v4(), pool, kind)
    }

    pub(crate) fn with_id(id: Uuid, pool: Weak<RunspacePoolInner>, kind: PipelineKindState) -> Arc<Self> {
        Arc::new(Self {
            id,
            pool,
            kind: Mutex::new(kind),
            no_input: Mutex::new(true),
            state: Mutex::new(PipelineState::NotStarted),
            closed: AtomicBool::new(false),
            state_changed: EventSubscribers::new(),
            stream_output: DataCollection::with_blocking_iterator(true),
            stream_debug: DataCollection::new(),
            stream_error: DataCollection::new(),
            stream_information: DataCollection::new(),
            stream_progress: DataCollection::new(),
            stream_verbose: DataCollection::new(),
            stream_warning: DataCollection::new(),
            waiters: WaiterSlot::new(),
        })
    }

    pub(crate) fn state(&self) -> PipelineState {
        *self.state.lock().expect("pipeline state lock poisoned")
    }

    pub(crate) fn set_state(&self, state: PipelineState) {
        *self.state.lock().expect("pipeline state lock poisoned") = state;
    }

    /// `had_errors` is defined by the error stream, not by terminal state:
    /// a pipeline can finish `Completed` while having written non-fatal
    /// errors along the way, and that must still be visible to the caller.
    pub fn had_errors(&self) -> bool {
        !self.stream_error.is_empty()
    }

    fn pool(&self) -> Result<Arc<RunspacePoolInner>, PsrpError> {
        self.pool.upgrade().ok_or(PsrpError::InvalidState("runspace pool has been dropped"))
    }
}

/// A single remote command invocation.
///
/// Constructed through [`crate::powershell::PowerShell`] or
/// [`crate::command_metadata::CommandMetadataPipeline`]; this type carries
/// the state machine and streaming behavior shared by both.
#[derive(Clone)]
pub struct Pipeline(pub(crate) Arc<PipelineInner>);

impl Pipeline {
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.0.id
    }

    #[must_use]
    pub fn state(&self) -> PipelineState {
        self.0.state()
    }

    #[must_use]
    pub fn had_errors(&self) -> bool {
        self.0.had_errors()
    }

    #[must_use]
    pub fn state_changed(&self) -> &EventSubscribers<PipelineStateEvent> {
        &self.0.state_changed
    }

    #[must_use]
    pub fn stream_output(&self) -> &DataCollection<PsValue> {
        &self.0.stream_output
    }

    #[must_use]
    pub fn stream_error(&self) -> &DataCollection<ErrorRecord> {
        &self.0.stream_error
    }

    #[must_use]
    pub fn stream_debug(&self) -> &DataCollection<DebugRecord> {
        &self.0.stream_debug
    }

    #[must_use]
    pub fn stream_verbose(&self) -> &DataCollection<VerboseRecord> {
        &self.0.stream_verbose
    }

    #[must_use]
    pub fn stream_warning(&self) -> &DataCollection<WarningRecord> {
        &self.0.stream_warning
    }

    #[must_use]
    pub fn stream_information(&self) -> &DataCollection<InformationRecord> {
        &self.0.stream_information
    }

    #[must_use]
    pub fn stream_progress(&self) -> &DataCollection<ProgressRecord> {
        &self.0.stream_progress
    }

    /// Runs the pipeline to completion on the calling thread.
    ///
    /// `input` of `None` means the pipeline takes no input records at all
    /// (`no_input = true` at the protocol level); `Some(items)` (even an
    /// empty vector) sends each item followed by an end-of-input signal.
    #[instrument(skip_all, fields(pipeline_id = %self.id()))]
    pub fn invoke(&self, input: Option<Vec<PsValue>>) -> Result<Vec<PsValue>, PsrpError> {
        let inner = &self.0;
        let pool = inner.pool()?;
        *inner.no_input.lock().expect("no_input lock poisoned") = input.is_none();

        let waiter = inner.waiters.new_registered_with(|event| event.state != PipelineState::Running);
        inner.set_state(PipelineState::Running);
        pool.pipeline_table
            .lock()
            .expect("pipeline table lock poisoned")
            .insert(inner.id, Arc::clone(inner));

        let no_input = *inner.no_input.lock().expect("no_input lock poisoned");
        let spec = inner.kind.lock().expect("pipeline kind lock poisoned").to_spec(no_input);

        info!("invoking pipeline");
        pool.command_with_retry(inner.id, &spec)?;

        if let Some(items) = input {
            for item in items {
                pool.send_input_with_retry(inner.id, item, true)?;
            }
            pool.transport.send_end(pool.handle(), inner.id)?;
        }

        let event = waiter.wait();
        debug!(?event.state, "pipeline reached a terminal state");
        self.close();

        match event.state {
            PipelineState::Failed => Err(PsrpError::PipelineFailed(
                event.reason.unwrap_or_else(|| "Unknown failure.".to_owned()),
            )),
            PipelineState::Stopped => Err(PsrpError::PipelineStopped(
                event.reason.unwrap_or_else(|| "The pipeline has been stopped.".to_owned()),
            )),
            _ => Ok(inner.stream_output.to_vec()),
        }
    }

    /// Requests that the pipeline stop. Does not block for the stop to
    /// take effect — a thread blocked in [`Pipeline::invoke`] observes the
    /// resulting terminal state on its own.
    pub fn stop(&self) -> Result<(), PsrpError> {
        let inner = &self.0;
        let pool = inner.pool()?;
        inner.set_state(PipelineState::Stopping);
        pool.transport.signal(pool.handle(), inner.id)?;
        Ok(())
    }

    /// Reconnects to a previously disconnected pipeline.
    pub fn connect(&self) -> Result<(), PsrpError> {
        let inner = &self.0;
        let pool = inner.pool()?;
        if inner.state() != PipelineState::Disconnected {
            return Err(PsrpError::InvalidState("pipeline is not disconnected"));
        }
        let waiter = inner.waiters.new_registered_with(|event| event.state != PipelineState::Running);
        pool.transport.connect(pool.handle())?;
        inner.set_state(PipelineState::Running);
        pool.pipeline_table
            .lock()
            .expect("pipeline table lock poisoned")
            .insert(inner.id, Arc::clone(inner));
        waiter.wait();
        Ok(())
    }

    /// Idempotent: closing an already-closed or disconnected pipeline is a
    /// no-op.
    pub fn close(&self) {
        let inner = &self.0;
        if inner.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        if inner.state() == PipelineState::Disconnected {
            return;
        }
        let Ok(pool) = inner.pool() else { return };
        info!(pipeline_id = %inner.id, "closing pipeline");
        let _ = pool.transport.close(pool.handle(), Some(inner.id));
        pool.pipeline_table
            .lock()
            .expect("pipeline table lock poisoned")
            .remove(&inner.id);
    }
}

pub(crate) fn power_shell_kind(is_nested: bool) -> PipelineKindState {
    PipelineKindState::PowerShell {
        commands: Vec::new(),
        redirect_shell_error_to_out: true,
        is_nested,
    }
}

pub(crate) fn command_metadata_kind(
    names: Vec<String>,
    command_type: CommandTypes,
    namespace: Vec<String>,
    arguments: Vec<String>,
) -> PipelineKindState {
    PipelineKindState::CommandMetadata(CommandMetadataSpec {
        names,
        command_type,
        namespace,
        arguments,
    })
}

pub(crate) fn with_power_shell_commands<F: FnOnce(&mut Vec<CommandSpec>)>(pipeline: &Pipeline, f: F) {
    let mut kind = pipeline.0.kind.lock().expect("pipeline kind lock poisoned");
    if let PipelineKindState::PowerShell { commands, .. } = &mut *kind {
        f(commands);
    }
}

pub(crate) fn push_parameter(commands: &mut [CommandSpec], parameter: ParameterSpec) {
    if let Some(last) = commands.last_mut() {
        last.parameters.push(parameter);
    }
}
