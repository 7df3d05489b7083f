use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use tracing::{debug, info, instrument, trace};
use typed_builder::TypedBuilder;
use uuid::Uuid;

use super::enums::{ApartmentState, PsThreadOptions, RunspacePoolState};
use super::waiters::WaiterSlot;
use crate::dispatcher;
use crate::error::PsrpError;
use crate::event::{
    ApplicationPrivateDataEvent, DebugRecord, EncryptedSessionKeyEvent, ErrorRecord,
    GetRunspaceAvailabilityEvent, InformationRecord, ProgressRecord, RunspacePoolInitDataEvent,
    RunspacePoolStateEvent, SessionCapabilityEvent, SetRunspaceAvailabilityEvent, UserEventEvent,
    VerboseRecord, WarningRecord,
};
use crate::host::Host;
use crate::pipeline::PipelineInner;
use crate::subscribers::EventSubscribers;
use crate::transport::{PoolHandle, Transport, TransportOpError};
use crate::value::PsValue;
use crate::data_collection::DataCollection;

#[derive(Default)]
pub(crate) struct PoolWaiters {
    pub state: WaiterSlot<RunspacePoolStateEvent>,
    pub session_capability: WaiterSlot<SessionCapabilityEvent>,
    pub init_data: WaiterSlot<RunspacePoolInitDataEvent>,
    pub app_private_data: WaiterSlot<ApplicationPrivateDataEvent>,
    pub encrypted_key: WaiterSlot<EncryptedSessionKeyEvent>,
    pub get_availability: WaiterSlot<GetRunspaceAvailabilityEvent>,
    pub set_availability: WaiterSlot<SetRunspaceAvailabilityEvent>,
}

pub(crate) struct RunspacePoolInner {
    pub id: Uuid,
    pub(crate) transport: Arc<dyn Transport>,
    state: Mutex<RunspacePoolState>,
    min_runspaces: Mutex<usize>,
    max_runspaces: Mutex<usize>,
    #[allow(dead_code)]
    apartment_state: ApartmentState,
    #[allow(dead_code)]
    thread_options: PsThreadOptions,
    pub(crate) host: Option<Arc<dyn Host>>,
    #[allow(dead_code)]
    application_arguments: PsValue,
    application_private_data: Mutex<Option<PsValue>>,
    new_client: AtomicBool,
    pub(crate) pipeline_table: Mutex<HashMap<Uuid, Arc<PipelineInner>>>,
    pub stream_debug: DataCollection<DebugRecord>,
    pub stream_error: DataCollection<ErrorRecord>,
    pub stream_information: DataCollection<InformationRecord>,
    pub stream_progress: DataCollection<ProgressRecord>,
    pub stream_verbose: DataCollection<VerboseRecord>,
    pub stream_warning: DataCollection<WarningRecord>,
    pub state_changed: EventSubscribers<RunspacePoolStateEvent>,
    pub user_event: EventSubscribers<UserEventEvent>,
    pub(crate) waiters: PoolWaiters,
    dispatcher_thread: Mutex<Option<JoinHandle<()>>>,
}

impl RunspacePoolInner {
    pub(crate) fn handle(&self) -> PoolHandle {
        PoolHandle { id: self.id }
    }

    pub(crate) fn state(&self) -> RunspacePoolState {
        *self.state.lock().expect("pool state lock poisoned")
    }

    pub(crate) fn set_state(&self, state: RunspacePoolState) {
        *self.state.lock().expect("pool state lock poisoned") = state;
    }

    fn start_dispatcher_if_needed(self: &Arc<Self>) {
        let mut slot = self.dispatcher_thread.lock().expect("dispatcher thread lock poisoned");
        if slot.is_some() {
            return;
        }
        let inner = Arc::clone(self);
        *slot = Some(thread::spawn(move || dispatcher::run(inner)));
    }

    pub(crate) fn command_with_retry(
        &self,
        pipeline_id: Uuid,
        spec: &crate::transport::PipelineSpec,
    ) -> Result<(), PsrpError> {
        match self.transport.command(self.handle(), pipeline_id, spec) {
            Ok(()) => Ok(()),
            Err(TransportOpError::Broken(e)) => Err(e),
            Err(TransportOpError::MissingCipher(_)) => {
                self.exchange_key()?;
                match self.transport.command(self.handle(), pipeline_id, spec) {
                    Ok(()) => Ok(()),
                    Err(TransportOpError::Broken(e)) => Err(e),
                    Err(TransportOpError::MissingCipher(_)) => {
                        Err(PsrpError::TransportBroken("cipher still missing after key exchange".to_owned()))
                    }
                }
            }
        }
    }

    pub(crate) fn send_input_with_retry(
        &self,
        pipeline_id: Uuid,
        value: PsValue,
        buffer: bool,
    ) -> Result<(), PsrpError> {
        match self.transport.send_input(self.handle(), pipeline_id, value.clone(), buffer) {
            Ok(()) => Ok(()),
            Err(TransportOpError::Broken(e)) => Err(e),
            Err(TransportOpError::MissingCipher(_)) => {
                self.exchange_key()?;
                match self.transport.send_input(self.handle(), pipeline_id, value, buffer) {
                    Ok(()) => Ok(()),
                    Err(TransportOpError::Broken(e)) => Err(e),
                    Err(TransportOpError::MissingCipher(_)) => {
                        Err(PsrpError::TransportBroken("cipher still missing after key exchange".to_owned()))
                    }
                }
            }
        }
    }

    pub(crate) fn exchange_key(&self) -> Result<(), PsrpError> {
        let waiter = self.waiters.encrypted_key.new_registered();
        self.transport.exchange_key(self.handle())?;
        waiter.wait();
        Ok(())
    }

    pub(crate) fn send_host_response_with_retry(
        &self,
        response: crate::host::HostCallResponse,
    ) -> Result<(), PsrpError> {
        match self.transport.host_response(self.handle(), response.clone()) {
            Ok(()) => Ok(()),
            Err(TransportOpError::Broken(e)) => Err(e),
            Err(TransportOpError::MissingCipher(_)) => {
                self.exchange_key()?;
                match self.transport.host_response(self.handle(), response) {
                    Ok(()) => Ok(()),
                    Err(TransportOpError::Broken(e)) => Err(e),
                    Err(TransportOpError::MissingCipher(_)) => {
                        Err(PsrpError::TransportBroken("cipher still missing after key exchange".to_owned()))
                    }
                }
            }
        }
    }

    fn send_set_runspace_availability_ci(&self, ci: Option<i64>) -> Result<bool, PsrpError> {
        let Some(ci) = ci else { return Ok(true) };
        let waiter = self.waiters.set_availability.new_registered_with(move |event| event.ci == ci);
        let event = waiter.wait();
        Ok(event.success)
    }
}

/// A client-side handle to a remote runspace pool: the session container
/// that pipelines are invoked against.
#[derive(Clone)]
pub struct RunspacePool(pub(crate) Arc<RunspacePoolInner>);

impl std::fmt::Debug for RunspacePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunspacePool").field("id", &self.0.id).finish()
    }
}

impl RunspacePool {
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.0.id
    }

    #[must_use]
    pub fn state(&self) -> RunspacePoolState {
        self.0.state()
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

    #[must_use]
    pub fn state_changed(&self) -> &EventSubscribers<RunspacePoolStateEvent> {
        &self.0.state_changed
    }

    #[must_use]
    pub fn user_event(&self) -> &EventSubscribers<UserEventEvent> {
        &self.0.user_event
    }

    #[must_use]
    pub fn application_private_data(&self) -> Option<PsValue> {
        self.0
            .application_private_data
            .lock()
            .expect("application private data lock poisoned")
            .clone()
    }

    #[instrument(skip_all, fields(pool_id = %self.id()))]
    pub fn open(&self) -> Result<(), PsrpError> {
        if self.0.state() != RunspacePoolState::BeforeOpen {
            return Err(PsrpError::InvalidState("runspace pool is not in the BeforeOpen state"));
        }
        self.0.start_dispatcher_if_needed();
        let waiter = self.0.waiters.state.new_registered();
        self.0.set_state(RunspacePoolState::NegotiationSent);
        let (min, max) = (
            *self.0.min_runspaces.lock().expect("min_runspaces lock poisoned"),
            *self.0.max_runspaces.lock().expect("max_runspaces lock poisoned"),
        );
        self.0.transport.create(self.0.handle(), min, max)?;
        info!("runspace pool opening");
        let event = waiter.wait();
        if event.state == RunspacePoolState::Broken {
            return Err(PsrpError::TransportBroken(
                event.reason.unwrap_or_else(|| "negotiation failed".to_owned()),
            ));
        }
        debug!(?event.state, "runspace pool reached a terminal negotiation state");
        Ok(())
    }

    /// Connects to (or reconnects to) a disconnected runspace pool.
    ///
    /// On first connection this arms three waiters up front for the
    /// session-capability, init-data, and application-private-data events
    /// and requires all three before the pool is considered connected;
    /// subsequent reconnects skip that handshake.
    #[instrument(skip_all, fields(pool_id = %self.id()))]
    pub fn connect(&self) -> Result<(), PsrpError> {
        self.0.start_dispatcher_if_needed();
        if self.0.new_client.load(Ordering::SeqCst) {
            let capability_waiter = self.0.waiters.session_capability.new_registered();
            let init_data_waiter = self.0.waiters.init_data.new_registered();
            let private_data_waiter = self.0.waiters.app_private_data.new_registered();
            self.0.transport.connect(self.0.handle())?;
            capability_waiter.wait();
            init_data_waiter.wait();
            let private_data = private_data_waiter.wait();
            *self.0.application_private_data.lock().expect("application private data lock poisoned") =
                Some(private_data.data);
            self.0.new_client.store(false, Ordering::SeqCst);
        } else {
            self.0.transport.reconnect(self.0.handle())?;
        }
        self.0.set_state(RunspacePoolState::Opened);
        Ok(())
    }

    #[instrument(skip_all, fields(pool_id = %self.id()))]
    pub fn close(&self) -> Result<(), PsrpError> {
        if self.0.state() == RunspacePoolState::Disconnected {
            return Ok(());
        }
        let waiter = self.0.waiters.state.new_registered_with(|event| event.state != RunspacePoolState::Opened);
        let pipelines: Vec<_> = self
            .0
            .pipeline_table
            .lock()
            .expect("pipeline table lock poisoned")
            .values()
            .cloned()
            .collect();
        for pipeline in pipelines {
            crate::pipeline::Pipeline(pipeline).close();
        }
        info!("closing runspace pool");
        self.0.transport.close(self.0.handle(), None)?;
        waiter.wait();
        Ok(())
    }

    #[instrument(skip_all, fields(pool_id = %self.id()))]
    pub fn disconnect(&self) -> Result<(), PsrpError> {
        self.0.set_state(RunspacePoolState::Disconnecting);
        self.0.transport.disconnect(self.0.handle())?;
        self.0.set_state(RunspacePoolState::Disconnected);
        for pipeline in self.0.pipeline_table.lock().expect("pipeline table lock poisoned").values() {
            pipeline.set_state(crate::event::PipelineState::Disconnected);
        }
        Ok(())
    }

    pub fn exchange_key(&self) -> Result<(), PsrpError> {
        self.0.exchange_key()
    }

    pub fn reset_runspace_state(&self) -> Result<bool, PsrpError> {
        let ci = self.0.transport.reset_runspace_state(self.0.handle());
        self.0.send_set_runspace_availability_ci(ci)
    }

    pub fn set_min_runspaces(&self, value: usize) -> Result<bool, PsrpError> {
        let ci = self.0.transport.set_min_runspaces(self.0.handle(), value);
        let success = self.0.send_set_runspace_availability_ci(ci)?;
        if success {
            *self.0.min_runspaces.lock().expect("min_runspaces lock poisoned") = value;
        }
        Ok(success)
    }

    pub fn set_max_runspaces(&self, value: usize) -> Result<bool, PsrpError> {
        let ci = self.0.transport.set_max_runspaces(self.0.handle(), value);
        let success = self.0.send_set_runspace_availability_ci(ci)?;
        if success {
            *self.0.max_runspaces.lock().expect("max_runspaces lock poisoned") = value;
        }
        Ok(success)
    }

    /// Queries the number of runspaces currently available.
    ///
    /// The correlation id is only known after the transport call returns,
    /// so the waiter's predicate reads it out of a cell filled in after
    /// registration rather than capturing it directly.
    pub fn get_available_runspaces(&self) -> Result<i64, PsrpError> {
        let ci_cell: Arc<Mutex<Option<i64>>> = Arc::new(Mutex::new(None));
        let ci_cell_for_predicate = Arc::clone(&ci_cell);
        let waiter = self
            .0
            .waiters
            .get_availability
            .new_registered_with(move |event| {
                ci_cell_for_predicate
                    .lock()
                    .expect("ci cell lock poisoned")
                    .is_some_and(|ci| event.ci == ci)
            });
        let ci = self.0.transport.get_available_runspaces(self.0.handle());
        *ci_cell.lock().expect("ci cell lock poisoned") = Some(ci);
        trace!(ci, "waiting for runspace availability response");
        Ok(waiter.wait().count)
    }

    /// Enumerates disconnected runspace pools known to the transport,
    /// returning a handle (in the `Disconnected` state) for each, with its
    /// pipeline table pre-populated from the reported command ids.
    #[must_use]
    pub fn enumerate(transport: Arc<dyn Transport>, host: Option<Arc<dyn Host>>) -> Vec<Self> {
        transport
            .enumerate()
            .into_iter()
            .map(|(pool_id, pipeline_ids)| {
                let inner = Arc::new(RunspacePoolInner {
                    id: pool_id,
                    transport: Arc::clone(&transport),
                    state: Mutex::new(RunspacePoolState::Disconnected),
                    min_runspaces: Mutex::new(1),
                    max_runspaces: Mutex::new(1),
                    apartment_state: ApartmentState::Unknown,
                    thread_options: PsThreadOptions::Default,
                    host: host.clone(),
                    application_arguments: PsValue::Null,
                    application_private_data: Mutex::new(None),
                    new_client: AtomicBool::new(true),
                    pipeline_table: Mutex::new(HashMap::new()),
                    stream_debug: DataCollection::new(),
                    stream_error: DataCollection::new(),
                    stream_information: DataCollection::new(),
                    stream_progress: DataCollection::new(),
                    stream_verbose: DataCollection::new(),
                    stream_warning: DataCollection::new(),
                    state_changed: EventSubscribers::new(),
                    user_event: EventSubscribers::new(),
                    waiters: PoolWaiters::default(),
                    dispatcher_thread: Mutex::new(None),
                });
                for pipeline_id in pipeline_ids {
                    let pipeline = PipelineInner::with_id(
                        pipeline_id,
                        Arc::downgrade(&inner),
                        crate::pipeline::power_shell_kind(false),
                    );
                    pipeline.set_state(crate::event::PipelineState::Disconnected);
                    let mut table = inner.pipeline_table.lock().expect("pipeline table lock poisoned");
                    table.insert(pipeline_id, pipeline);
                }
                Self(inner)
            })
            .collect()
    }
}

/// Builds a [`RunspacePool`] with protocol defaults matching a fresh
/// client-side session.
#[derive(TypedBuilder)]
pub struct RunspacePoolCreator {
    #[builder(default = Uuid::new_v4())]
    id: Uuid,
    #[builder(default = 1)]
    min_runspaces: usize,
    #[builder(default = 1)]
    max_runspaces: usize,
    #[builder(default = ApartmentState::Unknown)]
    apartment_state: ApartmentState,
    #[builder(default = PsThreadOptions::Default)]
    thread_options: PsThreadOptions,
    #[builder(default, setter(strip_option))]
    host: Option<Arc<dyn Host>>,
    #[builder(default)]
    application_arguments: PsValue,
}

impl RunspacePoolCreator {
    pub fn into_runspace_pool(self, transport: Arc<dyn Transport>) -> Result<RunspacePool, PsrpError> {
        if self.min_runspaces < 1 || self.max_runspaces < self.min_runspaces {
            return Err(PsrpError::ConfigInvalid(
                "min_runspaces must be at least 1 and no greater than max_runspaces",
            ));
        }
        Ok(RunspacePool(Arc::new(RunspacePoolInner {
            id: self.id,
            transport,
            state: Mutex::new(RunspacePoolState::BeforeOpen),
            min_runspaces: Mutex::new(self.min_runspaces),
            max_runspaces: Mutex::new(self.max_runspaces),
            apartment_state: self.apartment_state,
            thread_options: self.thread_options,
            host: self.host,
            application_arguments: self.application_arguments,
            application_private_data: Mutex::new(None),
            new_client: AtomicBool::new(true),
            pipeline_table: Mutex::new(HashMap::new()),
            stream_debug: DataCollection::new(),
            stream_error: DataCollection::new(),
            stream_information: DataCollection::new(),
            stream_progress: DataCollection::new(),
            stream_verbose: DataCollection::new(),
            stream_warning: DataCollection::new(),
            state_changed: EventSubscribers::new(),
            user_event: EventSubscribers::new(),
            waiters: PoolWaiters::default(),
            dispatcher_thread: Mutex::new(None),
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_min_runspaces() {
        let creator = RunspacePoolCreator::builder().min_runspaces(0).build();
        let err = creator.into_runspace_pool(crate::testing::fake_transport()).unwrap_err();
        assert!(matches!(err, PsrpError::ConfigInvalid(_)));
    }

    #[test]
    fn rejects_max_below_min() {
        let creator = RunspacePoolCreator::builder().min_runspaces(5).max_runspaces(2).build();
        let err = creator.into_runspace_pool(crate::testing::fake_transport()).unwrap_err();
        assert!(matches!(err, PsrpError::ConfigInvalid(_)));
    }

    #[test]
    fn defaults_build_a_single_runspace_pool_before_open() {
        let pool = RunspacePoolCreator::builder()
            .build()
            .into_runspace_pool(crate::testing::fake_transport())
            .unwrap();
        assert_eq!(pool.state(), RunspacePoolState::BeforeOpen);
    }
}
