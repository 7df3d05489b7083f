//! An in-memory [`Transport`] double for exercising the engine without a
//! real WinRM/SSH connection. Exposed behind the `test-helpers` feature so
//! downstream integration tests can depend on it too.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Condvar, Mutex};

use uuid::Uuid;

use crate::error::PsrpError;
use crate::event::{
    ApplicationPrivateDataEvent, EncryptedSessionKeyEvent, GetRunspaceAvailabilityEvent,
    PipelineState, PipelineStateEvent, PsrpEvent, RunspacePoolInitDataEvent, RunspacePoolStateEvent,
    SessionCapabilityEvent, SetRunspaceAvailabilityEvent,
};
use crate::host::HostCallResponse;
use crate::runspace_pool::RunspacePoolState;
use crate::transport::{MissingCipherError, PipelineSpec, PoolHandle, Transport, TransportOpError};
use crate::value::PsValue;

/// Tracks the same `min`/`max`/`available` runspace counts a real WinRM
/// endpoint would, so `set_min_runspaces`/`set_max_runspaces`/
/// `get_available_runspaces` can be exercised against realistic
/// success/failure and count semantics instead of a fixed stub reply.
struct RunspaceCounts {
    min: i64,
    max: i64,
    available: i64,
}

impl Default for RunspaceCounts {
    fn default() -> Self {
        Self { min: 1, max: 1, available: 1 }
    }
}

#[derive(Default)]
pub struct FakeTransport {
    events: Mutex<VecDeque<PsrpEvent>>,
    condvar: Condvar,
    closed: AtomicBool,
    cipher_ready: AtomicBool,
    require_cipher: AtomicBool,
    next_ci: AtomicI64,
    scripts: Mutex<HashMap<Uuid, Vec<PsrpEvent>>>,
    counts: Mutex<RunspaceCounts>,
    pub sent_host_responses: Mutex<Vec<HostCallResponse>>,
    pub sent_inputs: Mutex<Vec<(Uuid, PsValue)>>,
}

impl FakeTransport {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push(&self, event: PsrpEvent) {
        // A pipeline reaching a terminal state frees the runspace it was
        // occupying, the same way `command` below claims one.
        if let PsrpEvent::PipelineState(ref state_event) = event {
            if matches!(
                state_event.state,
                PipelineState::Completed | PipelineState::Failed | PipelineState::Stopped
            ) {
                let mut counts = self.counts.lock().expect("fake transport counts lock poisoned");
                counts.available = (counts.available + 1).min(counts.max);
            }
        }
        self.events.lock().expect("fake transport queue lock poisoned").push_back(event);
        self.condvar.notify_all();
    }

    pub fn close_stream(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.condvar.notify_all();
    }

    /// Registers the sequence of events that `command()` should deliver
    /// for a given pipeline once it is invoked (typically ending with a
    /// terminal `PipelineState` event).
    pub fn script_pipeline(&self, pipeline_id: Uuid, events: Vec<PsrpEvent>) {
        self.scripts
            .lock()
            .expect("fake transport scripts lock poisoned")
            .insert(pipeline_id, events);
    }

    /// Makes `command`/`send_input` fail with `MissingCipherError` until
    /// `exchange_key` has been called once.
    pub fn require_key_exchange(&self) {
        self.require_cipher.store(true, Ordering::SeqCst);
    }
}

impl Transport for FakeTransport {
    fn create(&self, pool: PoolHandle, min_runspaces: usize, max_runspaces: usize) -> Result<(), PsrpError> {
        {
            let mut counts = self.counts.lock().expect("fake transport counts lock poisoned");
            counts.min = min_runspaces as i64;
            counts.max = max_runspaces as i64;
            counts.available = max_runspaces as i64;
        }
        self.push(PsrpEvent::RunspacePoolState(RunspacePoolStateEvent {
            pool_id: pool.id,
            state: RunspacePoolState::Opened,
            reason: None,
        }));
        Ok(())
    }

    fn connect(&self, pool: PoolHandle) -> Result<(), PsrpError> {
        self.push(PsrpEvent::SessionCapability(SessionCapabilityEvent {
            pool_id: pool.id,
            protocol_version: "2.3".to_owned(),
        }));
        self.push(PsrpEvent::RunspacePoolInitData(RunspacePoolInitDataEvent {
            pool_id: pool.id,
            min_runspaces: 1,
            max_runspaces: 1,
        }));
        self.push(PsrpEvent::ApplicationPrivateData(ApplicationPrivateDataEvent {
            pool_id: pool.id,
            data: PsValue::Null,
        }));
        Ok(())
    }

    fn reconnect(&self, _pool: PoolHandle) -> Result<(), PsrpError> {
        Ok(())
    }

    fn disconnect(&self, _pool: PoolHandle) -> Result<(), PsrpError> {
        Ok(())
    }

    fn close(&self, _pool: PoolHandle, _pipeline_id: Option<Uuid>) -> Result<(), PsrpError> {
        Ok(())
    }

    fn command(&self, _pool: PoolHandle, pipeline_id: Uuid, _spec: &PipelineSpec) -> Result<(), TransportOpError> {
        if self.require_cipher.load(Ordering::SeqCst) && !self.cipher_ready.load(Ordering::SeqCst) {
            return Err(TransportOpError::MissingCipher(MissingCipherError));
        }
        // A running pipeline occupies one runspace until it reaches a
        // terminal state (freed back in `push`).
        self.counts.lock().expect("fake transport counts lock poisoned").available -= 1;
        let events = self
            .scripts
            .lock()
            .expect("fake transport scripts lock poisoned")
            .remove(&pipeline_id)
            .unwrap_or_default();
        for event in events {
            self.push(event);
        }
        Ok(())
    }

    fn send_input(&self, _pool: PoolHandle, pipeline_id: Uuid, value: PsValue, _buffer: bool) -> Result<(), TransportOpError> {
        if self.require_cipher.load(Ordering::SeqCst) && !self.cipher_ready.load(Ordering::SeqCst) {
            return Err(TransportOpError::MissingCipher(MissingCipherError));
        }
        self.sent_inputs
            .lock()
            .expect("fake transport sent_inputs lock poisoned")
            .push((pipeline_id, value));
        Ok(())
    }

    fn send_end(&self, _pool: PoolHandle, _pipeline_id: Uuid) -> Result<(), PsrpError> {
        Ok(())
    }

    fn signal(&self, pool: PoolHandle, pipeline_id: Uuid) -> Result<(), PsrpError> {
        self.push(PsrpEvent::PipelineState(PipelineStateEvent {
            pool_id: pool.id,
            pipeline_id,
            state: PipelineState::Stopped,
            reason: Some("stopped by request".to_owned()),
        }));
        Ok(())
    }

    fn exchange_key(&self, pool: PoolHandle) -> Result<(), PsrpError> {
        self.cipher_ready.store(true, Ordering::SeqCst);
        self.push(PsrpEvent::EncryptedSessionKey(EncryptedSessionKeyEvent { pool_id: pool.id }));
        Ok(())
    }

    fn reset_runspace_state(&self, _pool: PoolHandle) -> Option<i64> {
        None
    }

    fn set_min_runspaces(&self, pool: PoolHandle, value: usize) -> Option<i64> {
        let ci = self.next_ci.fetch_add(1, Ordering::SeqCst);
        let value = value as i64;
        let success = {
            let mut counts = self.counts.lock().expect("fake transport counts lock poisoned");
            let ok = value >= 1 && value <= counts.max;
            if ok {
                counts.min = value;
            }
            ok
        };
        self.push(PsrpEvent::SetRunspaceAvailability(SetRunspaceAvailabilityEvent {
            pool_id: pool.id,
            ci,
            success,
        }));
        Some(ci)
    }

    fn set_max_runspaces(&self, pool: PoolHandle, value: usize) -> Option<i64> {
        let ci = self.next_ci.fetch_add(1, Ordering::SeqCst);
        let value = value as i64;
        let success = {
            let mut counts = self.counts.lock().expect("fake transport counts lock poisoned");
            let ok = value >= counts.min;
            if ok {
                counts.available = (counts.available + (value - counts.max)).clamp(0, value);
                counts.max = value;
            }
            ok
        };
        self.push(PsrpEvent::SetRunspaceAvailability(SetRunspaceAvailabilityEvent {
            pool_id: pool.id,
            ci,
            success,
        }));
        Some(ci)
    }

    fn get_available_runspaces(&self, pool: PoolHandle) -> i64 {
        let ci = self.next_ci.fetch_add(1, Ordering::SeqCst);
        let count = self.counts.lock().expect("fake transport counts lock poisoned").available;
        self.push(PsrpEvent::GetRunspaceAvailability(GetRunspaceAvailabilityEvent {
            pool_id: pool.id,
            ci,
            count,
        }));
        ci
    }

    fn host_response(&self, _pool: PoolHandle, response: HostCallResponse) -> Result<(), TransportOpError> {
        self.sent_host_responses
            .lock()
            .expect("fake transport sent_host_responses lock poisoned")
            .push(response);
        Ok(())
    }

    fn wait_event(&self) -> Option<PsrpEvent> {
        let mut events = self.events.lock().expect("fake transport queue lock poisoned");
        loop {
            if let Some(event) = events.pop_front() {
                return Some(event);
            }
            if self.closed.load(Ordering::SeqCst) {
                return None;
            }
            events = self.condvar.wait(events).expect("fake transport queue lock poisoned");
        }
    }

    fn enumerate(&self) -> Vec<(Uuid, Vec<Uuid>)> {
        Vec::new()
    }
}

#[must_use]
pub fn fake_transport() -> Arc<dyn Transport> {
    FakeTransport::new()
}
