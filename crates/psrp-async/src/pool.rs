use std::future::Future;

use futures::stream::StreamExt;
use futures::Stream;

use psrp_core::event::{
    DebugRecord, ErrorRecord, InformationRecord, ProgressRecord, RunspacePoolStateEvent,
    UserEventEvent, VerboseRecord, WarningRecord,
};
use psrp_core::{PsrpError, RunspacePool};

use crate::bridge::{spawn_blocking, stream_of, subscription_stream};

/// One item off any of a runspace pool's informational streams or
/// notification channels, merged into a single polled sequence by
/// [`AsyncRunspacePool::events`].
#[derive(Debug, Clone)]
pub enum PoolEvent {
    StateChanged(RunspacePoolStateEvent),
    UserEvent(UserEventEvent),
    Debug(DebugRecord),
    Verbose(VerboseRecord),
    Warning(WarningRecord),
    Information(InformationRecord),
    Progress(ProgressRecord),
    Error(ErrorRecord),
}

/// Async-friendly wrapper over a [`RunspacePool`].
///
/// Every blocking operation is offloaded to a dedicated worker thread and
/// returned as a `Future`; every stream is offloaded via subscriber
/// callbacks instead of a blocking iterator. None of the pool's state
/// machine is reimplemented here — this only changes how callers wait.
#[derive(Clone)]
pub struct AsyncRunspacePool {
    inner: RunspacePool,
}

impl AsyncRunspacePool {
    #[must_use]
    pub fn new(inner: RunspacePool) -> Self {
        Self { inner }
    }

    /// Escapes back to the blocking handle, for callers mixing the two
    /// styles (e.g. reading `state()` synchronously between awaits).
    #[must_use]
    pub fn blocking(&self) -> &RunspacePool {
        &self.inner
    }

    pub fn open(&self) -> impl Future<Output = Result<(), PsrpError>> {
        let pool = self.inner.clone();
        spawn_blocking(move || pool.open())
    }

    pub fn connect(&self) -> impl Future<Output = Result<(), PsrpError>> {
        let pool = self.inner.clone();
        spawn_blocking(move || pool.connect())
    }

    pub fn close(&self) -> impl Future<Output = Result<(), PsrpError>> {
        let pool = self.inner.clone();
        spawn_blocking(move || pool.close())
    }

    pub fn disconnect(&self) -> impl Future<Output = Result<(), PsrpError>> {
        let pool = self.inner.clone();
        spawn_blocking(move || pool.disconnect())
    }

    pub fn exchange_key(&self) -> impl Future<Output = Result<(), PsrpError>> {
        let pool = self.inner.clone();
        spawn_blocking(move || pool.exchange_key())
    }

    pub fn reset_runspace_state(&self) -> impl Future<Output = Result<bool, PsrpError>> {
        let pool = self.inner.clone();
        spawn_blocking(move || pool.reset_runspace_state())
    }

    pub fn set_min_runspaces(&self, value: usize) -> impl Future<Output = Result<bool, PsrpError>> {
        let pool = self.inner.clone();
        spawn_blocking(move || pool.set_min_runspaces(value))
    }

    pub fn set_max_runspaces(&self, value: usize) -> impl Future<Output = Result<bool, PsrpError>> {
        let pool = self.inner.clone();
        spawn_blocking(move || pool.set_max_runspaces(value))
    }

    pub fn get_available_runspaces(&self) -> impl Future<Output = Result<i64, PsrpError>> {
        let pool = self.inner.clone();
        spawn_blocking(move || pool.get_available_runspaces())
    }

    #[must_use]
    pub fn stream_debug(&self) -> impl Stream<Item = DebugRecord> + 'static {
        stream_of(self.inner.stream_debug())
    }

    #[must_use]
    pub fn stream_error(&self) -> impl Stream<Item = ErrorRecord> + 'static {
        stream_of(self.inner.stream_error())
    }

    #[must_use]
    pub fn stream_verbose(&self) -> impl Stream<Item = VerboseRecord> + 'static {
        stream_of(self.inner.stream_verbose())
    }

    #[must_use]
    pub fn stream_warning(&self) -> impl Stream<Item = WarningRecord> + 'static {
        stream_of(self.inner.stream_warning())
    }

    #[must_use]
    pub fn stream_information(&self) -> impl Stream<Item = InformationRecord> + 'static {
        stream_of(self.inner.stream_information())
    }

    #[must_use]
    pub fn stream_progress(&self) -> impl Stream<Item = ProgressRecord> + 'static {
        stream_of(self.inner.stream_progress())
    }

    #[must_use]
    pub fn state_changed(&self) -> impl Stream<Item = RunspacePoolStateEvent> + 'static {
        subscription_stream(self.inner.state_changed())
    }

    #[must_use]
    pub fn user_event(&self) -> impl Stream<Item = UserEventEvent> + 'static {
        subscription_stream(self.inner.user_event())
    }

    /// Fans in every per-kind stream into one ordered-by-arrival sequence,
    /// the async counterpart of picking a kind off the dispatcher one
    /// event at a time.
    #[must_use]
    pub fn events(&self) -> impl Stream<Item = PoolEvent> + Send + 'static {
        let mut state_changed = self.state_changed().fuse();
        let mut user_event = self.user_event().fuse();
        let mut debug = self.stream_debug().fuse();
        let mut verbose = self.stream_verbose().fuse();
        let mut warning = self.stream_warning().fuse();
        let mut information = self.stream_information().fuse();
        let mut progress = self.stream_progress().fuse();
        let mut error = self.stream_error().fuse();

        async_stream::stream! {
            loop {
                futures::select! {
                    event = state_changed.next() => if let Some(event) = event { yield PoolEvent::StateChanged(event) },
                    event = user_event.next() => if let Some(event) = event { yield PoolEvent::UserEvent(event) },
                    event = debug.next() => if let Some(event) = event { yield PoolEvent::Debug(event) },
                    event = verbose.next() => if let Some(event) = event { yield PoolEvent::Verbose(event) },
                    event = warning.next() => if let Some(event) = event { yield PoolEvent::Warning(event) },
                    event = information.next() => if let Some(event) = event { yield PoolEvent::Information(event) },
                    event = progress.next() => if let Some(event) = event { yield PoolEvent::Progress(event) },
                    event = error.next() => if let Some(event) = event { yield PoolEvent::Error(event) },
                    complete => break,
                }
            }
        }
    }
}
