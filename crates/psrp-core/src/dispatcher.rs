use std::sync::Arc;

use tracing::{error, trace, warn};

use crate::event::PsrpEvent;
use crate::host::{self, HostCallRequest, HostInvocationOutcome};
use crate::runspace_pool::{RunspacePoolInner, RunspacePoolState};

/// The single inbound demultiplexing point for one runspace pool.
///
/// Runs on its own thread for the lifetime of the pool, pulling events off
/// the transport and routing each one by `pipeline_id` (when present) down
/// to the owning pipeline, or handling it at pool scope otherwise. Once the
/// transport's event stream ends, every open stream is completed and the
/// pool is marked `Broken` — this is the one place a transport failure
/// becomes visible to blocked callers.
pub(crate) fn run(pool: Arc<RunspacePoolInner>) {
    loop {
        match pool.transport.wait_event() {
            Some(event) => handle_event(&pool, event),
            None => {
                warn!(pool_id = %pool.id, "transport event stream ended, marking pool broken");
                break;
            }
        }
    }
    pool.set_state(RunspacePoolState::Broken);
    complete_all_streams(&pool);
}

fn complete_all_streams(pool: &Arc<RunspacePoolInner>) {
    pool.stream_debug.complete();
    pool.stream_error.complete();
    pool.stream_information.complete();
    pool.stream_progress.complete();
    pool.stream_verbose.complete();
    pool.stream_warning.complete();
    for pipeline in pool.pipeline_table.lock().expect("pipeline table lock poisoned").values() {
        pipeline.stream_output.complete();
        pipeline.stream_debug.complete();
        pipeline.stream_error.complete();
        pipeline.stream_information.complete();
        pipeline.stream_progress.complete();
        pipeline.stream_verbose.complete();
    }
}

fn handle_event(pool: &Arc<RunspacePoolInner>, event: PsrpEvent) {
    trace!(?event, "dispatching event");
    if let Some(pipeline_id) = event.pipeline_id() {
        handle_pipeline_scoped(pool, pipeline_id, event);
        return;
    }
    handle_pool_scoped(pool, event);
}

fn handle_pipeline_scoped(pool: &Arc<RunspacePoolInner>, pipeline_id: uuid::Uuid, event: PsrpEvent) {
    let pipeline = pool
        .pipeline_table
        .lock()
        .expect("pipeline table lock poisoned")
        .get(&pipeline_id)
        .cloned();
    let Some(pipeline) = pipeline else {
        warn!(%pipeline_id, "event for unknown pipeline, dropping");
        return;
    };

    match event {
        PsrpEvent::PipelineState(state_event) => {
            pipeline.set_state(state_event.state);
            pipeline.state_changed.fire(&state_event);
            pipeline.waiters.offer(&state_event);
        }
        PsrpEvent::PipelineOutput(output_event) => {
            pipeline.stream_output.protocol_append(output_event.data);
        }
        PsrpEvent::PipelineHostCall(call_event) => {
            route_host_call(pool, Some(&pipeline.stream_error), call_event.call);
        }
        PsrpEvent::DebugRecord(e) => pipeline.stream_debug.protocol_append(e.record),
        PsrpEvent::VerboseRecord(e) => pipeline.stream_verbose.protocol_append(e.record),
        PsrpEvent::WarningRecord(e) => pipeline.stream_warning.protocol_append(e.record),
        PsrpEvent::InformationRecord(e) => pipeline.stream_information.protocol_append(e.record),
        PsrpEvent::ProgressRecord(e) => pipeline.stream_progress.protocol_append(e.record),
        PsrpEvent::ErrorRecord(e) => pipeline.stream_error.protocol_append(e.record),
        other => warn!(?other, "unexpected pipeline-scoped event kind"),
    }
}

fn handle_pool_scoped(pool: &Arc<RunspacePoolInner>, event: PsrpEvent) {
    match event {
        PsrpEvent::SessionCapability(e) => pool.waiters.session_capability.offer(&e),
        PsrpEvent::RunspacePoolInitData(e) => pool.waiters.init_data.offer(&e),
        PsrpEvent::ApplicationPrivateData(e) => pool.waiters.app_private_data.offer(&e),
        PsrpEvent::EncryptedSessionKey(e) => pool.waiters.encrypted_key.offer(&e),
        PsrpEvent::GetRunspaceAvailability(e) => pool.waiters.get_availability.offer(&e),
        PsrpEvent::SetRunspaceAvailability(e) => pool.waiters.set_availability.offer(&e),
        PsrpEvent::RunspacePoolState(e) => {
            pool.set_state(e.state);
            pool.state_changed.fire(&e);
            pool.waiters.state.offer(&e);
        }
        PsrpEvent::UserEvent(e) => pool.user_event.fire(&e),
        PsrpEvent::RunspacePoolHostCall(e) => {
            route_host_call(pool, Some(&pool.stream_error), e.call);
        }
        PsrpEvent::DebugRecord(e) => pool.stream_debug.protocol_append(e.record),
        PsrpEvent::VerboseRecord(e) => pool.stream_verbose.protocol_append(e.record),
        PsrpEvent::WarningRecord(e) => pool.stream_warning.protocol_append(e.record),
        PsrpEvent::InformationRecord(e) => pool.stream_information.protocol_append(e.record),
        PsrpEvent::ProgressRecord(e) => pool.stream_progress.protocol_append(e.record),
        PsrpEvent::ErrorRecord(e) => pool.stream_error.protocol_append(e.record),
        other => warn!(?other, "unexpected pool-scoped event kind"),
    }
}

fn route_host_call(
    pool: &Arc<RunspacePoolInner>,
    error_stream: Option<&crate::data_collection::DataCollection<crate::event::ErrorRecord>>,
    call: HostCallRequest,
) {
    let outcome = host::invoke(pool.host.as_deref(), &call);
    match outcome {
        HostInvocationOutcome::Dropped => {}
        HostInvocationOutcome::ErrorOnly(record) => {
            if let Some(stream) = error_stream {
                stream.protocol_append(record);
            }
        }
        HostInvocationOutcome::Response(response) => {
            if let Err(e) = pool.send_host_response_with_retry(response) {
                error!(error = %e, "failed to send host call response");
            }
        }
    }
}
