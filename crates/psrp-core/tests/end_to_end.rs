//! Scenario tests driving the engine against an in-memory transport double,
//! standing in for the kind of fixture-script testing PSRP clients normally
//! only get to do against a live WinRM endpoint.

use std::sync::{Arc, Mutex};

use psrp_core::event::{ErrorRecord, PipelineOutputEvent, PipelineState, PipelineStateEvent, PsrpEvent};
use psrp_core::host::{Coordinates, Host, HostRawUi, HostUi};
use psrp_core::testing::FakeTransport;
use psrp_core::{PowerShell, PsValue, RunspacePoolCreator};

fn opened_pool(transport: &Arc<FakeTransport>) -> psrp_core::RunspacePool {
    let pool = RunspacePoolCreator::builder()
        .build()
        .into_runspace_pool(Arc::clone(transport) as Arc<dyn psrp_core::Transport>)
        .expect("valid runspace pool configuration");
    pool.open().expect("fake transport always reports the pool opened");
    pool
}

#[test]
fn hello_world_returns_the_commands_output() {
    let transport = FakeTransport::new();
    let pool = opened_pool(&transport);

    let ps = PowerShell::new(&pool, false).add_command("Write-Output").add_argument("hello");
    let pipeline_id = ps.pipeline().id();
    transport.script_pipeline(
        pipeline_id,
        vec![
            PsrpEvent::PipelineOutput(PipelineOutputEvent {
                pool_id: pool.id(),
                pipeline_id,
                data: PsValue::from("hello"),
            }),
            PsrpEvent::PipelineState(PipelineStateEvent {
                pool_id: pool.id(),
                pipeline_id,
                state: PipelineState::Completed,
                reason: None,
            }),
        ],
    );

    let output = ps.invoke(None).expect("pipeline completes successfully");
    assert_eq!(output, vec![PsValue::from("hello")]);
    assert!(!ps.had_errors());
}

#[test]
fn error_stream_is_visible_even_on_a_completed_pipeline() {
    let transport = FakeTransport::new();
    let pool = opened_pool(&transport);

    let ps = PowerShell::new(&pool, false).add_command("Write-Error").add_argument("boom");
    let pipeline_id = ps.pipeline().id();
    transport.script_pipeline(
        pipeline_id,
        vec![
            PsrpEvent::ErrorRecord(psrp_core::event::ErrorRecordEvent {
                pool_id: pool.id(),
                pipeline_id: Some(pipeline_id),
                record: ErrorRecord {
                    message: "boom".to_owned(),
                    fully_qualified_error_id: "WriteErrorException".to_owned(),
                    category: "NotSpecified".to_owned(),
                },
            }),
            PsrpEvent::PipelineState(PipelineStateEvent {
                pool_id: pool.id(),
                pipeline_id,
                state: PipelineState::Completed,
                reason: None,
            }),
        ],
    );

    let output = ps.invoke(None).expect("a non-terminating error does not fail the pipeline");
    assert!(output.is_empty());
    assert!(ps.had_errors());
    assert_eq!(ps.pipeline().stream_error().len(), 1);
}

#[test]
fn pipeline_failure_surfaces_as_an_error() {
    let transport = FakeTransport::new();
    let pool = opened_pool(&transport);

    let ps = PowerShell::new(&pool, false).add_command("Throw-Something");
    let pipeline_id = ps.pipeline().id();
    transport.script_pipeline(
        pipeline_id,
        vec![PsrpEvent::PipelineState(PipelineStateEvent {
            pool_id: pool.id(),
            pipeline_id,
            state: PipelineState::Failed,
            reason: Some("terminating exception".to_owned()),
        })],
    );

    let err = ps.invoke(None).unwrap_err();
    assert!(matches!(err, psrp_core::PsrpError::PipelineFailed(reason) if reason == "terminating exception"));
}

#[test]
fn stop_transitions_a_running_pipeline_to_stopped() {
    let transport = FakeTransport::new();
    let pool = opened_pool(&transport);

    let ps = Arc::new(PowerShell::new(&pool, false).add_script("while ($true) {}"));
    // No terminal event scripted for `command`; the stop signal alone
    // resolves the waiter the invoking thread is blocked on.
    let invoking = {
        let ps = Arc::clone(&ps);
        std::thread::spawn(move || ps.invoke(None))
    };

    // Give the invoking thread a chance to register its waiter before the
    // stop signal arrives; a real transport would take far longer than this.
    std::thread::sleep(std::time::Duration::from_millis(20));
    ps.stop().expect("stop signal accepted");

    let result = invoking.join().expect("invoking thread does not panic");
    assert!(matches!(result, Err(psrp_core::PsrpError::PipelineStopped(_))));
}

#[test]
fn get_available_runspaces_round_trips_through_the_ci_waiter() {
    let transport = FakeTransport::new();
    let pool = opened_pool(&transport);

    let available = pool.get_available_runspaces().expect("fake transport always answers");
    assert_eq!(available, 1);
}

#[test]
fn availability_tracks_usage_and_enforces_min_max_boundaries() {
    let transport = FakeTransport::new();
    let pool = RunspacePoolCreator::builder()
        .min_runspaces(1)
        .max_runspaces(5)
        .build()
        .into_runspace_pool(Arc::clone(&transport) as Arc<dyn psrp_core::Transport>)
        .expect("valid runspace pool configuration");
    pool.open().expect("fake transport always reports the pool opened");

    assert_eq!(pool.get_available_runspaces().expect("fake transport always answers"), 5);

    let ps = Arc::new(PowerShell::new(&pool, false).add_script("Start-Sleep 10"));
    let pipeline_id = ps.pipeline().id();
    // No terminal event scripted yet: `command` claims a runspace and the
    // invoking thread blocks until one arrives, mirroring a pipeline that
    // is still running.
    let invoking = {
        let ps = Arc::clone(&ps);
        std::thread::spawn(move || ps.invoke(None))
    };
    std::thread::sleep(std::time::Duration::from_millis(20));

    assert_eq!(pool.get_available_runspaces().expect("fake transport always answers"), 4);

    assert!(!pool.set_min_runspaces(0).expect("set_min_runspaces round-trips"));
    assert!(!pool.set_max_runspaces(0).expect("set_max_runspaces below min is rejected"));
    assert!(pool.set_max_runspaces(10).expect("set_max_runspaces round-trips"));

    transport.push(PsrpEvent::PipelineState(PipelineStateEvent {
        pool_id: pool.id(),
        pipeline_id,
        state: PipelineState::Completed,
        reason: None,
    }));
    invoking
        .join()
        .expect("invoking thread does not panic")
        .expect("pipeline completes once the terminal event arrives");

    assert_eq!(pool.get_available_runspaces().expect("fake transport always answers"), 10);
}

#[test]
fn secure_string_input_triggers_a_single_key_exchange_retry() {
    let transport = FakeTransport::new();
    transport.require_key_exchange();
    let pool = opened_pool(&transport);

    let ps = PowerShell::new(&pool, false).add_command("Get-Credential");
    let pipeline_id = ps.pipeline().id();
    transport.script_pipeline(
        pipeline_id,
        vec![PsrpEvent::PipelineState(PipelineStateEvent {
            pool_id: pool.id(),
            pipeline_id,
            state: PipelineState::Completed,
            reason: None,
        })],
    );

    // `command` fails once with MissingCipherError until exchange_key runs;
    // invoke() must recover transparently.
    let output = ps.invoke(None).expect("command succeeds after the internal retry");
    assert!(output.is_empty());
}

struct RecordingHost {
    ui: RecordingUi,
}

struct RecordingUi {
    raw: RecordingRawUi,
}

struct RecordingRawUi {
    cursor: Mutex<Coordinates>,
}

impl Host for RecordingHost {
    fn ui(&self) -> Option<&dyn HostUi> {
        Some(&self.ui)
    }
}

impl HostUi for RecordingUi {
    fn raw_ui(&self) -> Option<&dyn HostRawUi> {
        Some(&self.raw)
    }
}

impl HostRawUi for RecordingRawUi {
    fn set_cursor_position(&self, value: Coordinates) -> psrp_core::host::HostResult<()> {
        *self.cursor.lock().expect("cursor lock poisoned") = value;
        Ok(())
    }
}

#[test]
fn a_host_call_mid_pipeline_is_dispatched_and_acknowledged() {
    use psrp_core::host::{HostCallRequest, HostCallScope, RemoteHostMethodId};

    let transport = FakeTransport::new();
    let host = Arc::new(RecordingHost {
        ui: RecordingUi {
            raw: RecordingRawUi { cursor: Mutex::new(Coordinates::default()) },
        },
    });
    let pool = RunspacePoolCreator::builder()
        .host(Arc::clone(&host) as Arc<dyn Host>)
        .build()
        .into_runspace_pool(Arc::clone(&transport) as Arc<dyn psrp_core::Transport>)
        .expect("valid configuration");
    pool.open().expect("fake transport always reports the pool opened");

    let ps = PowerShell::new(&pool, false).add_command("Set-CursorPosition");
    let pipeline_id = ps.pipeline().id();
    let position = PsValue::Map(std::collections::BTreeMap::from([
        ("x".to_owned(), PsValue::Int(3)),
        ("y".to_owned(), PsValue::Int(7)),
    ]));
    transport.script_pipeline(
        pipeline_id,
        vec![
            PsrpEvent::PipelineHostCall(psrp_core::event::PipelineHostCallEvent {
                pool_id: pool.id(),
                pipeline_id,
                call: HostCallRequest {
                    scope: HostCallScope::Pipeline { command_id: pipeline_id },
                    call_id: 1,
                    method_id: RemoteHostMethodId::SetCursorPosition,
                    parameters: vec![position],
                },
            }),
            PsrpEvent::PipelineState(PipelineStateEvent {
                pool_id: pool.id(),
                pipeline_id,
                state: PipelineState::Completed,
                reason: None,
            }),
        ],
    );

    ps.invoke(None).expect("pipeline completes after the host call round trip");
    assert_eq!(*host.ui.raw.cursor.lock().unwrap(), Coordinates { x: 3, y: 7 });
    // SetCursorPosition is a void host method: the engine applies it but
    // sends no response back, unlike a getter such as GetCursorPosition.
    assert!(transport.sent_host_responses.lock().unwrap().is_empty());
}
