use std::sync::Arc;

use futures::executor::block_on;
use futures::StreamExt;

use psrp_async::{AsyncPowerShell, AsyncRunspacePool};
use psrp_core::event::{PipelineOutputEvent, PipelineState, PipelineStateEvent, PsrpEvent};
use psrp_core::testing::FakeTransport;
use psrp_core::{PowerShell, PsValue, RunspacePoolCreator, Transport};

#[test]
fn open_and_invoke_round_trip_through_futures() {
    let transport = FakeTransport::new();
    let pool = RunspacePoolCreator::builder()
        .build()
        .into_runspace_pool(Arc::clone(&transport) as Arc<dyn Transport>)
        .expect("valid runspace pool configuration");
    let pool = AsyncRunspacePool::new(pool);

    block_on(pool.open()).expect("fake transport always reports the pool opened");

    let ps = AsyncPowerShell::new(PowerShell::new(pool.blocking(), false).add_command("Write-Output").add_argument("hi"));
    let pipeline_id = ps.blocking().pipeline().id();
    transport.script_pipeline(
        pipeline_id,
        vec![
            PsrpEvent::PipelineOutput(PipelineOutputEvent {
                pool_id: pool.blocking().id(),
                pipeline_id,
                data: PsValue::from("hi"),
            }),
            PsrpEvent::PipelineState(PipelineStateEvent {
                pool_id: pool.blocking().id(),
                pipeline_id,
                state: PipelineState::Completed,
                reason: None,
            }),
        ],
    );

    let output = block_on(ps.invoke(None)).expect("pipeline completes successfully");
    assert_eq!(output, vec![PsValue::from("hi")]);
}

#[test]
fn stream_output_yields_items_as_they_are_appended() {
    let transport = FakeTransport::new();
    let pool = RunspacePoolCreator::builder()
        .build()
        .into_runspace_pool(Arc::clone(&transport) as Arc<dyn Transport>)
        .expect("valid runspace pool configuration");
    let pool = AsyncRunspacePool::new(pool);
    block_on(pool.open()).expect("fake transport always reports the pool opened");

    let ps = AsyncPowerShell::new(PowerShell::new(pool.blocking(), false).add_command("Write-Output").add_argument("x"));
    let pipeline_id = ps.blocking().pipeline().id();
    let mut output_stream = ps.stream_output();

    transport.script_pipeline(
        pipeline_id,
        vec![
            PsrpEvent::PipelineOutput(PipelineOutputEvent {
                pool_id: pool.blocking().id(),
                pipeline_id,
                data: PsValue::from("x"),
            }),
            PsrpEvent::PipelineState(PipelineStateEvent {
                pool_id: pool.blocking().id(),
                pipeline_id,
                state: PipelineState::Completed,
                reason: None,
            }),
        ],
    );

    block_on(ps.invoke(None)).expect("pipeline completes successfully");
    let first = block_on(output_stream.next());
    assert_eq!(first, Some(PsValue::from("x")));
}
