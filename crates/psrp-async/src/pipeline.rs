use std::future::Future;

use futures::stream::StreamExt;
use futures::Stream;

use psrp_core::event::{
    DebugRecord, ErrorRecord, InformationRecord, PipelineStateEvent, ProgressRecord, VerboseRecord,
    WarningRecord,
};
use psrp_core::{CommandMetadataPipeline, Pipeline, PowerShell, PsValue, PsrpError};

use crate::bridge::{spawn_blocking, stream_of, subscription_stream};

/// One item off a pipeline's output or informational streams, merged into
/// a single polled sequence by the `events` method on both pipeline
/// wrappers in this module.
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    StateChanged(PipelineStateEvent),
    Output(PsValue),
    Debug(DebugRecord),
    Verbose(VerboseRecord),
    Warning(WarningRecord),
    Information(InformationRecord),
    Progress(ProgressRecord),
    Error(ErrorRecord),
}

macro_rules! pipeline_streams {
    ($self:ident) => {
        #[must_use]
        pub fn stream_output(&$self) -> impl Stream<Item = PsValue> + 'static {
            stream_of($self.pipeline().stream_output())
        }

        #[must_use]
        pub fn stream_debug(&$self) -> impl Stream<Item = DebugRecord> + 'static {
            stream_of($self.pipeline().stream_debug())
        }

        #[must_use]
        pub fn stream_error(&$self) -> impl Stream<Item = ErrorRecord> + 'static {
            stream_of($self.pipeline().stream_error())
        }

        #[must_use]
        pub fn stream_verbose(&$self) -> impl Stream<Item = VerboseRecord> + 'static {
            stream_of($self.pipeline().stream_verbose())
        }

        #[must_use]
        pub fn stream_warning(&$self) -> impl Stream<Item = WarningRecord> + 'static {
            stream_of($self.pipeline().stream_warning())
        }

        #[must_use]
        pub fn stream_information(&$self) -> impl Stream<Item = InformationRecord> + 'static {
            stream_of($self.pipeline().stream_information())
        }

        #[must_use]
        pub fn stream_progress(&$self) -> impl Stream<Item = ProgressRecord> + 'static {
            stream_of($self.pipeline().stream_progress())
        }

        #[must_use]
        pub fn state_changed(&$self) -> impl Stream<Item = PipelineStateEvent> + 'static {
            subscription_stream($self.pipeline().state_changed())
        }

        /// Fans in the output stream and every informational stream into
        /// one ordered-by-arrival sequence.
        #[must_use]
        pub fn events(&$self) -> impl Stream<Item = PipelineEvent> + Send + 'static {
            let mut state_changed = $self.state_changed().fuse();
            let mut output = $self.stream_output().fuse();
            let mut debug = $self.stream_debug().fuse();
            let mut verbose = $self.stream_verbose().fuse();
            let mut warning = $self.stream_warning().fuse();
            let mut information = $self.stream_information().fuse();
            let mut progress = $self.stream_progress().fuse();
            let mut error = $self.stream_error().fuse();

            async_stream::stream! {
                loop {
                    futures::select! {
                        event = state_changed.next() => if let Some(event) = event { yield PipelineEvent::StateChanged(event) },
                        event = output.next() => if let Some(event) = event { yield PipelineEvent::Output(event) },
                        event = debug.next() => if let Some(event) = event { yield PipelineEvent::Debug(event) },
                        event = verbose.next() => if let Some(event) = event { yield PipelineEvent::Verbose(event) },
                        event = warning.next() => if let Some(event) = event { yield PipelineEvent::Warning(event) },
                        event = information.next() => if let Some(event) = event { yield PipelineEvent::Information(event) },
                        event = progress.next() => if let Some(event) = event { yield PipelineEvent::Progress(event) },
                        event = error.next() => if let Some(event) = event { yield PipelineEvent::Error(event) },
                        complete => break,
                    }
                }
            }
        }
    };
}

/// Async-friendly wrapper over [`PowerShell`]: the fluent builder methods
/// are unchanged (they're cheap and synchronous), only `invoke`/`stop`/
/// `connect` and the streams become async.
#[derive(Clone)]
pub struct AsyncPowerShell {
    inner: PowerShell,
}

impl AsyncPowerShell {
    #[must_use]
    pub fn new(inner: PowerShell) -> Self {
        Self { inner }
    }

    #[must_use]
    pub fn blocking(&self) -> &PowerShell {
        &self.inner
    }

    fn pipeline(&self) -> &Pipeline {
        self.inner.pipeline()
    }

    pub fn invoke(&self, input: Option<Vec<PsValue>>) -> impl Future<Output = Result<Vec<PsValue>, PsrpError>> {
        let ps = self.inner.clone();
        spawn_blocking(move || ps.invoke(input))
    }

    pub fn stop(&self) -> impl Future<Output = Result<(), PsrpError>> {
        let ps = self.inner.clone();
        spawn_blocking(move || ps.stop())
    }

    pub fn connect(&self) -> impl Future<Output = Result<(), PsrpError>> {
        let ps = self.inner.clone();
        spawn_blocking(move || ps.connect())
    }

    pipeline_streams!(self);
}

/// Async-friendly wrapper over [`CommandMetadataPipeline`].
#[derive(Clone)]
pub struct AsyncCommandMetadataPipeline {
    inner: CommandMetadataPipeline,
}

impl AsyncCommandMetadataPipeline {
    #[must_use]
    pub fn new(inner: CommandMetadataPipeline) -> Self {
        Self { inner }
    }

    #[must_use]
    pub fn blocking(&self) -> &CommandMetadataPipeline {
        &self.inner
    }

    fn pipeline(&self) -> &Pipeline {
        self.inner.pipeline()
    }

    pub fn invoke(&self) -> impl Future<Output = Result<Vec<PsValue>, PsrpError>> {
        let pipeline = self.inner.clone();
        spawn_blocking(move || pipeline.invoke())
    }

    pub fn stop(&self) -> impl Future<Output = Result<(), PsrpError>> {
        let pipeline = self.inner.clone();
        spawn_blocking(move || pipeline.stop())
    }

    pipeline_streams!(self);
}
