use std::sync::Arc;

use crate::error::PsrpError;
use crate::pipeline::{command_metadata_kind, Pipeline, PipelineInner};
use crate::runspace_pool::RunspacePool;
use crate::transport::CommandTypes;
use crate::value::PsValue;

/// A pipeline that queries command metadata (`Get-Command`-equivalent)
/// instead of invoking a script or command set. Unlike [`crate::PowerShell`]
/// it takes its full request up front and offers no fluent mutation.
#[derive(Clone)]
pub struct CommandMetadataPipeline {
    pipeline: Pipeline,
}

impl CommandMetadataPipeline {
    #[must_use]
    pub fn new(
        pool: &RunspacePool,
        names: Vec<String>,
        command_type: CommandTypes,
        namespace: Vec<String>,
        arguments: Vec<String>,
    ) -> Self {
        let kind = command_metadata_kind(names, command_type, namespace, arguments);
        let inner = PipelineInner::new(Arc::downgrade(&pool.0), kind);
        Self { pipeline: Pipeline(inner) }
    }

    #[must_use]
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn invoke(&self) -> Result<Vec<PsValue>, PsrpError> {
        self.pipeline.invoke(None)
    }

    pub fn stop(&self) -> Result<(), PsrpError> {
        self.pipeline.stop()
    }

    pub fn close(&self) {
        self.pipeline.close();
    }
}
