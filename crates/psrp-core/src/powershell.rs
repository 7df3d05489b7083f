use std::sync::Arc;

use crate::error::PsrpError;
use crate::event::PipelineState;
use crate::pipeline::{power_shell_kind, push_parameter, with_power_shell_commands, Pipeline, PipelineInner};
use crate::runspace_pool::RunspacePool;
use crate::transport::{CommandSpec, ParameterSpec};
use crate::value::PsValue;

/// A pipeline invoking one or more PowerShell commands or script
/// statements, with the fluent builder API applications use to construct
/// it before calling [`PowerShell::invoke`].
#[derive(Clone)]
pub struct PowerShell {
    pipeline: Pipeline,
}

impl PowerShell {
    #[must_use]
    pub fn new(pool: &RunspacePool, is_nested: bool) -> Self {
        let inner = PipelineInner::new(Arc::downgrade(&pool.0), power_shell_kind(is_nested));
        Self { pipeline: Pipeline(inner) }
    }

    #[must_use]
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    #[must_use]
    pub fn add_command(self, name: impl Into<String>) -> Self {
        self.push_command(CommandSpec {
            name: name.into(),
            is_script: false,
            use_local_scope: None,
            parameters: Vec::new(),
            starts_new_statement: false,
        })
    }

    #[must_use]
    pub fn add_script(self, script: impl Into<String>) -> Self {
        self.push_command(CommandSpec {
            name: script.into(),
            is_script: true,
            use_local_scope: None,
            parameters: Vec::new(),
            starts_new_statement: false,
        })
    }

    #[must_use]
    pub fn add_statement(self) -> Self {
        with_power_shell_commands(&self.pipeline, |commands| {
            // The next command pushed after this call is marked as a new
            // statement's start; there's nothing to mark yet if no command
            // has been pushed since the last statement boundary.
            let is_only_command = commands.len() == 1;
            if let Some(last) = commands.last_mut() {
                last.starts_new_statement = is_only_command;
            }
        });
        self
    }

    #[must_use]
    pub fn add_argument(self, value: impl Into<PsValue>) -> Self {
        with_power_shell_commands(&self.pipeline, |commands| {
            push_parameter(commands, ParameterSpec::Positional(value.into()));
        });
        self
    }

    #[must_use]
    pub fn add_parameter(self, name: impl Into<String>, value: impl Into<PsValue>) -> Self {
        with_power_shell_commands(&self.pipeline, |commands| {
            push_parameter(commands, ParameterSpec::Named(name.into(), value.into()));
        });
        self
    }

    #[must_use]
    pub fn add_parameters(self, parameters: Vec<(String, PsValue)>) -> Self {
        with_power_shell_commands(&self.pipeline, |commands| {
            for (name, value) in parameters {
                push_parameter(commands, ParameterSpec::Named(name, value));
            }
        });
        self
    }

    #[must_use]
    fn push_command(self, command: CommandSpec) -> Self {
        with_power_shell_commands(&self.pipeline, |commands| commands.push(command));
        self
    }

    #[must_use]
    pub fn state(&self) -> PipelineState {
        self.pipeline.state()
    }

    #[must_use]
    pub fn had_errors(&self) -> bool {
        self.pipeline.had_errors()
    }

    pub fn invoke(&self, input: Option<Vec<PsValue>>) -> Result<Vec<PsValue>, PsrpError> {
        self.pipeline.invoke(input)
    }

    pub fn stop(&self) -> Result<(), PsrpError> {
        self.pipeline.stop()
    }

    pub fn connect(&self) -> Result<(), PsrpError> {
        self.pipeline.connect()
    }

    pub fn close(&self) {
        self.pipeline.close();
    }
}
