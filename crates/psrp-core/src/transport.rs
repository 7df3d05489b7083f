use uuid::Uuid;

use crate::error::PsrpError;
use crate::event::PsrpEvent;
use crate::host::HostCallResponse;
use crate::value::PsValue;

/// Identifies the runspace pool a [`Transport`] operation targets.
///
/// The transport (and whatever wire codec it embeds) keeps its own
/// per-pool protocol state keyed by this id; the core only ever refers to
/// pools and pipelines by id across this boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoolHandle {
    pub id: Uuid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandTypes {
    Alias,
    Function,
    Filter,
    Cmdlet,
    ExternalScript,
    Application,
    Script,
    All,
}

#[derive(Debug, Clone)]
pub enum ParameterSpec {
    Named(String, PsValue),
    Positional(PsValue),
    Switch(String),
}

#[derive(Debug, Clone)]
pub struct CommandSpec {
    pub name: String,
    pub is_script: bool,
    pub use_local_scope: Option<bool>,
    pub parameters: Vec<ParameterSpec>,
    /// Set on the first command of a new statement (MS-PSRP statements are
    /// separated in the pipeline's command list via this marker rather
    /// than being represented as nested collections).
    pub starts_new_statement: bool,
}

#[derive(Debug, Clone)]
pub struct CommandMetadataSpec {
    pub names: Vec<String>,
    pub command_type: CommandTypes,
    pub namespace: Vec<String>,
    pub arguments: Vec<String>,
}

#[derive(Debug, Clone)]
pub enum PipelineSpec {
    PowerShell {
        commands: Vec<CommandSpec>,
        is_nested: bool,
        no_input: bool,
        redirect_shell_error_to_out: bool,
    },
    CommandMetadata(CommandMetadataSpec),
}

/// Raised by `Transport::command`/`send_input` when the pool's encryption
/// key has not been exchanged yet. The runspace pool retries the operation
/// exactly once, after completing a key exchange; this error never reaches
/// application code.
#[derive(Debug, Clone, Copy)]
pub struct MissingCipherError;

impl std::fmt::Display for MissingCipherError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("encrypted session key has not been exchanged yet")
    }
}

impl std::error::Error for MissingCipherError {}

#[derive(Debug)]
pub enum TransportOpError {
    MissingCipher(MissingCipherError),
    Broken(PsrpError),
}

impl From<MissingCipherError> for TransportOpError {
    fn from(value: MissingCipherError) -> Self {
        Self::MissingCipher(value)
    }
}

impl From<PsrpError> for TransportOpError {
    fn from(value: PsrpError) -> Self {
        Self::Broken(value)
    }
}

/// The pluggable transport boundary: everything the engine needs from the
/// network/codec layer, expressed without committing to a wire format.
///
/// Implementations own whatever protocol/session state they need per pool
/// (fragmentation, sequence numbers, encryption) and are responsible for
/// eventually surfacing inbound data back to the engine via `wait_event`.
pub trait Transport: Send + Sync {
    fn create(&self, pool: PoolHandle, min_runspaces: usize, max_runspaces: usize) -> Result<(), PsrpError>;
    fn connect(&self, pool: PoolHandle) -> Result<(), PsrpError>;
    fn reconnect(&self, pool: PoolHandle) -> Result<(), PsrpError>;
    fn disconnect(&self, pool: PoolHandle) -> Result<(), PsrpError>;
    fn close(&self, pool: PoolHandle, pipeline_id: Option<Uuid>) -> Result<(), PsrpError>;

    fn command(
        &self,
        pool: PoolHandle,
        pipeline_id: Uuid,
        spec: &PipelineSpec,
    ) -> Result<(), TransportOpError>;
    fn send_input(
        &self,
        pool: PoolHandle,
        pipeline_id: Uuid,
        value: PsValue,
        buffer: bool,
    ) -> Result<(), TransportOpError>;
    fn send_end(&self, pool: PoolHandle, pipeline_id: Uuid) -> Result<(), PsrpError>;
    fn signal(&self, pool: PoolHandle, pipeline_id: Uuid) -> Result<(), PsrpError>;

    fn exchange_key(&self, pool: PoolHandle) -> Result<(), PsrpError>;

    /// Returns the correlation id for the request, or `None` if the value
    /// was already at the requested setting and no round trip is needed.
    fn reset_runspace_state(&self, pool: PoolHandle) -> Option<i64>;
    fn set_min_runspaces(&self, pool: PoolHandle, value: usize) -> Option<i64>;
    fn set_max_runspaces(&self, pool: PoolHandle, value: usize) -> Option<i64>;
    fn get_available_runspaces(&self, pool: PoolHandle) -> i64;

    fn host_response(&self, pool: PoolHandle, response: HostCallResponse) -> Result<(), TransportOpError>;

    /// Blocks until the next inbound event for any connected pool, or
    /// returns `None` once the transport's event stream has ended (the
    /// dispatcher treats this as a terminal, broken-pool condition).
    fn wait_event(&self) -> Option<PsrpEvent>;

    /// Lists disconnected runspace pools available for reconnection, each
    /// with the command ids of its disconnected pipelines.
    fn enumerate(&self) -> Vec<(Uuid, Vec<Uuid>)>;
}
