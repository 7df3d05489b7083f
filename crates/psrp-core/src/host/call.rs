use super::error::HostError;
use super::methods::HostCallScope;
use crate::value::PsValue;

/// MS-PSRP host method identifiers (`HostMethodIdentifier`, 2.2.3.17).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum RemoteHostMethodId {
    GetName = 1,
    GetVersion = 2,
    GetInstanceId = 3,
    GetCurrentCulture = 4,
    GetCurrentUiCulture = 5,
    SetShouldExit = 6,
    EnterNestedPrompt = 7,
    ExitNestedPrompt = 8,
    NotifyBeginApplication = 9,
    NotifyEndApplication = 10,
    ReadLine = 11,
    ReadLineAsSecureString = 12,
    Write1 = 13,
    Write2 = 14,
    WriteLine1 = 15,
    WriteLine2 = 16,
    WriteLine3 = 17,
    WriteErrorLine = 18,
    WriteDebugLine = 19,
    WriteProgress = 20,
    WriteVerboseLine = 21,
    WriteWarningLine = 22,
    Prompt = 23,
    PromptForCredential1 = 24,
    PromptForCredential2 = 25,
    PromptForChoice = 26,
    GetForegroundColor = 27,
    SetForegroundColor = 28,
    GetBackgroundColor = 29,
    SetBackgroundColor = 30,
    GetCursorPosition = 31,
    SetCursorPosition = 32,
    GetWindowPosition = 33,
    SetWindowPosition = 34,
    GetCursorSize = 35,
    SetCursorSize = 36,
    GetBufferSize = 37,
    SetBufferSize = 38,
    GetWindowSize = 39,
    SetWindowSize = 40,
    GetWindowTitle = 41,
    SetWindowTitle = 42,
    GetMaxWindowSize = 43,
    GetMaxPhysicalWindowSize = 44,
    GetKeyAvailable = 45,
    ReadKey = 46,
    FlushInputBuffer = 47,
    SetBufferContents1 = 48,
    SetBufferContents2 = 49,
    GetBufferContents = 50,
    ScrollBufferContents = 51,
    PushRunspace = 52,
    PopRunspace = 53,
    GetIsRunspacePushed = 54,
    GetRunspace = 55,
    PromptForChoiceMultipleSelection = 56,
}

impl TryFrom<i32> for RemoteHostMethodId {
    type Error = HostError;

    fn try_from(value: i32) -> Result<Self, HostError> {
        use RemoteHostMethodId as Id;
        Ok(match value {
            1 => Id::GetName,
            2 => Id::GetVersion,
            3 => Id::GetInstanceId,
            4 => Id::GetCurrentCulture,
            5 => Id::GetCurrentUiCulture,
            6 => Id::SetShouldExit,
            7 => Id::EnterNestedPrompt,
            8 => Id::ExitNestedPrompt,
            9 => Id::NotifyBeginApplication,
            10 => Id::NotifyEndApplication,
            11 => Id::ReadLine,
            12 => Id::ReadLineAsSecureString,
            13 => Id::Write1,
            14 => Id::Write2,
            15 => Id::WriteLine1,
            16 => Id::WriteLine2,
            17 => Id::WriteLine3,
            18 => Id::WriteErrorLine,
            19 => Id::WriteDebugLine,
            20 => Id::WriteProgress,
            21 => Id::WriteVerboseLine,
            22 => Id::WriteWarningLine,
            23 => Id::Prompt,
            24 => Id::PromptForCredential1,
            25 => Id::PromptForCredential2,
            26 => Id::PromptForChoice,
            27 => Id::GetForegroundColor,
            28 => Id::SetForegroundColor,
            29 => Id::GetBackgroundColor,
            30 => Id::SetBackgroundColor,
            31 => Id::GetCursorPosition,
            32 => Id::SetCursorPosition,
            33 => Id::GetWindowPosition,
            34 => Id::SetWindowPosition,
            35 => Id::GetCursorSize,
            36 => Id::SetCursorSize,
            37 => Id::GetBufferSize,
            38 => Id::SetBufferSize,
            39 => Id::GetWindowSize,
            40 => Id::SetWindowSize,
            41 => Id::GetWindowTitle,
            42 => Id::SetWindowTitle,
            43 => Id::GetMaxWindowSize,
            44 => Id::GetMaxPhysicalWindowSize,
            45 => Id::GetKeyAvailable,
            46 => Id::ReadKey,
            47 => Id::FlushInputBuffer,
            48 => Id::SetBufferContents1,
            49 => Id::SetBufferContents2,
            50 => Id::GetBufferContents,
            51 => Id::ScrollBufferContents,
            52 => Id::PushRunspace,
            53 => Id::PopRunspace,
            54 => Id::GetIsRunspacePushed,
            55 => Id::GetRunspace,
            56 => Id::PromptForChoiceMultipleSelection,
            _ => return Err(HostError::InvalidParameters),
        })
    }
}

/// Whether the peer expects a host response for this method. Void methods
/// (`WriteLine2`, `SetCursorPosition`, ...) never get one, even on success;
/// a failure there is recorded on an error stream instead.
#[must_use]
pub fn should_send_host_response(id: RemoteHostMethodId) -> bool {
    use RemoteHostMethodId as Id;
    !matches!(
        id,
        Id::SetShouldExit
            | Id::EnterNestedPrompt
            | Id::ExitNestedPrompt
            | Id::NotifyBeginApplication
            | Id::NotifyEndApplication
            | Id::Write1
            | Id::Write2
            | Id::WriteLine1
            | Id::WriteLine2
            | Id::WriteLine3
            | Id::WriteErrorLine
            | Id::WriteDebugLine
            | Id::WriteProgress
            | Id::WriteVerboseLine
            | Id::WriteWarningLine
            | Id::SetForegroundColor
            | Id::SetBackgroundColor
            | Id::SetCursorPosition
            | Id::SetWindowPosition
            | Id::SetCursorSize
            | Id::SetBufferSize
            | Id::SetWindowSize
            | Id::SetWindowTitle
            | Id::FlushInputBuffer
            | Id::SetBufferContents1
            | Id::SetBufferContents2
            | Id::ScrollBufferContents
            | Id::PushRunspace
            | Id::PopRunspace
    )
}

/// A decoded inbound host-method invocation request.
#[derive(Debug, Clone)]
pub struct HostCallRequest {
    pub scope: HostCallScope,
    pub call_id: i64,
    pub method_id: RemoteHostMethodId,
    pub parameters: Vec<PsValue>,
}

/// The response the engine sends back for a non-void host call.
#[derive(Debug, Clone)]
pub struct HostCallResponse {
    pub scope: HostCallScope,
    pub call_id: i64,
    pub method_id: RemoteHostMethodId,
    pub return_value: Option<PsValue>,
    pub error: Option<crate::event::ErrorRecord>,
}
