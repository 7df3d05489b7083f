use uuid::Uuid;

/// Plain data shapes exchanged with host methods, mirroring the structures
/// named by MS-PSRP's host raw-UI surface (buffer cells, coordinates, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Coordinates {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rectangle {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleColor {
    Black,
    DarkBlue,
    DarkGreen,
    DarkCyan,
    DarkRed,
    DarkMagenta,
    DarkYellow,
    Gray,
    DarkGray,
    Blue,
    Green,
    Cyan,
    Red,
    Magenta,
    Yellow,
    White,
}

impl ConsoleColor {
    #[must_use]
    pub fn from_i32(value: i32) -> Option<Self> {
        const TABLE: [ConsoleColor; 16] = [
            ConsoleColor::Black,
            ConsoleColor::DarkBlue,
            ConsoleColor::DarkGreen,
            ConsoleColor::DarkCyan,
            ConsoleColor::DarkRed,
            ConsoleColor::DarkMagenta,
            ConsoleColor::DarkYellow,
            ConsoleColor::Gray,
            ConsoleColor::DarkGray,
            ConsoleColor::Blue,
            ConsoleColor::Green,
            ConsoleColor::Cyan,
            ConsoleColor::Red,
            ConsoleColor::Magenta,
            ConsoleColor::Yellow,
            ConsoleColor::White,
        ];
        TABLE.get(usize::try_from(value).ok()?).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferCell {
    pub character: char,
    pub foreground: ConsoleColor,
    pub background: ConsoleColor,
    pub buffer_cell_type: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInfo {
    pub virtual_key_code: i32,
    pub character: char,
    pub control_key_state: i32,
    pub key_down: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressRecord {
    pub activity_id: i32,
    pub activity: String,
    pub status_description: String,
    pub percent_complete: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescription {
    pub name: String,
    pub label: String,
    pub parameter_type_name: String,
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceDescription {
    pub label: String,
    pub help_message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PsCredential {
    pub user_name: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HostDefaultData {
    pub foreground_color: ConsoleColor,
    pub background_color: ConsoleColor,
    pub cursor_position: Coordinates,
    pub window_position: Coordinates,
    pub cursor_size: i32,
    pub buffer_size: Size,
    pub window_size: Size,
    pub max_window_size: Size,
    pub max_physical_window_size: Size,
    pub window_title: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HostInfo {
    pub is_host_null: bool,
    pub is_host_ui_null: bool,
    pub is_host_raw_ui_null: bool,
    pub use_runspace_host: bool,
    pub host_default_data: Option<HostDefaultData>,
}

/// Identifies where a host call was raised from: the runspace pool itself,
/// or a specific pipeline (carrying the command id it was raised against).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCallScope {
    RunspacePool,
    Pipeline { command_id: Uuid },
}
