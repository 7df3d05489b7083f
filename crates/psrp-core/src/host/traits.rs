use uuid::Uuid;

use super::error::HostResult;
use super::methods::{
    BufferCell, ChoiceDescription, Coordinates, FieldDescription, KeyInfo, PsCredential,
    ProgressRecord, Rectangle, Size,
};
use super::ConsoleColor;
use crate::value::PsValue;

/// Application-supplied implementation of the PSRP host object.
///
/// Every method defaults to `Err(HostError::NotImplemented)` so a host only
/// needs to override what it actually supports; `ui()` returning `None`
/// means the peer sees `IsHostUINull = true` and any UI-scoped call is
/// rejected the same way.
#[allow(unused_variables)]
pub trait Host: Send + Sync {
    fn get_name(&self) -> HostResult<String> {
        Err(super::HostError::NotImplemented)
    }
    fn get_version(&self) -> HostResult<String> {
        Err(super::HostError::NotImplemented)
    }
    fn get_instance_id(&self) -> HostResult<Uuid> {
        Err(super::HostError::NotImplemented)
    }
    fn get_current_culture(&self) -> HostResult<String> {
        Err(super::HostError::NotImplemented)
    }
    fn get_current_ui_culture(&self) -> HostResult<String> {
        Err(super::HostError::NotImplemented)
    }
    fn set_should_exit(&self, exit_code: i32) -> HostResult<()> {
        Err(super::HostError::NotImplemented)
    }
    fn enter_nested_prompt(&self) -> HostResult<()> {
        Err(super::HostError::NotImplemented)
    }
    fn exit_nested_prompt(&self) -> HostResult<()> {
        Err(super::HostError::NotImplemented)
    }
    fn notify_begin_application(&self) -> HostResult<()> {
        Err(super::HostError::NotImplemented)
    }
    fn notify_end_application(&self) -> HostResult<()> {
        Err(super::HostError::NotImplemented)
    }
    fn push_runspace(&self, runspace: PsValue) -> HostResult<()> {
        Err(super::HostError::NotImplemented)
    }
    fn pop_runspace(&self) -> HostResult<()> {
        Err(super::HostError::NotImplemented)
    }
    fn get_is_runspace_pushed(&self) -> HostResult<bool> {
        Err(super::HostError::NotImplemented)
    }
    fn get_runspace(&self) -> HostResult<PsValue> {
        Err(super::HostError::NotImplemented)
    }

    fn ui(&self) -> Option<&dyn HostUi> {
        None
    }
}

#[allow(unused_variables)]
pub trait HostUi: Send + Sync {
    fn read_line(&self) -> HostResult<String> {
        Err(super::HostError::NotImplemented)
    }
    fn read_line_as_secure_string(&self) -> HostResult<String> {
        Err(super::HostError::NotImplemented)
    }
    fn write1(&self, value: String) -> HostResult<()> {
        Err(super::HostError::NotImplemented)
    }
    fn write2(&self, foreground: ConsoleColor, background: ConsoleColor, value: String) -> HostResult<()> {
        Err(super::HostError::NotImplemented)
    }
    fn write_line1(&self) -> HostResult<()> {
        Err(super::HostError::NotImplemented)
    }
    fn write_line2(&self, value: String) -> HostResult<()> {
        Err(super::HostError::NotImplemented)
    }
    fn write_line3(&self, foreground: ConsoleColor, background: ConsoleColor, value: String) -> HostResult<()> {
        Err(super::HostError::NotImplemented)
    }
    fn write_error_line(&self, value: String) -> HostResult<()> {
        Err(super::HostError::NotImplemented)
    }
    fn write_debug_line(&self, value: String) -> HostResult<()> {
        Err(super::HostError::NotImplemented)
    }
    fn write_verbose_line(&self, value: String) -> HostResult<()> {
        Err(super::HostError::NotImplemented)
    }
    fn write_warning_line(&self, value: String) -> HostResult<()> {
        Err(super::HostError::NotImplemented)
    }
    fn write_progress(&self, source_id: i64, record: ProgressRecord) -> HostResult<()> {
        Err(super::HostError::NotImplemented)
    }
    fn prompt(&self, caption: String, message: String, descriptions: Vec<FieldDescription>) -> HostResult<PsValue> {
        Err(super::HostError::NotImplemented)
    }
    fn prompt_for_credential1(
        &self,
        caption: String,
        message: String,
        user_name: String,
        target_name: String,
    ) -> HostResult<PsCredential> {
        Err(super::HostError::NotImplemented)
    }
    fn prompt_for_credential2(
        &self,
        caption: String,
        message: String,
        user_name: String,
        target_name: String,
        allowed_credential_types: i32,
        options: i32,
    ) -> HostResult<PsCredential> {
        Err(super::HostError::NotImplemented)
    }
    fn prompt_for_choice(
        &self,
        caption: String,
        message: String,
        choices: Vec<ChoiceDescription>,
        default_choice: i32,
    ) -> HostResult<i32> {
        Err(super::HostError::NotImplemented)
    }
    fn prompt_for_choice_multiple_selection(
        &self,
        caption: String,
        message: String,
        choices: Vec<ChoiceDescription>,
        default_choices: Vec<i32>,
    ) -> HostResult<Vec<i32>> {
        Err(super::HostError::NotImplemented)
    }

    fn raw_ui(&self) -> Option<&dyn HostRawUi> {
        None
    }
}

#[allow(unused_variables)]
pub trait HostRawUi: Send + Sync {
    fn get_foreground_color(&self) -> HostResult<ConsoleColor> {
        Err(super::HostError::NotImplemented)
    }
    fn set_foreground_color(&self, value: ConsoleColor) -> HostResult<()> {
        Err(super::HostError::NotImplemented)
    }
    fn get_background_color(&self) -> HostResult<ConsoleColor> {
        Err(super::HostError::NotImplemented)
    }
    fn set_background_color(&self, value: ConsoleColor) -> HostResult<()> {
        Err(super::HostError::NotImplemented)
    }
    fn get_cursor_position(&self) -> HostResult<Coordinates> {
        Err(super::HostError::NotImplemented)
    }
    fn set_cursor_position(&self, value: Coordinates) -> HostResult<()> {
        Err(super::HostError::NotImplemented)
    }
    fn get_window_position(&self) -> HostResult<Coordinates> {
        Err(super::HostError::NotImplemented)
    }
    fn set_window_position(&self, value: Coordinates) -> HostResult<()> {
        Err(super::HostError::NotImplemented)
    }
    fn get_cursor_size(&self) -> HostResult<i32> {
        Err(super::HostError::NotImplemented)
    }
    fn set_cursor_size(&self, value: i32) -> HostResult<()> {
        Err(super::HostError::NotImplemented)
    }
    fn get_buffer_size(&self) -> HostResult<Size> {
        Err(super::HostError::NotImplemented)
    }
    fn set_buffer_size(&self, value: Size) -> HostResult<()> {
        Err(super::HostError::NotImplemented)
    }
    fn get_window_size(&self) -> HostResult<Size> {
        Err(super::HostError::NotImplemented)
    }
    fn set_window_size(&self, value: Size) -> HostResult<()> {
        Err(super::HostError::NotImplemented)
    }
    fn get_window_title(&self) -> HostResult<String> {
        Err(super::HostError::NotImplemented)
    }
    fn set_window_title(&self, value: String) -> HostResult<()> {
        Err(super::HostError::NotImplemented)
    }
    fn get_max_window_size(&self) -> HostResult<Size> {
        Err(super::HostError::NotImplemented)
    }
    fn get_max_physical_window_size(&self) -> HostResult<Size> {
        Err(super::HostError::NotImplemented)
    }
    fn get_key_available(&self) -> HostResult<bool> {
        Err(super::HostError::NotImplemented)
    }
    fn read_key(&self, options: i32) -> HostResult<KeyInfo> {
        Err(super::HostError::NotImplemented)
    }
    fn flush_input_buffer(&self) -> HostResult<()> {
        Err(super::HostError::NotImplemented)
    }
    fn set_buffer_contents1(&self, rectangle: Rectangle, fill: BufferCell) -> HostResult<()> {
        Err(super::HostError::NotImplemented)
    }
    fn set_buffer_contents2(&self, origin: Coordinates, contents: Vec<Vec<BufferCell>>) -> HostResult<()> {
        Err(super::HostError::NotImplemented)
    }
    fn get_buffer_contents(&self, rectangle: Rectangle) -> HostResult<Vec<Vec<BufferCell>>> {
        Err(super::HostError::NotImplemented)
    }
    fn scroll_buffer_contents(
        &self,
        source: Rectangle,
        destination: Coordinates,
        clip: Rectangle,
        fill: BufferCell,
    ) -> HostResult<()> {
        Err(super::HostError::NotImplemented)
    }
}
