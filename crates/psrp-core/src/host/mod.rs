mod call;
mod convert;
mod error;
mod invoker;
mod methods;
mod traits;

pub use call::{should_send_host_response, HostCallRequest, HostCallResponse, RemoteHostMethodId};
pub use error::{HostError, HostResult};
pub use invoker::{invoke, HostInvocationOutcome};
pub use methods::{
    BufferCell, ChoiceDescription, ConsoleColor, Coordinates, FieldDescription, HostCallScope,
    HostDefaultData, HostInfo, KeyInfo, ProgressRecord, PsCredential, Rectangle, Size,
};
pub use traits::{Host, HostRawUi, HostUi};

/// Builds the `HostInfo` the runspace pool advertises to the peer at
/// negotiation time, reflecting which levels of the host tree are present.
#[must_use]
pub fn describe_host(host: Option<&dyn Host>) -> HostInfo {
    let ui = host.and_then(Host::ui);
    let raw_ui = ui.and_then(HostUi::raw_ui);
    HostInfo {
        is_host_null: host.is_none(),
        is_host_ui_null: ui.is_none(),
        is_host_raw_ui_null: raw_ui.is_none(),
        use_runspace_host: false,
        host_default_data: raw_ui.map(|raw_ui| HostDefaultData {
            foreground_color: raw_ui.get_foreground_color().unwrap_or(ConsoleColor::Gray),
            background_color: raw_ui.get_background_color().unwrap_or(ConsoleColor::Black),
            cursor_position: raw_ui.get_cursor_position().unwrap_or_default(),
            window_position: raw_ui.get_window_position().unwrap_or_default(),
            cursor_size: raw_ui.get_cursor_size().unwrap_or(25),
            buffer_size: raw_ui.get_buffer_size().unwrap_or_default(),
            window_size: raw_ui.get_window_size().unwrap_or_default(),
            max_window_size: raw_ui.get_max_window_size().unwrap_or_default(),
            max_physical_window_size: raw_ui.get_max_physical_window_size().unwrap_or_default(),
            window_title: raw_ui.get_window_title().unwrap_or_default(),
        }),
    }
}

#[cfg(test)]
mod test;
