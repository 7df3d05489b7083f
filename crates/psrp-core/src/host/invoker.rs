use super::call::{should_send_host_response, HostCallRequest, HostCallResponse, RemoteHostMethodId};
use super::convert as c;
use super::error::HostError;
use super::traits::Host;
use crate::event::ErrorRecord;
use crate::value::PsValue;

/// Result of routing an inbound host call through the application's `Host`
/// tree.
pub enum HostInvocationOutcome {
    /// A response must be sent back to the peer for a non-void method.
    Response(HostCallResponse),
    /// A void method failed; the error is recorded but no response is sent.
    ErrorOnly(ErrorRecord),
    /// A void method succeeded, or a non-void method had no host to answer
    /// it and was silently dropped. Nothing more to do.
    Dropped,
}

/// Walks `request.method_id` down to the right level of the host tree
/// (`Host`, `Host::ui()`, or `Host::ui().raw_ui()`), invokes it with the
/// decoded parameters, and turns the result into the right outcome
/// depending on whether the method is void.
///
/// A `None` host, or a present host missing the required subtree, is
/// treated the same as the method itself returning `NotImplemented`.
pub fn invoke(host: Option<&dyn Host>, request: &HostCallRequest) -> HostInvocationOutcome {
    let params = request.parameters.as_slice();
    let result = dispatch(host, request.method_id, params);
    finish(request, result)
}

fn finish(request: &HostCallRequest, result: Result<Option<PsValue>, HostError>) -> HostInvocationOutcome {
    let void = !should_send_host_response(request.method_id);
    match (void, result) {
        (true, Ok(_)) => HostInvocationOutcome::Dropped,
        (true, Err(error)) => HostInvocationOutcome::ErrorOnly(ErrorRecord::from_host_invocation_failure(error.to_string())),
        (false, Ok(value)) => HostInvocationOutcome::Response(HostCallResponse {
            scope: request.scope,
            call_id: request.call_id,
            method_id: request.method_id,
            return_value: value,
            error: None,
        }),
        (false, Err(error)) => HostInvocationOutcome::Response(HostCallResponse {
            scope: request.scope,
            call_id: request.call_id,
            method_id: request.method_id,
            return_value: None,
            error: Some(ErrorRecord::from_host_invocation_failure(error.to_string())),
        }),
    }
}

#[allow(clippy::too_many_lines)]
fn dispatch(
    host: Option<&dyn Host>,
    id: RemoteHostMethodId,
    params: &[PsValue],
) -> Result<Option<PsValue>, HostError> {
    use RemoteHostMethodId as Id;

    let host = host.ok_or(HostError::NotImplemented)?;
    let ui = || host.ui().ok_or(HostError::NotImplemented);
    let raw_ui = || ui().and_then(|ui| ui.raw_ui().ok_or(HostError::NotImplemented));

    match id {
        Id::GetName => host.get_name().map(|v| Some(PsValue::Str(v))),
        Id::GetVersion => host.get_version().map(|v| Some(PsValue::Str(v))),
        Id::GetInstanceId => host.get_instance_id().map(|v| Some(PsValue::Str(v.to_string()))),
        Id::GetCurrentCulture => host.get_current_culture().map(|v| Some(PsValue::Str(v))),
        Id::GetCurrentUiCulture => host.get_current_ui_culture().map(|v| Some(PsValue::Str(v))),
        Id::SetShouldExit => host.set_should_exit(c::i32_at(params, 0)?).map(|()| None),
        Id::EnterNestedPrompt => host.enter_nested_prompt().map(|()| None),
        Id::ExitNestedPrompt => host.exit_nested_prompt().map(|()| None),
        Id::NotifyBeginApplication => host.notify_begin_application().map(|()| None),
        Id::NotifyEndApplication => host.notify_end_application().map(|()| None),
        Id::PushRunspace => host.push_runspace(params.first().cloned().unwrap_or(PsValue::Null)).map(|()| None),
        Id::PopRunspace => host.pop_runspace().map(|()| None),
        Id::GetIsRunspacePushed => host.get_is_runspace_pushed().map(|v| Some(PsValue::Bool(v))),
        Id::GetRunspace => host.get_runspace().map(Some),

        Id::ReadLine => ui()?.read_line().map(|v| Some(PsValue::Str(v))),
        Id::ReadLineAsSecureString => ui()?.read_line_as_secure_string().map(|v| Some(PsValue::Str(v))),
        Id::Write1 => ui()?.write1(c::str_at(params, 0)?).map(|()| None),
        Id::Write2 => {
            let fg = c::color_at(params, 0)?;
            let bg = c::color_at(params, 1)?;
            ui()?.write2(fg, bg, c::str_at(params, 2)?).map(|()| None)
        }
        Id::WriteLine1 => ui()?.write_line1().map(|()| None),
        Id::WriteLine2 => ui()?.write_line2(c::str_at(params, 0)?).map(|()| None),
        Id::WriteLine3 => {
            let fg = c::color_at(params, 0)?;
            let bg = c::color_at(params, 1)?;
            ui()?.write_line3(fg, bg, c::str_at(params, 2)?).map(|()| None)
        }
        Id::WriteErrorLine => ui()?.write_error_line(c::str_at(params, 0)?).map(|()| None),
        Id::WriteDebugLine => ui()?.write_debug_line(c::str_at(params, 0)?).map(|()| None),
        Id::WriteProgress => {
            let source_id = c::i64_at(params, 0)?;
            let record = c::progress_record_at(params, 1)?;
            ui()?.write_progress(source_id, record).map(|()| None)
        }
        Id::WriteVerboseLine => ui()?.write_verbose_line(c::str_at(params, 0)?).map(|()| None),
        Id::WriteWarningLine => ui()?.write_warning_line(c::str_at(params, 0)?).map(|()| None),
        Id::Prompt => {
            let caption = c::str_at(params, 0)?;
            let message = c::str_at(params, 1)?;
            let descriptions = c::field_descriptions_at(params, 2)?;
            ui()?.prompt(caption, message, descriptions).map(Some)
        }
        Id::PromptForCredential1 => {
            let caption = c::str_at(params, 0)?;
            let message = c::str_at(params, 1)?;
            let user_name = c::str_at(params, 2)?;
            let target_name = c::str_at(params, 3)?;
            ui()?
                .prompt_for_credential1(caption, message, user_name, target_name)
                .map(|v| Some(c::credential_to_ps(v)))
        }
        Id::PromptForCredential2 => {
            let caption = c::str_at(params, 0)?;
            let message = c::str_at(params, 1)?;
            let user_name = c::str_at(params, 2)?;
            let target_name = c::str_at(params, 3)?;
            let allowed = c::i32_at(params, 4)?;
            let options = c::i32_at(params, 5)?;
            ui()?
                .prompt_for_credential2(caption, message, user_name, target_name, allowed, options)
                .map(|v| Some(c::credential_to_ps(v)))
        }
        Id::PromptForChoice => {
            let caption = c::str_at(params, 0)?;
            let message = c::str_at(params, 1)?;
            let choices = c::choice_descriptions_at(params, 2)?;
            let default = c::i32_at(params, 3)?;
            ui()?
                .prompt_for_choice(caption, message, choices, default)
                .map(|v| Some(PsValue::Int(i64::from(v))))
        }
        Id::PromptForChoiceMultipleSelection => {
            let caption = c::str_at(params, 0)?;
            let message = c::str_at(params, 1)?;
            let choices = c::choice_descriptions_at(params, 2)?;
            let defaults = c::i32_list_at(params, 3)?;
            ui()?
                .prompt_for_choice_multiple_selection(caption, message, choices, defaults)
                .map(|v| Some(c::i32_list_to_ps(v)))
        }

        Id::GetForegroundColor => raw_ui()?.get_foreground_color().map(|v| Some(c::color_to_ps(v))),
        Id::SetForegroundColor => raw_ui()?.set_foreground_color(c::color_at(params, 0)?).map(|()| None),
        Id::GetBackgroundColor => raw_ui()?.get_background_color().map(|v| Some(c::color_to_ps(v))),
        Id::SetBackgroundColor => raw_ui()?.set_background_color(c::color_at(params, 0)?).map(|()| None),
        Id::GetCursorPosition => raw_ui()?.get_cursor_position().map(|v| Some(c::coordinates_to_ps(v))),
        Id::SetCursorPosition => raw_ui()?.set_cursor_position(c::coordinates_at(params, 0)?).map(|()| None),
        Id::GetWindowPosition => raw_ui()?.get_window_position().map(|v| Some(c::coordinates_to_ps(v))),
        Id::SetWindowPosition => raw_ui()?.set_window_position(c::coordinates_at(params, 0)?).map(|()| None),
        Id::GetCursorSize => raw_ui()?.get_cursor_size().map(|v| Some(PsValue::Int(i64::from(v)))),
        Id::SetCursorSize => raw_ui()?.set_cursor_size(c::i32_at(params, 0)?).map(|()| None),
        Id::GetBufferSize => raw_ui()?.get_buffer_size().map(|v| Some(c::size_to_ps(v))),
        Id::SetBufferSize => raw_ui()?.set_buffer_size(c::size_at(params, 0)?).map(|()| None),
        Id::GetWindowSize => raw_ui()?.get_window_size().map(|v| Some(c::size_to_ps(v))),
        Id::SetWindowSize => raw_ui()?.set_window_size(c::size_at(params, 0)?).map(|()| None),
        Id::GetWindowTitle => raw_ui()?.get_window_title().map(|v| Some(PsValue::Str(v))),
        Id::SetWindowTitle => raw_ui()?.set_window_title(c::str_at(params, 0)?).map(|()| None),
        Id::GetMaxWindowSize => raw_ui()?.get_max_window_size().map(|v| Some(c::size_to_ps(v))),
        Id::GetMaxPhysicalWindowSize => raw_ui()?.get_max_physical_window_size().map(|v| Some(c::size_to_ps(v))),
        Id::GetKeyAvailable => raw_ui()?.get_key_available().map(|v| Some(PsValue::Bool(v))),
        Id::ReadKey => raw_ui()?.read_key(c::i32_at(params, 0)?).map(|v| Some(c::key_info_to_ps(v))),
        Id::FlushInputBuffer => raw_ui()?.flush_input_buffer().map(|()| None),
        Id::SetBufferContents1 => {
            let rect = c::rectangle_at(params, 0)?;
            let fill = c::buffer_cell_at(params, 1)?;
            raw_ui()?.set_buffer_contents1(rect, fill).map(|()| None)
        }
        Id::SetBufferContents2 => {
            let origin = c::coordinates_at(params, 0)?;
            let contents = c::buffer_cell_grid_at(params, 1)?;
            raw_ui()?.set_buffer_contents2(origin, contents).map(|()| None)
        }
        Id::GetBufferContents => raw_ui()?
            .get_buffer_contents(c::rectangle_at(params, 0)?)
            .map(|v| Some(c::buffer_cell_grid_to_ps(v))),
        Id::ScrollBufferContents => {
            let source = c::rectangle_at(params, 0)?;
            let destination = c::coordinates_at(params, 1)?;
            let clip = c::rectangle_at(params, 2)?;
            let fill = c::buffer_cell_at(params, 3)?;
            raw_ui()?.scroll_buffer_contents(source, destination, clip, fill).map(|()| None)
        }
    }
}
