use std::sync::Mutex;

use uuid::Uuid;

use super::*;

struct TestRawUi {
    cursor: Mutex<Coordinates>,
}

impl HostRawUi for TestRawUi {
    fn set_cursor_position(&self, value: Coordinates) -> HostResult<()> {
        *self.cursor.lock().unwrap() = value;
        Ok(())
    }

    fn get_cursor_position(&self) -> HostResult<Coordinates> {
        Ok(*self.cursor.lock().unwrap())
    }
}

struct TestUi {
    raw_ui: TestRawUi,
    written: Mutex<Vec<String>>,
}

impl HostUi for TestUi {
    fn write_line2(&self, value: String) -> HostResult<()> {
        self.written.lock().unwrap().push(value);
        Ok(())
    }

    fn raw_ui(&self) -> Option<&dyn HostRawUi> {
        Some(&self.raw_ui)
    }
}

struct TestHost {
    ui: TestUi,
}

impl Host for TestHost {
    fn get_name(&self) -> HostResult<String> {
        Ok("test-host".to_owned())
    }

    fn ui(&self) -> Option<&dyn HostUi> {
        Some(&self.ui)
    }
}

fn test_host() -> TestHost {
    TestHost {
        ui: TestUi {
            raw_ui: TestRawUi {
                cursor: Mutex::new(Coordinates::default()),
            },
            written: Mutex::new(Vec::new()),
        },
    }
}

fn request(method_id: RemoteHostMethodId, parameters: Vec<crate::value::PsValue>) -> HostCallRequest {
    HostCallRequest {
        scope: HostCallScope::RunspacePool,
        call_id: 1,
        method_id,
        parameters,
    }
}

#[test]
fn get_name_returns_a_response_with_the_value() {
    let host = test_host();
    let outcome = invoke(Some(&host), &request(RemoteHostMethodId::GetName, vec![]));
    match outcome {
        HostInvocationOutcome::Response(response) => {
            assert_eq!(response.return_value, Some(crate::value::PsValue::Str("test-host".to_owned())));
            assert!(response.error.is_none());
        }
        _ => panic!("expected a response"),
    }
}

#[test]
fn a_void_method_that_succeeds_is_dropped_without_a_response() {
    let host = test_host();
    let req = request(
        RemoteHostMethodId::WriteLine2,
        vec![crate::value::PsValue::Str("hello".to_owned())],
    );
    let outcome = invoke(Some(&host), &req);
    assert!(matches!(outcome, HostInvocationOutcome::Dropped));
    assert_eq!(host.ui.written.lock().unwrap().as_slice(), ["hello"]);
}

#[test]
fn set_cursor_position_adapts_coordinates_and_updates_raw_ui() {
    let host = test_host();
    let mut map = std::collections::BTreeMap::new();
    map.insert("x".to_owned(), crate::value::PsValue::Int(3));
    map.insert("y".to_owned(), crate::value::PsValue::Int(4));
    let req = request(RemoteHostMethodId::SetCursorPosition, vec![crate::value::PsValue::Map(map)]);
    let outcome = invoke(Some(&host), &req);
    assert!(matches!(outcome, HostInvocationOutcome::Dropped));
    assert_eq!(*host.ui.raw_ui.cursor.lock().unwrap(), Coordinates { x: 3, y: 4 });
}

#[test]
fn missing_ui_on_a_non_void_method_becomes_an_error_response() {
    struct BareHost;
    impl Host for BareHost {}

    let host = BareHost;
    let outcome = invoke(Some(&host), &request(RemoteHostMethodId::ReadLine, vec![]));
    match outcome {
        HostInvocationOutcome::Response(response) => {
            assert!(response.return_value.is_none());
            assert!(response.error.is_some());
        }
        _ => panic!("expected an error response"),
    }
}

#[test]
fn missing_ui_on_a_void_method_is_an_error_only_record_with_no_response() {
    struct BareHost;
    impl Host for BareHost {}

    let host = BareHost;
    let req = request(RemoteHostMethodId::WriteLine2, vec![crate::value::PsValue::Str("x".to_owned())]);
    let outcome = invoke(Some(&host), &req);
    match outcome {
        HostInvocationOutcome::ErrorOnly(record) => {
            assert_eq!(record.fully_qualified_error_id, "RemoteHostExecutionException");
        }
        _ => panic!("expected an error-only outcome"),
    }
}

#[test]
fn invalid_parameter_shape_is_reported_as_invalid_parameters() {
    let host = test_host();
    let req = request(RemoteHostMethodId::SetCursorPosition, vec![crate::value::PsValue::Int(1)]);
    let outcome = invoke(Some(&host), &req);
    match outcome {
        HostInvocationOutcome::ErrorOnly(record) => assert_eq!(record.fully_qualified_error_id, "RemoteHostExecutionException"),
        _ => panic!("expected an error-only outcome"),
    }
}

#[test]
fn unknown_method_id_fails_to_parse() {
    assert!(RemoteHostMethodId::try_from(999).is_err());
}

#[test]
fn should_send_host_response_distinguishes_void_from_non_void() {
    assert!(should_send_host_response(RemoteHostMethodId::GetName));
    assert!(!should_send_host_response(RemoteHostMethodId::WriteLine2));
}

#[test]
fn describe_host_reports_null_levels_when_subtrees_are_absent() {
    struct BareHost;
    impl Host for BareHost {}
    let info = describe_host(Some(&BareHost));
    assert!(info.is_host_ui_null);
    assert!(info.is_host_raw_ui_null);
    assert!(info.host_default_data.is_none());
}

#[test]
fn host_call_scope_distinguishes_pipeline_from_pool() {
    let id = Uuid::new_v4();
    let scope = HostCallScope::Pipeline { command_id: id };
    match scope {
        HostCallScope::Pipeline { command_id } => assert_eq!(command_id, id),
        HostCallScope::RunspacePool => panic!("expected pipeline scope"),
    }
}
