use std::collections::BTreeMap;

use super::error::{HostError, HostResult};
use super::methods::{
    BufferCell, ChoiceDescription, ConsoleColor, Coordinates, FieldDescription, KeyInfo,
    ProgressRecord, PsCredential, Rectangle, Size,
};
use crate::value::PsValue;

/// Decoding helpers from the loosely-typed [`PsValue`] parameter vector a
/// host call arrives with into the concrete arguments a `Host`/`HostUi`/
/// `HostRawUi` method expects.
fn get(params: &[PsValue], index: usize) -> HostResult<&PsValue> {
    params.get(index).ok_or(HostError::InvalidParameters)
}

pub fn str_at(params: &[PsValue], index: usize) -> HostResult<String> {
    get(params, index)?
        .as_str()
        .map(str::to_owned)
        .ok_or(HostError::InvalidParameters)
}

pub fn i32_at(params: &[PsValue], index: usize) -> HostResult<i32> {
    get(params, index)?
        .as_i64()
        .and_then(|v| i32::try_from(v).ok())
        .ok_or(HostError::InvalidParameters)
}

pub fn i64_at(params: &[PsValue], index: usize) -> HostResult<i64> {
    get(params, index)?.as_i64().ok_or(HostError::InvalidParameters)
}

pub fn color_at(params: &[PsValue], index: usize) -> HostResult<ConsoleColor> {
    let value = i32_at(params, index)?;
    ConsoleColor::from_i32(value).ok_or(HostError::InvalidParameters)
}

fn field_i32(map: &BTreeMap<String, PsValue>, key: &str) -> HostResult<i32> {
    map.get(key)
        .and_then(PsValue::as_i64)
        .and_then(|v| i32::try_from(v).ok())
        .ok_or(HostError::InvalidParameters)
}

fn field_str(map: &BTreeMap<String, PsValue>, key: &str) -> HostResult<String> {
    map.get(key)
        .and_then(PsValue::as_str)
        .map(str::to_owned)
        .ok_or(HostError::InvalidParameters)
}

pub fn coordinates_at(params: &[PsValue], index: usize) -> HostResult<Coordinates> {
    let map = get(params, index)?.as_map().ok_or(HostError::InvalidParameters)?;
    Ok(Coordinates {
        x: field_i32(map, "x")?,
        y: field_i32(map, "y")?,
    })
}

pub fn size_at(params: &[PsValue], index: usize) -> HostResult<Size> {
    let map = get(params, index)?.as_map().ok_or(HostError::InvalidParameters)?;
    Ok(Size {
        width: field_i32(map, "width")?,
        height: field_i32(map, "height")?,
    })
}

pub fn rectangle_at(params: &[PsValue], index: usize) -> HostResult<Rectangle> {
    let map = get(params, index)?.as_map().ok_or(HostError::InvalidParameters)?;
    Ok(Rectangle {
        left: field_i32(map, "left")?,
        top: field_i32(map, "top")?,
        right: field_i32(map, "right")?,
        bottom: field_i32(map, "bottom")?,
    })
}

pub fn buffer_cell_at(params: &[PsValue], index: usize) -> HostResult<BufferCell> {
    let map = get(params, index)?.as_map().ok_or(HostError::InvalidParameters)?;
    let character = field_str(map, "character")?.chars().next().unwrap_or('\0');
    Ok(BufferCell {
        character,
        foreground: ConsoleColor::from_i32(field_i32(map, "foreground")?).ok_or(HostError::InvalidParameters)?,
        background: ConsoleColor::from_i32(field_i32(map, "background")?).ok_or(HostError::InvalidParameters)?,
        buffer_cell_type: 0,
    })
}

pub fn buffer_cell_grid_at(params: &[PsValue], index: usize) -> HostResult<Vec<Vec<BufferCell>>> {
    let rows = get(params, index)?.as_list().ok_or(HostError::InvalidParameters)?;
    rows.iter()
        .map(|row| {
            let cells = row.as_list().ok_or(HostError::InvalidParameters)?;
            cells
                .iter()
                .map(|cell| {
                    let map = cell.as_map().ok_or(HostError::InvalidParameters)?;
                    let character = field_str(map, "character")?.chars().next().unwrap_or('\0');
                    Ok(BufferCell {
                        character,
                        foreground: ConsoleColor::from_i32(field_i32(map, "foreground")?)
                            .ok_or(HostError::InvalidParameters)?,
                        background: ConsoleColor::from_i32(field_i32(map, "background")?)
                            .ok_or(HostError::InvalidParameters)?,
                        buffer_cell_type: 0,
                    })
                })
                .collect()
        })
        .collect()
}

pub fn progress_record_at(params: &[PsValue], index: usize) -> HostResult<ProgressRecord> {
    let map = get(params, index)?.as_map().ok_or(HostError::InvalidParameters)?;
    Ok(ProgressRecord {
        activity_id: field_i32(map, "activity_id")?,
        activity: field_str(map, "activity")?,
        status_description: field_str(map, "status_description")?,
        percent_complete: field_i32(map, "percent_complete")?,
    })
}

pub fn field_descriptions_at(params: &[PsValue], index: usize) -> HostResult<Vec<FieldDescription>> {
    let items = get(params, index)?.as_list().ok_or(HostError::InvalidParameters)?;
    items
        .iter()
        .map(|item| {
            let map = item.as_map().ok_or(HostError::InvalidParameters)?;
            Ok(FieldDescription {
                name: field_str(map, "name")?,
                label: field_str(map, "label")?,
                parameter_type_name: field_str(map, "parameter_type_name")?,
                default_value: map.get("default_value").and_then(PsValue::as_str).map(str::to_owned),
            })
        })
        .collect()
}

pub fn choice_descriptions_at(params: &[PsValue], index: usize) -> HostResult<Vec<ChoiceDescription>> {
    let items = get(params, index)?.as_list().ok_or(HostError::InvalidParameters)?;
    items
        .iter()
        .map(|item| {
            let map = item.as_map().ok_or(HostError::InvalidParameters)?;
            Ok(ChoiceDescription {
                label: field_str(map, "label")?,
                help_message: field_str(map, "help_message")?,
            })
        })
        .collect()
}

pub fn i32_list_at(params: &[PsValue], index: usize) -> HostResult<Vec<i32>> {
    let items = get(params, index)?.as_list().ok_or(HostError::InvalidParameters)?;
    items.iter().map(PsValue::as_i64).map(|v| {
        v.and_then(|v| i32::try_from(v).ok()).ok_or(HostError::InvalidParameters)
    }).collect()
}

/// Encoding helpers: the inverse direction, used when a host method
/// succeeds and its return value needs to become the `PsValue` sent back
/// in a host response.
pub fn color_to_ps(value: ConsoleColor) -> PsValue {
    PsValue::Int(value as i64)
}

pub fn coordinates_to_ps(value: Coordinates) -> PsValue {
    let mut map = BTreeMap::new();
    map.insert("x".to_owned(), PsValue::Int(i64::from(value.x)));
    map.insert("y".to_owned(), PsValue::Int(i64::from(value.y)));
    PsValue::Map(map)
}

pub fn size_to_ps(value: Size) -> PsValue {
    let mut map = BTreeMap::new();
    map.insert("width".to_owned(), PsValue::Int(i64::from(value.width)));
    map.insert("height".to_owned(), PsValue::Int(i64::from(value.height)));
    PsValue::Map(map)
}

pub fn key_info_to_ps(value: KeyInfo) -> PsValue {
    let mut map = BTreeMap::new();
    map.insert("virtual_key_code".to_owned(), PsValue::Int(i64::from(value.virtual_key_code)));
    map.insert("character".to_owned(), PsValue::Str(value.character.to_string()));
    map.insert("control_key_state".to_owned(), PsValue::Int(i64::from(value.control_key_state)));
    map.insert("key_down".to_owned(), PsValue::Bool(value.key_down));
    PsValue::Map(map)
}

pub fn buffer_cell_grid_to_ps(value: Vec<Vec<BufferCell>>) -> PsValue {
    PsValue::List(
        value
            .into_iter()
            .map(|row| {
                PsValue::List(
                    row.into_iter()
                        .map(|cell| {
                            let mut map = BTreeMap::new();
                            map.insert("character".to_owned(), PsValue::Str(cell.character.to_string()));
                            map.insert("foreground".to_owned(), color_to_ps(cell.foreground));
                            map.insert("background".to_owned(), color_to_ps(cell.background));
                            PsValue::Map(map)
                        })
                        .collect(),
                )
            })
            .collect(),
    )
}

pub fn credential_to_ps(value: PsCredential) -> PsValue {
    let mut map = BTreeMap::new();
    map.insert("user_name".to_owned(), PsValue::Str(value.user_name));
    map.insert("password".to_owned(), PsValue::Str(value.password));
    PsValue::Map(map)
}

pub fn i32_list_to_ps(value: Vec<i32>) -> PsValue {
    PsValue::List(value.into_iter().map(|v| PsValue::Int(i64::from(v))).collect())
}
