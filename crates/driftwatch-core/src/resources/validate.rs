//! Shape checks shared by resource factories.
//!
//! Each helper inspects one attribute in place. Absent attributes pass;
//! `null` is dropped so downstream code never distinguishes the two.

use crate::errors::{DriftwatchError, Result};
use crate::model::{AttrValue, Attributes};

fn malformed(
    resource_type: &str,
    id: &str,
    field: &str,
    expected: &str,
    found: &AttrValue,
) -> DriftwatchError {
    DriftwatchError::MalformedAttribute {
        resource_type: resource_type.to_string(),
        resource_id: id.to_string(),
        field: field.to_string(),
        expected: expected.to_string(),
        found: found.kind_name().to_string(),
    }
}

/// Require `field` to be a list whose elements are all maps
///
/// # Errors
///
/// Returns `MalformedAttribute` naming the field (or the offending element
/// as `field.N`).
pub fn list_of_maps(resource_type: &str, id: &str, raw: &mut Attributes, field: &str) -> Result<()> {
    match raw.get(field) {
        None => Ok(()),
        Some(AttrValue::Null) => {
            raw.remove(field);
            Ok(())
        }
        Some(AttrValue::List(items)) => {
            match items.iter().position(|item| !matches!(item, AttrValue::Map(_))) {
                None => Ok(()),
                Some(index) => Err(malformed(
                    resource_type,
                    id,
                    &format!("{}.{}", field, index),
                    "map",
                    &items[index],
                )),
            }
        }
        Some(other) => Err(malformed(resource_type, id, field, "list of maps", other)),
    }
}

/// Require `field` to be a list (elements unchecked)
///
/// # Errors
///
/// Returns `MalformedAttribute` if the value is present and not a list.
pub fn list(resource_type: &str, id: &str, raw: &mut Attributes, field: &str) -> Result<()> {
    match raw.get(field) {
        None | Some(AttrValue::List(_)) => Ok(()),
        Some(AttrValue::Null) => {
            raw.remove(field);
            Ok(())
        }
        Some(other) => Err(malformed(resource_type, id, field, "list", other)),
    }
}

/// Require `field` to be a map
///
/// # Errors
///
/// Returns `MalformedAttribute` if the value is present and not a map.
pub fn map(resource_type: &str, id: &str, raw: &mut Attributes, field: &str) -> Result<()> {
    match raw.get(field) {
        None | Some(AttrValue::Map(_)) => Ok(()),
        Some(AttrValue::Null) => {
            raw.remove(field);
            Ok(())
        }
        Some(other) => Err(malformed(resource_type, id, field, "map", other)),
    }
}

/// Require `field` to be a number; numeric strings are converted to integers
///
/// # Errors
///
/// Returns `MalformedAttribute` for any other shape.
pub fn number(resource_type: &str, id: &str, raw: &mut Attributes, field: &str) -> Result<()> {
    let parsed = match raw.get(field) {
        None | Some(AttrValue::Int(_)) | Some(AttrValue::Float(_)) => return Ok(()),
        Some(AttrValue::Null) => {
            raw.remove(field);
            return Ok(());
        }
        Some(value @ AttrValue::String(s)) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| malformed(resource_type, id, field, "number", value)),
        Some(other) => Err(malformed(resource_type, id, field, "number", other)),
    };

    raw.insert(field, parsed?);
    Ok(())
}

/// Require `field` to be a boolean
///
/// # Errors
///
/// Returns `MalformedAttribute` for any other shape.
pub fn boolean(resource_type: &str, id: &str, raw: &mut Attributes, field: &str) -> Result<()> {
    match raw.get(field) {
        None | Some(AttrValue::Bool(_)) => Ok(()),
        Some(AttrValue::Null) => {
            raw.remove(field);
            Ok(())
        }
        Some(other) => Err(malformed(resource_type, id, field, "bool", other)),
    }
}
