//! mongod YAML configuration rewriting

use super::ServiceToggle;
use crate::error::{BongoError, Result};
use serde_yaml::{Mapping, Value};

const LOCALHOST: &str = "127.0.0.1";

fn parse_error(reason: impl Into<String>) -> BongoError {
    BongoError::Parse {
        what: "mongod config".to_string(),
        reason: reason.into(),
    }
}

/// Get the mapping under `key`, creating it when absent or empty.
fn section<'a>(root: &'a mut Mapping, key: &str) -> Result<&'a mut Mapping> {
    let value = root
        .entry(Value::from(key))
        .or_insert(Value::Mapping(Mapping::new()));
    if value.is_null() {
        *value = Value::Mapping(Mapping::new());
    }
    value
        .as_mapping_mut()
        .ok_or_else(|| parse_error(format!("'{}' is not a mapping", key)))
}

/// Rewrite a mongod config for `toggle`.
///
/// Sets `security.authorization`, and either `net.bindIpAll: true` or
/// `net.bindIp: 127.0.0.1`, never both. Every other key keeps its value and
/// position; comments are not preserved.
pub fn apply(content: &str, toggle: ServiceToggle) -> Result<String> {
    let mut doc: Value = serde_yaml::from_str(content).map_err(|e| parse_error(e.to_string()))?;
    if doc.is_null() {
        doc = Value::Mapping(Mapping::new());
    }
    let root = doc
        .as_mapping_mut()
        .ok_or_else(|| parse_error("top level is not a mapping"))?;

    let authorization = if toggle.auth { "enabled" } else { "disabled" };
    section(root, "security")?.insert(Value::from("authorization"), Value::from(authorization));

    let net = section(root, "net")?;
    // bindAll is what older versions of this tool wrote; mongod rejects it
    net.shift_remove("bindAll");
    if toggle.bind_all {
        net.shift_remove("bindIp");
        net.insert(Value::from("bindIpAll"), Value::Bool(true));
    } else {
        net.shift_remove("bindIpAll");
        net.insert(Value::from("bindIp"), Value::from(LOCALHOST));
    }

    serde_yaml::to_string(&doc).map_err(|e| parse_error(e.to_string()))
}
