//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::path::Path;

use serde_json::{Map, Value};

use crate::cli::PayloadArgs;
use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.trim_end_matches('?').to_owned(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Read and parse a JSON file for `--from-file` flags.
pub fn read_json_file(path: &Path) -> Result<Value, CliError> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| CliError::Validation {
        field: "from-file".into(),
        reason: format!("invalid JSON: {e}"),
    })
}

/// Resolve `--data` / `--from-file` into a JSON value.
pub fn payload(args: &PayloadArgs) -> Result<Option<Value>, CliError> {
    if let Some(ref path) = args.from_file {
        return read_json_file(path).map(Some);
    }
    args.data
        .as_deref()
        .map(|raw| {
            serde_json::from_str(raw).map_err(|e| CliError::Validation {
                field: "data".into(),
                reason: format!("invalid JSON: {e}"),
            })
        })
        .transpose()
}

/// Like [`payload`], but a payload is mandatory.
pub fn required_payload(args: &PayloadArgs) -> Result<Value, CliError> {
    payload(args)?.ok_or_else(|| CliError::Validation {
        field: "payload".into(),
        reason: "pass --data '<json>' or --from-file <path>".into(),
    })
}

/// Parse repeated `key=value` arguments.
///
/// Values that parse as JSON scalars (`true`, `42`, `"x"`) keep their type;
/// anything else is taken as a string.
pub fn parse_pairs(field: &str, pairs: &[String]) -> Result<Map<String, Value>, CliError> {
    let mut map = Map::new();
    for pair in pairs {
        let Some((key, raw)) = pair.split_once('=') else {
            return Err(CliError::Validation {
                field: field.into(),
                reason: format!("expected KEY=VALUE, got '{pair}'"),
            });
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(CliError::Validation {
                field: field.into(),
                reason: format!("empty key in '{pair}'"),
            });
        }
        let value = match serde_json::from_str::<Value>(raw) {
            Ok(v) if !v.is_object() && !v.is_array() => v,
            _ => Value::String(raw.to_owned()),
        };
        map.insert(key.to_owned(), value);
    }
    Ok(map)
}

/// Turn a `{ success: false, message }` payload into an error.
pub fn checked(value: Value) -> Result<Value, CliError> {
    if value.get("success").and_then(Value::as_bool) == Some(false) {
        let message = value
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("request was not successful")
            .to_owned();
        return Err(CliError::Rejected { message });
    }
    Ok(value)
}
