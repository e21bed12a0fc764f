use crate::error::JsonInputError;
use crate::graph::Params;
use serde_json::Value;

/// Parses user-typed JSON for a params, global or run override map.
///
/// Blank text is an empty map. Anything else must be a JSON object without blank keys.
pub fn parse_json_object(text: &str) -> Result<Params, JsonInputError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(Params::new());
    }
    let value: Value =
        serde_json::from_str(text).map_err(|e| JsonInputError::Parse(e.to_string()))?;
    let Value::Object(map) = value else {
        return Err(JsonInputError::NotAnObject);
    };
    if map.keys().any(|k| k.trim().is_empty()) {
        return Err(JsonInputError::EmptyKey);
    }
    Ok(map)
}

/// Pretty JSON text for showing a map in an editor.
pub fn format_json_object(map: &Params) -> String {
    serde_json::to_string_pretty(map).unwrap_or_else(|_| "{}".to_string())
}
