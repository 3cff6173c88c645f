use serde_json::Value;

/// Text form of a scalar parameter value.
///
/// Strings are returned as-is, numbers and booleans in their JSON spelling, and
/// arrays of scalars joined with `", "` (the model sometimes lists columns).
/// `null` and objects have no text form.
pub fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Array(_) | Value::Object(_) | Value::Null => None,
                scalar => value_text(scalar),
            })
            .collect::<Option<Vec<_>>>()
            .map(|parts| parts.join(", ")),
        Value::Null | Value::Object(_) => None,
    }
}

/// Trimmed text form, or `None` when absent or blank.
pub fn non_blank_text(value: Option<&Value>) -> Option<String> {
    value
        .and_then(value_text)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
