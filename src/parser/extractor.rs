use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{Error, Result};

/// Decoded model output: the target tables and the loosely-typed query parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSet {
    tables_required: Vec<String>,
    parameters: Map<String, Value>,
}

impl ParameterSet {
    /// Build a parameter set, enforcing that at least one non-blank table is named.
    pub fn new(tables_required: Vec<String>, parameters: Map<String, Value>) -> Result<Self> {
        match tables_required.first() {
            Some(first) if !first.trim().is_empty() => Ok(Self {
                tables_required,
                parameters,
            }),
            _ => Err(Error::MissingTable),
        }
    }

    /// The table the query runs against (the first entry of `tables_required`).
    pub fn table(&self) -> &str {
        // Non-empty by construction.
        self.tables_required[0].trim()
    }

    /// Every table the model asked for, in the order given.
    pub fn tables_required(&self) -> &[String] {
        &self.tables_required
    }

    /// Parameter mapping in model insertion order.
    pub fn parameters(&self) -> &Map<String, Value> {
        &self.parameters
    }

    fn from_value(value: Value) -> Result<Self> {
        let Value::Object(mut root) = value else {
            return Err(Error::MalformedModelOutput(
                "expected a JSON object at the top level".to_string(),
            ));
        };

        let tables = match root.remove("tables_required") {
            Some(Value::Array(items)) => {
                let mut items = items.into_iter();
                let Some(Value::String(first)) = items.next() else {
                    return Err(Error::MissingTable);
                };
                // Only the first entry is used; later non-string entries are dropped.
                std::iter::once(first)
                    .chain(items.filter_map(|item| match item {
                        Value::String(name) => Some(name),
                        _ => None,
                    }))
                    .collect::<Vec<_>>()
            }
            Some(Value::String(name)) => vec![name],
            _ => return Err(Error::MissingTable),
        };
        if tables.first().map_or(true, |t| t.trim().is_empty()) {
            return Err(Error::MissingTable);
        }

        let parameters = match root.remove("parameters") {
            Some(Value::Object(map)) => map,
            _ => return Err(Error::MissingParameters),
        };

        Self::new(tables, parameters)
    }
}

/// Replace every single quote with a double quote.
///
/// Values containing apostrophes are corrupted by this; the model is expected to
/// avoid them.
pub fn repair_quotes(raw: &str) -> String {
    raw.replace('\'', "\"")
}

/// Parse a raw model response into a [`ParameterSet`].
///
/// Strict JSON is tried first, then a single retry after [`repair_quotes`].
pub fn extract_parameters(raw: &str) -> Result<ParameterSet> {
    let payload = strip_wrapping(raw);
    let value = match serde_json::from_str::<Value>(payload) {
        Ok(value) => value,
        Err(strict_error) => {
            debug!(error = %strict_error, "strict JSON decode failed, retrying with quote repair");
            serde_json::from_str::<Value>(&repair_quotes(payload))
                .map_err(|e| Error::MalformedModelOutput(e.to_string()))?
        }
    };
    ParameterSet::from_value(value)
}

/// Drop Markdown code fences and any prose around the outermost JSON object.
fn strip_wrapping(raw: &str) -> &str {
    let mut trimmed = raw.trim();

    if let Some(rest) = trimmed.strip_prefix("```") {
        // The language tag ends at the first newline, or at the payload on one-line fences.
        let body = match rest.split_once('\n') {
            Some((_, body)) => body,
            None => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
        };
        trimmed = body.rsplit_once("```").map_or(body, |(inner, _)| inner).trim();
    }

    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => trimmed,
    }
}
