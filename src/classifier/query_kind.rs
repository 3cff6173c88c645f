use std::fmt;

use serde_json::{Map, Value};

use crate::parser::values::value_text;

/// Shape of the SELECT the parameters describe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryKind {
    /// An aggregate expression such as `COUNT(id)`, optionally next to a grouping column.
    Aggregation {
        /// The trimmed aggregate expression.
        expression: String,
    },
    /// A plain column list (or `*`).
    Projection,
}

impl QueryKind {
    /// True for [`QueryKind::Aggregation`].
    pub fn is_aggregation(&self) -> bool {
        matches!(self, QueryKind::Aggregation { .. })
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryKind::Aggregation { expression } => write!(f, "aggregation ({expression})"),
            QueryKind::Projection => write!(f, "projection"),
        }
    }
}

/// Decide between aggregation and projection.
///
/// A missing, `null`, blank or `none` (any case) aggregate is a projection, not an error.
pub fn classify(parameters: &Map<String, Value>) -> QueryKind {
    let Some(expression) = parameters.get("aggregate").and_then(value_text) else {
        return QueryKind::Projection;
    };
    let expression = expression.trim();
    if expression.is_empty() || expression.eq_ignore_ascii_case("none") {
        return QueryKind::Projection;
    }
    QueryKind::Aggregation {
        expression: expression.to_string(),
    }
}
