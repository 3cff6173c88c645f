use chrono::NaiveDate;
use serde_json::Value;

use crate::classifier::query_kind::QueryKind;

/// A value compared against a column in an equality conjunct.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// Integer literal.
    Integer(i64),
    /// Floating point literal.
    Float(f64),
    /// Boolean literal.
    Bool(bool),
    /// String literal.
    Text(String),
    /// SQL `NULL`; compared with `IS NULL`.
    Null,
}

impl SqlValue {
    /// Convert a parameter value. Numbers stay numeric, lists and objects become JSON text.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => SqlValue::Null,
            Value::Bool(b) => SqlValue::Bool(*b),
            Value::Number(n) => match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => SqlValue::Integer(i),
                (None, Some(f)) => SqlValue::Float(f),
                (None, None) => SqlValue::Text(n.to_string()),
            },
            Value::String(s) => SqlValue::Text(s.clone()),
            Value::Array(_) | Value::Object(_) => SqlValue::Text(value.to_string()),
        }
    }

    /// Inline SQL literal; strings are single-quoted with embedded quotes doubled.
    pub fn to_sql_literal(&self) -> String {
        match self {
            SqlValue::Integer(i) => i.to_string(),
            SqlValue::Float(f) => f.to_string(),
            SqlValue::Bool(true) => "TRUE".to_string(),
            SqlValue::Bool(false) => "FALSE".to_string(),
            SqlValue::Text(s) => quote_literal(s),
            SqlValue::Null => "NULL".to_string(),
        }
    }
}

/// Single-quote a string literal.
pub fn quote_literal(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

/// One member of the flat `AND` conjunction in WHERE.
#[derive(Debug, Clone, PartialEq)]
pub enum Conjunct {
    /// `created_at >= '<first day of the month>'`.
    CurrentMonth {
        /// First day of the current month.
        since: NaiveDate,
    },
    /// `DATE(created_at) = DATE(NOW())`.
    CurrentDate,
    /// `column = value`, or `column IS NULL`.
    Equals {
        /// Column identifier.
        column: String,
        /// Compared value.
        value: SqlValue,
    },
    /// Trusted SQL fragment, used verbatim.
    Raw(String),
}

/// Structured form of a compiled SELECT, before rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    /// How the parameters were classified.
    pub kind: QueryKind,
    /// SELECT list.
    pub select: String,
    /// Source table.
    pub table: String,
    /// WHERE conjuncts in emission order.
    pub conjuncts: Vec<Conjunct>,
    /// GROUP BY expression.
    pub group_by: Option<String>,
    /// ORDER BY expression.
    pub order_by: Option<String>,
    /// LIMIT row count.
    pub limit: Option<u64>,
}
