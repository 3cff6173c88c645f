//! Execution adapter: hands a compiled query to a SQL engine and returns rows.

/// PostgreSQL engine backed by diesel.
#[cfg(feature = "db")]
pub mod postgres;

use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::generator::assembler::CompiledQuery;

/// One result row: column names and values, in SELECT-list order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<(String, Value)>,
}

impl Row {
    /// Build a row from ordered `(column, value)` pairs.
    pub fn new(columns: Vec<(String, Value)>) -> Self {
        Self { columns }
    }

    /// Decode a row serialized as a JSON object; key order is kept.
    pub fn from_json_object(text: &str) -> Result<Self> {
        let object: Map<String, Value> = serde_json::from_str(text)
            .map_err(|e| Error::Execution(format!("undecodable row: {e}")))?;
        Ok(Self::new(object.into_iter().collect()))
    }

    /// Column names.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    /// Column values.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.columns.iter().map(|(_, value)| value)
    }

    /// Value of the first column called `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, value)| value)
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// True for a row without columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Something that can run a compiled SELECT.
pub trait SqlEngine {
    /// Execute `query` once and return its rows in result order.
    fn execute(&mut self, query: &CompiledQuery) -> Result<Vec<Row>>;
}
