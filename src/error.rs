use thiserror::Error;

/// Errors raised while turning a model response into an executed query.
#[derive(Debug, Error)]
pub enum Error {
    /// The model output did not decode as JSON, even after quote repair.
    #[error("model output is not valid JSON: {0}")]
    MalformedModelOutput(String),

    /// `tables_required` is absent, not a list of names, or empty.
    #[error("model output does not name a table in `tables_required`")]
    MissingTable,

    /// `parameters` is absent or not an object.
    #[error("model output has no `parameters` object")]
    MissingParameters,

    /// A parameter value has a shape the compiler cannot use.
    #[error("invalid value for parameter `{key}`: {reason}")]
    InvalidParameter {
        /// Offending parameter key.
        key: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// A table or column name does not look like a SQL identifier.
    #[error("`{0}` is not a valid SQL identifier")]
    InvalidIdentifier(String),

    /// The table is not part of the configured schema.
    #[error("table `{0}` is not defined in the schema")]
    UnknownTable(String),

    /// The column is not part of the configured table definition.
    #[error("column `{column}` is not defined on table `{table}`")]
    UnknownColumn {
        /// Table the column was looked up on.
        table: String,
        /// Missing column.
        column: String,
    },

    /// The assembled text is not a single SELECT statement.
    #[error("generated SQL is not a single SELECT statement: {0}")]
    InvalidStatement(String),

    /// The schema DDL could not be parsed.
    #[error("schema DDL could not be parsed: {0}")]
    Schema(String),

    /// The language model request or stream failed.
    #[error("language model request failed: {0}")]
    Model(String),

    /// The database rejected the statement or could not be reached.
    #[error("query execution failed: {0}")]
    Execution(String),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
