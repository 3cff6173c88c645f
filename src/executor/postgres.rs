use diesel::connection::SimpleConnection;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::sql_types::Text;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::executor::{Row, SqlEngine};
use crate::generator::assembler::CompiledQuery;

#[derive(QueryableByName)]
struct JsonRow {
    #[diesel(sql_type = Text)]
    payload: String,
}

/// Runs each query on a fresh PostgreSQL connection.
#[derive(Debug, Clone)]
pub struct PostgresEngine {
    database_url: String,
}

impl PostgresEngine {
    /// Engine for the given connection URL. No connection is made until [`SqlEngine::execute`].
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
        }
    }
}

/// Wrap `sql` so every row comes back as one JSON object in column order.
pub fn wrap_as_json_rows(sql: &str) -> String {
    format!("SELECT row_to_json(q)::text AS payload FROM ({sql}) AS q")
}

impl SqlEngine for PostgresEngine {
    fn execute(&mut self, query: &CompiledQuery) -> Result<Vec<Row>> {
        let mut conn = PgConnection::establish(&self.database_url)
            .map_err(|e| Error::Execution(format!("connection failed: {e}")))?;

        // Literal escaping in the compiled SQL assumes standard-conforming strings.
        conn.batch_execute("SET standard_conforming_strings = on")
            .map_err(|e| Error::Execution(e.to_string()))?;

        debug!(sql = %query.sql, "executing query");
        let rows: Vec<JsonRow> = diesel::sql_query(wrap_as_json_rows(&query.sql))
            .load(&mut conn)
            .map_err(|e| Error::Execution(e.to_string()))?;
        info!(rows = rows.len(), table = %query.plan.table, "query executed");

        rows.iter()
            .map(|json_row| Row::from_json_object(&json_row.payload))
            .collect()
    }
}
