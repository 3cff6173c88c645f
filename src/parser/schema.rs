use std::collections::{BTreeMap, BTreeSet};

use sqlparser::ast::Statement;
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;

use crate::error::{Error, Result};
use crate::parser::names::{
    normalize_identifier, split_schema_and_relation, table_lookup_candidates,
};

/// Allow-list of tables and columns, read from `CREATE TABLE` statements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaCatalog {
    /// `(schema, table)` → column names, all normalized to lowercase.
    tables: BTreeMap<(Option<String>, String), BTreeSet<String>>,
}

impl SchemaCatalog {
    /// Parse PostgreSQL DDL. Statements other than `CREATE TABLE` are ignored.
    pub fn from_ddl(sql: &str) -> Result<Self> {
        let statements = Parser::parse_sql(&PostgreSqlDialect {}, sql)
            .map_err(|e| Error::Schema(e.to_string()))?;

        let mut catalog = Self::default();
        for statement in statements {
            if let Statement::CreateTable(create) = statement {
                let name = create.name.to_string();
                let columns = create
                    .columns
                    .iter()
                    .map(|c| normalize_identifier(&c.name.value))
                    .collect();
                catalog.insert_table(&name, columns);
            }
        }
        Ok(catalog)
    }

    /// Register a table definition. Later definitions replace earlier ones.
    pub fn insert_table(&mut self, name: &str, columns: BTreeSet<String>) {
        let key = match split_schema_and_relation(name) {
            Some((schema, relation)) => (
                Some(normalize_identifier(&schema)),
                normalize_identifier(&relation),
            ),
            None => (None, normalize_identifier(name)),
        };
        self.tables.insert(key, columns);
    }

    /// Number of known tables.
    pub fn number_of_tables(&self) -> usize {
        self.tables.len()
    }

    /// Resolve a table, tolerating schema qualification and quoting.
    ///
    /// An unqualified lookup matches a table defined in any schema.
    pub fn lookup_table(&self, name: &str) -> Option<&BTreeSet<String>> {
        let qualified = split_schema_and_relation(name).is_some();
        table_lookup_candidates(name)
            .into_iter()
            .find_map(|(schema, relation)| {
                if let Some(columns) = self.tables.get(&(schema.clone(), relation.clone())) {
                    return Some(columns);
                }
                if schema.is_some() || qualified {
                    return None;
                }
                self.tables
                    .iter()
                    .find(|((_, known), _)| *known == relation)
                    .map(|(_, columns)| columns)
            })
    }

    /// Fail unless `table` is known.
    pub fn require_table(&self, table: &str) -> Result<&BTreeSet<String>> {
        self.lookup_table(table)
            .ok_or_else(|| Error::UnknownTable(table.to_string()))
    }

    /// Fail unless `column` is defined on `table`.
    pub fn require_column(&self, table: &str, column: &str) -> Result<()> {
        let columns = self.require_table(table)?;
        let terminal = split_schema_and_relation(column).map_or_else(
            || normalize_identifier(column),
            |(_, col)| normalize_identifier(&col),
        );
        if columns.contains(&terminal) {
            Ok(())
        } else {
            Err(Error::UnknownColumn {
                table: table.to_string(),
                column: column.to_string(),
            })
        }
    }
}
