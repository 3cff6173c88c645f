use sqlparser::ast::Statement;
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;

use crate::error::{Error, Result};

/// Check that `sql` parses as exactly one query statement.
///
/// Raw `filter`, `order_by` and `group_by` fragments are spliced in verbatim, so this
/// is the last line before the text reaches the database.
pub fn ensure_single_select(sql: &str) -> Result<()> {
    let statements = Parser::parse_sql(&PostgreSqlDialect {}, sql)
        .map_err(|e| Error::InvalidStatement(e.to_string()))?;

    match statements.as_slice() {
        [Statement::Query(_)] => Ok(()),
        [] => Err(Error::InvalidStatement("no statement".to_string())),
        [_] => Err(Error::InvalidStatement(
            "statement is not a query".to_string(),
        )),
        _ => Err(Error::InvalidStatement(format!(
            "expected one statement, found {}",
            statements.len()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_generated_shapes() {
        for sql in [
            "SELECT * FROM orders",
            "SELECT COUNT(id) FROM orders WHERE created_at >= '2024-03-01' LIMIT 10",
            "SELECT name FROM orders WHERE DATE(created_at) = DATE(NOW()) ORDER BY status ASC",
            "SELECT status, SUM(amount) FROM orders WHERE user_id = 5 AND name = 'Bob' GROUP BY status",
        ] {
            ensure_single_select(sql).unwrap_or_else(|e| panic!("{sql}: {e}"));
        }
    }

    #[test]
    fn rejects_stacked_and_non_query_statements() {
        let err = ensure_single_select("SELECT * FROM orders WHERE 1 = 1; DROP TABLE orders")
            .expect_err("stacked statements");
        assert!(err.to_string().contains("expected one statement"));

        let err = ensure_single_select("DELETE FROM orders").expect_err("not a query");
        assert!(err.to_string().contains("not a query"));

        let err = ensure_single_select("SELECT * FROM orders WHERE").expect_err("syntax error");
        assert!(matches!(err, Error::InvalidStatement(_)));
    }
}
