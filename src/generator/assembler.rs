use std::fmt::Write;

use crate::generator::plan::{quote_literal, Conjunct, QueryPlan, SqlValue};

/// A rendered SELECT statement together with the plan it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    /// Executable SQL.
    pub sql: String,
    /// Structured form, kept for inspection.
    pub plan: QueryPlan,
}

/// Render `plan` in fixed clause order: SELECT, FROM, WHERE, GROUP BY, ORDER BY, LIMIT.
pub fn assemble(plan: QueryPlan) -> CompiledQuery {
    let mut sql = format!("SELECT {} FROM {}", plan.select, plan.table);

    if !plan.conjuncts.is_empty() {
        let clauses: Vec<String> = plan.conjuncts.iter().map(render_conjunct).collect();
        write!(sql, " WHERE {}", clauses.join(" AND ")).unwrap();
    }
    if let Some(group_by) = &plan.group_by {
        write!(sql, " GROUP BY {group_by}").unwrap();
    }
    if let Some(order_by) = &plan.order_by {
        write!(sql, " ORDER BY {order_by}").unwrap();
    }
    if let Some(limit) = plan.limit {
        write!(sql, " LIMIT {limit}").unwrap();
    }

    CompiledQuery { sql, plan }
}

fn render_conjunct(conjunct: &Conjunct) -> String {
    match conjunct {
        Conjunct::CurrentMonth { since } => format!(
            "created_at >= {}",
            quote_literal(&since.format("%Y-%m-%d").to_string())
        ),
        Conjunct::CurrentDate => "DATE(created_at) = DATE(NOW())".to_string(),
        Conjunct::Equals {
            column,
            value: SqlValue::Null,
        } => format!("{column} IS NULL"),
        Conjunct::Equals { column, value } => format!("{column} = {}", value.to_sql_literal()),
        Conjunct::Raw(fragment) => fragment.clone(),
    }
}
