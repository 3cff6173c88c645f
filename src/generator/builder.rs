use chrono::{Datelike, NaiveDate};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::classifier::query_kind::{classify, QueryKind};
use crate::classifier::roles::{resolve_role, rules_for, ParameterRole, RoleRule};
use crate::error::{Error, Result};
use crate::generator::plan::{Conjunct, QueryPlan, SqlValue};
use crate::parser::extractor::ParameterSet;
use crate::parser::names::validate_identifier;
use crate::parser::schema::SchemaCatalog;
use crate::parser::values::{non_blank_text, value_text};

/// Inputs to plan building that do not come from the model.
#[derive(Debug, Clone, Copy)]
pub struct BuildContext<'a> {
    /// Date used to resolve `CURRENT_MONTH`.
    pub today: NaiveDate,
    /// Optional allow-list for the table and filter/order columns.
    pub catalog: Option<&'a SchemaCatalog>,
}

impl<'a> BuildContext<'a> {
    /// Context with no schema allow-list.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            catalog: None,
        }
    }

    /// Attach a schema allow-list.
    pub fn with_catalog(mut self, catalog: &'a SchemaCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    fn check_table(&self, table: &str) -> Result<()> {
        validate_identifier(table)?;
        if let Some(catalog) = self.catalog {
            catalog.require_table(table)?;
        }
        Ok(())
    }

    fn check_column(&self, table: &str, column: &str) -> Result<()> {
        validate_identifier(column)?;
        if let Some(catalog) = self.catalog {
            catalog.require_column(table, column)?;
        }
        Ok(())
    }
}

/// Classify the parameters and run the matching clause builders.
pub fn build_plan(set: &ParameterSet, ctx: &BuildContext<'_>) -> Result<QueryPlan> {
    let table = set.table();
    ctx.check_table(table)?;

    let parameters = set.parameters();
    let kind = classify(parameters);
    debug!(%kind, table, "classified query parameters");

    match kind {
        QueryKind::Aggregation { expression } => {
            build_aggregation(table, expression, parameters, ctx)
        }
        QueryKind::Projection => build_projection(table, parameters, ctx),
    }
}

fn build_aggregation(
    table: &str,
    expression: String,
    parameters: &Map<String, Value>,
    ctx: &BuildContext<'_>,
) -> Result<QueryPlan> {
    let kind = QueryKind::Aggregation {
        expression: expression.clone(),
    };
    let rules = rules_for(&kind);

    let select = match select_list(parameters) {
        Some(columns) => format!("{columns}, {expression}"),
        None => expression,
    };

    let mut conjuncts = base_conjuncts(table, parameters, rules, ctx)?;
    for (key, value) in parameters {
        if resolve_role(rules, key, value) == ParameterRole::Equality {
            conjuncts.push(equality(table, key, value, ctx)?);
        }
    }

    Ok(QueryPlan {
        kind,
        select,
        table: table.to_string(),
        conjuncts,
        group_by: non_blank_text(parameters.get("group_by")),
        order_by: non_blank_text(parameters.get("order_by")),
        limit: limit(parameters)?,
    })
}

fn build_projection(
    table: &str,
    parameters: &Map<String, Value>,
    ctx: &BuildContext<'_>,
) -> Result<QueryPlan> {
    let kind = QueryKind::Projection;
    let rules = rules_for(&kind);

    let select = select_list(parameters).unwrap_or_else(|| "*".to_string());
    let mut conjuncts = base_conjuncts(table, parameters, rules, ctx)?;

    let mut explicit_order: Option<String> = None;
    let mut inferred_order: Option<String> = None;
    for (key, value) in parameters {
        match resolve_role(rules, key, value) {
            ParameterRole::OrderBy => {
                explicit_order = non_blank_text(Some(value));
            }
            ParameterRole::OrderDirective(direction) => {
                if inferred_order.is_some() {
                    debug!(key, "ordering already captured, dropping later sort key");
                    continue;
                }
                ctx.check_column(table, key)?;
                inferred_order = Some(format!("{key} {direction}"));
            }
            ParameterRole::Equality => conjuncts.push(equality(table, key, value, ctx)?),
            ParameterRole::Ignored { reason } => {
                warn!(key, reason, "parameter has no effect on a projection query");
            }
            _ => {}
        }
    }

    Ok(QueryPlan {
        kind,
        select,
        table: table.to_string(),
        conjuncts,
        group_by: None,
        order_by: explicit_order.or(inferred_order),
        limit: limit(parameters)?,
    })
}

/// The `created_at` and `filter` conjuncts, which always lead the WHERE clause.
fn base_conjuncts(
    table: &str,
    parameters: &Map<String, Value>,
    rules: &[RoleRule],
    ctx: &BuildContext<'_>,
) -> Result<Vec<Conjunct>> {
    let mut conjuncts = Vec::new();

    if let Some(value) = parameters.get("created_at") {
        if resolve_role(rules, "created_at", value) == ParameterRole::CreatedAt {
            if let Some(conjunct) = created_at(value, ctx.today) {
                ctx.check_column(table, "created_at")?;
                conjuncts.push(conjunct);
            }
        }
    }

    if let Some(fragment) = non_blank_text(parameters.get("filter")) {
        conjuncts.push(Conjunct::Raw(fragment));
    }

    Ok(conjuncts)
}

/// Time filter for `created_at`; `None` for null or blank values.
fn created_at(value: &Value, today: NaiveDate) -> Option<Conjunct> {
    let text = value_text(value)?;
    match text.as_str() {
        "" => None,
        "CURRENT_MONTH" => Some(Conjunct::CurrentMonth {
            since: first_day_of_month(today),
        }),
        "CURRENT_DATE" => Some(Conjunct::CurrentDate),
        _ => Some(Conjunct::Equals {
            column: "created_at".to_string(),
            value: SqlValue::Text(text),
        }),
    }
}

/// First calendar day of the month containing `date`.
pub fn first_day_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn equality(table: &str, key: &str, value: &Value, ctx: &BuildContext<'_>) -> Result<Conjunct> {
    ctx.check_column(table, key)?;
    Ok(Conjunct::Equals {
        column: key.to_string(),
        value: SqlValue::from_json(value),
    })
}

fn select_list(parameters: &Map<String, Value>) -> Option<String> {
    non_blank_text(parameters.get("select"))
}

fn limit(parameters: &Map<String, Value>) -> Result<Option<u64>> {
    let invalid = |reason: &str| Error::InvalidParameter {
        key: "limit".to_string(),
        reason: reason.to_string(),
    };
    match parameters.get("limit") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= u64::MAX as f64)
                    .map(|f| f as u64)
            })
            .map(Some)
            .ok_or_else(|| invalid("expected a non-negative integer")),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| invalid("expected a non-negative integer")),
        Some(_) => Err(invalid("expected a number")),
    }
}
