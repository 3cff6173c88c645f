use std::fmt;

use serde_json::Value;
use tracing::debug;

use crate::classifier::query_kind::QueryKind;

/// Sort direction named by an `ASC`/`DESC` parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

impl SortDirection {
    /// Parse a string value case-insensitively; anything else is not a direction.
    pub fn from_value(value: &Value) -> Option<Self> {
        let text = value.as_str()?.trim();
        if text.eq_ignore_ascii_case("asc") {
            Some(SortDirection::Asc)
        } else if text.eq_ignore_ascii_case("desc") {
            Some(SortDirection::Desc)
        } else {
            None
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "ASC"),
            SortDirection::Desc => write!(f, "DESC"),
        }
    }
}

/// What a single parameter key contributes to the compiled query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterRole {
    /// The aggregate expression.
    Aggregate,
    /// Column list for the SELECT clause.
    Select,
    /// GROUP BY expression.
    GroupBy,
    /// Explicit ORDER BY expression.
    OrderBy,
    /// Row limit.
    Limit,
    /// Time filter on `created_at`.
    CreatedAt,
    /// Raw SQL fragment appended to WHERE.
    RawFilter,
    /// `key ASC|DESC` ordering inferred from the value.
    OrderDirective(SortDirection),
    /// `key = value` WHERE conjunct.
    Equality,
    /// Contributes nothing.
    Ignored {
        /// Why the key is dropped.
        reason: &'static str,
    },
}

/// One entry of a role table: returns a role when the rule applies to `(key, value)`.
#[derive(Clone, Copy)]
pub struct RoleRule {
    /// Short label used in debug logs and tests.
    pub name: &'static str,
    /// Predicate and role in one: `None` means "does not apply, try the next rule".
    pub resolve: fn(&str, &Value) -> Option<ParameterRole>,
}

/// Rules for aggregation queries, highest precedence first.
pub const AGGREGATION_RULES: &[RoleRule] = &[
    RoleRule {
        name: "created_at ordering value",
        resolve: created_at_with_direction,
    },
    RoleRule {
        name: "reserved key",
        resolve: aggregation_reserved_key,
    },
    RoleRule {
        name: "equality filter",
        resolve: equality_filter,
    },
];

/// Rules for projection queries, highest precedence first.
pub const PROJECTION_RULES: &[RoleRule] = &[
    RoleRule {
        name: "reserved key",
        resolve: projection_reserved_key,
    },
    RoleRule {
        name: "aggregation-only key",
        resolve: aggregation_only_key,
    },
    RoleRule {
        name: "order_by key",
        resolve: order_by_key,
    },
    RoleRule {
        name: "ordering value",
        resolve: ordering_value,
    },
    RoleRule {
        name: "equality filter",
        resolve: equality_filter,
    },
];

/// Role table for the given query kind.
pub fn rules_for(kind: &QueryKind) -> &'static [RoleRule] {
    if kind.is_aggregation() {
        AGGREGATION_RULES
    } else {
        PROJECTION_RULES
    }
}

/// Evaluate `rules` top to bottom; the first rule that applies decides the role.
pub fn resolve_role(rules: &[RoleRule], key: &str, value: &Value) -> ParameterRole {
    for rule in rules {
        if let Some(role) = (rule.resolve)(key, value) {
            debug!(key, rule = rule.name, ?role, "resolved parameter role");
            return role;
        }
    }
    ParameterRole::Equality
}

fn created_at_with_direction(key: &str, value: &Value) -> Option<ParameterRole> {
    (key == "created_at" && SortDirection::from_value(value).is_some()).then_some(
        ParameterRole::Ignored {
            reason: "created_at carries a sort direction",
        },
    )
}

fn aggregation_reserved_key(key: &str, value: &Value) -> Option<ParameterRole> {
    match key {
        "aggregate" => Some(ParameterRole::Aggregate),
        "group_by" => Some(ParameterRole::GroupBy),
        "order_by" => Some(ParameterRole::OrderBy),
        _ => projection_reserved_key(key, value),
    }
}

fn projection_reserved_key(key: &str, _value: &Value) -> Option<ParameterRole> {
    match key {
        "limit" => Some(ParameterRole::Limit),
        "select" => Some(ParameterRole::Select),
        "filter" => Some(ParameterRole::RawFilter),
        "created_at" => Some(ParameterRole::CreatedAt),
        _ => None,
    }
}

fn aggregation_only_key(key: &str, _value: &Value) -> Option<ParameterRole> {
    match key {
        "aggregate" => Some(ParameterRole::Ignored {
            reason: "aggregate is blank or none",
        }),
        "group_by" => Some(ParameterRole::Ignored {
            reason: "group_by requires an aggregate",
        }),
        _ => None,
    }
}

fn order_by_key(key: &str, _value: &Value) -> Option<ParameterRole> {
    (key == "order_by").then_some(ParameterRole::OrderBy)
}

fn ordering_value(_key: &str, value: &Value) -> Option<ParameterRole> {
    SortDirection::from_value(value).map(ParameterRole::OrderDirective)
}

fn equality_filter(_key: &str, _value: &Value) -> Option<ParameterRole> {
    Some(ParameterRole::Equality)
}
