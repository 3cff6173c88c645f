use chat2sql::classifier::query_kind::{classify, QueryKind};
use chat2sql::classifier::roles::{resolve_role, ParameterRole, AGGREGATION_RULES};
use chat2sql::error::Error;
use chat2sql::parser::extractor::extract_parameters;
use serde_json::json;

#[test]
fn single_quoted_output_is_repaired() {
    let set = extract_parameters(
        "{'tables_required': ['orders'], 'parameters': {'aggregate': 'COUNT(id)', 'limit': 10}}",
    )
    .expect("repaired output decodes");

    assert_eq!(set.table(), "orders");
    assert_eq!(set.parameters()["aggregate"], json!("COUNT(id)"));
    assert_eq!(set.parameters()["limit"], json!(10));

    let strict = extract_parameters(
        r#"{"tables_required": ["orders"], "parameters": {"aggregate": "COUNT(id)", "limit": 10}}"#,
    )
    .expect("strict output decodes");
    assert_eq!(set, strict);
}

#[test]
fn fenced_output_with_prose_decodes() {
    let raw = "Sure! Here are the parameters:\n```json\n{\"tables_required\": [\"payments\"], \"parameters\": {\"status\": \"failed\"}}\n```";
    let set = extract_parameters(raw).expect("fenced output decodes");
    assert_eq!(set.tables_required(), ["payments"]);
    assert_eq!(set.parameters()["status"], json!("failed"));
}

#[test]
fn parameter_order_follows_the_model() {
    let set = extract_parameters(
        r#"{"tables_required": ["orders"], "parameters": {"zeta": 1, "alpha": 2, "mid": 3}}"#,
    )
    .expect("decodes");
    let keys: Vec<&str> = set.parameters().keys().map(String::as_str).collect();
    assert_eq!(keys, ["zeta", "alpha", "mid"]);
}

#[test]
fn unrecoverable_output_is_malformed() {
    for raw in ["", "I could not find any tables.", "{\"tables_required\": [\"orders\""] {
        assert!(
            matches!(extract_parameters(raw), Err(Error::MalformedModelOutput(_))),
            "{raw:?}"
        );
    }
}

#[test]
fn missing_sections_are_reported_separately() {
    assert!(matches!(
        extract_parameters(r#"{"parameters": {}}"#),
        Err(Error::MissingTable)
    ));
    assert!(matches!(
        extract_parameters(r#"{"tables_required": ["orders"]}"#),
        Err(Error::MissingParameters)
    ));
    assert!(matches!(
        extract_parameters(r#"{"tables_required": ["orders"], "parameters": "none"}"#),
        Err(Error::MissingParameters)
    ));
}

#[test]
fn classification_of_extracted_parameters() {
    let set = extract_parameters(
        r#"{"tables_required": ["orders"], "parameters": {"aggregate": " AVG(amount) "}}"#,
    )
    .expect("decodes");
    assert_eq!(
        classify(set.parameters()),
        QueryKind::Aggregation {
            expression: "AVG(amount)".to_string()
        }
    );

    let set = extract_parameters(
        r#"{"tables_required": ["orders"], "parameters": {"aggregate": "None", "select": "id"}}"#,
    )
    .expect("decodes");
    assert_eq!(classify(set.parameters()), QueryKind::Projection);
}

#[test]
fn aggregation_roles_never_infer_ordering() {
    assert_eq!(
        resolve_role(AGGREGATION_RULES, "status", &json!("ASC")),
        ParameterRole::Equality
    );
    assert!(matches!(
        resolve_role(AGGREGATION_RULES, "created_at", &json!("desc")),
        ParameterRole::Ignored { .. }
    ));
    assert_eq!(
        resolve_role(AGGREGATION_RULES, "created_at", &json!("CURRENT_MONTH")),
        ParameterRole::CreatedAt
    );
    assert_eq!(
        resolve_role(AGGREGATION_RULES, "group_by", &json!("status")),
        ParameterRole::GroupBy
    );
}
