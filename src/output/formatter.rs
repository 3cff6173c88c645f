use std::fmt::Write;

use serde_json::Value;

use crate::executor::Row;
use crate::pipeline::TurnOutcome;

/// Render rows as a Markdown table, using the first row's columns as the header.
pub fn format_rows(rows: &[Row]) -> String {
    let Some(first) = rows.first() else {
        return "(no rows)\n".to_string();
    };

    let mut table = String::new();
    let header: Vec<String> = first.column_names().map(escape_cell).collect();
    writeln!(table, "| {} |", header.join(" | ")).unwrap();
    writeln!(table, "|{}|", vec!["---"; header.len()].join("|")).unwrap();

    for row in rows {
        let cells: Vec<String> = row.values().map(format_cell).collect();
        writeln!(table, "| {} |", cells.join(" | ")).unwrap();
    }

    table
}

fn format_cell(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::String(s) => escape_cell(s),
        other => escape_cell(&other.to_string()),
    }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

/// Everything after the model response: the SQL, then rows or the error.
pub fn format_query_section(outcome: &TurnOutcome) -> String {
    let mut section = String::new();

    if let Some(query) = &outcome.query {
        writeln!(section, "```sql").unwrap();
        writeln!(section, "{}", query.sql).unwrap();
        writeln!(section, "```").unwrap();
    }
    if let Some(rows) = &outcome.rows {
        writeln!(section).unwrap();
        section.push_str(&format_rows(rows));
    }
    if let Some(error) = &outcome.error {
        if !section.is_empty() {
            writeln!(section).unwrap();
        }
        writeln!(section, "**Error:** {error}").unwrap();
    }

    section
}

/// Full transcript block for one turn.
pub fn format_turn(outcome: &TurnOutcome) -> String {
    let mut turn = String::new();
    writeln!(turn, "{}", outcome.response.trim_end()).unwrap();
    let section = format_query_section(outcome);
    if !section.is_empty() {
        writeln!(turn).unwrap();
        turn.push_str(&section);
    }
    turn
}
