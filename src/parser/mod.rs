/// Model output decoding with single-quote repair.
pub mod extractor;
/// Identifier validation and table-name normalization helpers (schema-qualified names, quoted identifiers).
pub mod names;
/// Optional table/column allow-list parsed from `CREATE TABLE` DDL.
pub mod schema;
/// Text views over loosely-typed parameter values.
pub mod values;
