/// Fixed-order rendering of a plan into SQL text.
pub mod assembler;
/// SELECT-list, WHERE, GROUP BY, ORDER BY and LIMIT builders for both query kinds.
pub mod builder;
/// Entry points tying extraction, building, rendering and validation together.
pub mod compiler;
/// Structured query plan and SQL value types.
pub mod plan;
/// Single-statement check on the rendered SQL.
pub mod validate;
