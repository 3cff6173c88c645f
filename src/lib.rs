//! Compile language-model query parameters into SQL `SELECT` statements.
#![warn(missing_docs)]

/// Aggregation/projection classification and parameter role tables.
pub mod classifier;
/// Command-line and environment configuration.
pub mod config;
/// Error taxonomy shared by every stage.
pub mod error;
/// Execution adapter: SQL engines and result rows.
pub mod executor;
/// Clause builders, assembler and statement validation.
pub mod generator;
/// Language-model collaborator: prompts, history and streaming client.
pub mod llm;
/// Tracing subscriber setup.
pub mod logging;
/// Markdown output for rows and chat turns.
pub mod output;
/// Model output decoding, identifier checks and the optional schema allow-list.
pub mod parser;
/// One chat turn end to end.
pub mod pipeline;
