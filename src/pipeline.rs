use chrono::{Local, NaiveDate};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::executor::{Row, SqlEngine};
use crate::generator::assembler::CompiledQuery;
use crate::generator::builder::BuildContext;
use crate::generator::compiler::compile_model_output;
use crate::llm::prompt::Conversation;
use crate::llm::{collect_response, LanguageModel};
use crate::parser::schema::SchemaCatalog;

/// Everything one chat turn produced.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    /// Full model response; always present.
    pub response: String,
    /// The compiled query, when compilation succeeded.
    pub query: Option<CompiledQuery>,
    /// Result rows, when the query was executed.
    pub rows: Option<Vec<Row>>,
    /// User-facing message for any failure after the model answered.
    pub error: Option<String>,
}

impl TurnOutcome {
    /// True when no step after the model response failed.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Compiles model responses and, when an engine is attached, executes them.
#[derive(Default)]
pub struct QueryRunner {
    engine: Option<Box<dyn SqlEngine>>,
    catalog: Option<SchemaCatalog>,
    today: Option<NaiveDate>,
}

impl QueryRunner {
    /// Compile-only runner without a schema allow-list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Execute compiled queries on `engine`.
    pub fn with_engine(mut self, engine: Box<dyn SqlEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Restrict tables and columns to `catalog`.
    pub fn with_catalog(mut self, catalog: SchemaCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Resolve `CURRENT_MONTH` against a fixed date instead of the local clock.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    /// True when queries are executed, not only compiled.
    pub fn executes(&self) -> bool {
        self.engine.is_some()
    }

    /// Turn a model response into a query and rows. Failures become `outcome.error`.
    pub fn process_response(&mut self, response: String) -> TurnOutcome {
        let mut outcome = TurnOutcome {
            response,
            query: None,
            rows: None,
            error: None,
        };

        let today = self.today.unwrap_or_else(|| Local::now().date_naive());
        let mut ctx = BuildContext::new(today);
        if let Some(catalog) = &self.catalog {
            ctx = ctx.with_catalog(catalog);
        }

        let query = match compile_model_output(&outcome.response, &ctx) {
            Ok(query) => query,
            Err(error) => {
                outcome.error = Some(user_message(&error));
                return outcome;
            }
        };

        if let Some(engine) = self.engine.as_mut() {
            match engine.execute(&query) {
                Ok(rows) => outcome.rows = Some(rows),
                Err(error) => outcome.error = Some(user_message(&error)),
            }
        }
        outcome.query = Some(query);
        outcome
    }
}

fn user_message(error: &Error) -> String {
    warn!(%error, "query step failed");
    format!("Could not run the generated query: {error}")
}

/// A conversation with a model, each answer enriched with a compiled query.
pub struct ChatSession<M> {
    model: M,
    runner: QueryRunner,
    conversation: Conversation,
}

impl<M: LanguageModel> ChatSession<M> {
    /// Start an empty conversation.
    pub fn new(model: M, runner: QueryRunner) -> Self {
        Self {
            model,
            runner,
            conversation: Conversation::new(),
        }
    }

    /// History so far.
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Ask one question. `on_token` sees each response increment as it arrives.
    ///
    /// Only a model failure is an `Err`; query failures are reported in the outcome.
    pub fn run_turn(
        &mut self,
        prompt: &str,
        context: &str,
        on_token: impl FnMut(&str),
    ) -> Result<TurnOutcome> {
        let messages = self.conversation.request_messages(prompt, context);
        let stream = self.model.stream_chat(&messages)?;
        let response = collect_response(stream, on_token)?;
        info!(chars = response.len(), "model response complete");

        self.conversation.record_turn(prompt, &response);
        Ok(self.runner.process_response(response))
    }
}
