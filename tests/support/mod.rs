#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use chrono::NaiveDate;
use serde_json::Value;

use chat2sql::error::{Error, Result};
use chat2sql::executor::{Row, SqlEngine};
use chat2sql::generator::assembler::CompiledQuery;
use chat2sql::generator::builder::BuildContext;
use chat2sql::generator::compiler::compile_model_output;
use chat2sql::llm::prompt::ChatMessage;
use chat2sql::llm::{LanguageModel, TokenStream};

pub(crate) fn fixed_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 7, 19).expect("valid date")
}

pub(crate) fn compile(json: &Value) -> CompiledQuery {
    compile_model_output(&json.to_string(), &BuildContext::new(fixed_today()))
        .unwrap_or_else(|e| panic!("{json} should compile: {e}"))
}

pub(crate) fn compile_sql(json: &Value) -> String {
    compile(json).sql
}

pub(crate) fn compile_err(raw: &str) -> Error {
    compile_model_output(raw, &BuildContext::new(fixed_today()))
        .expect_err("compilation should fail")
}

/// Model that replies with canned responses split into small increments.
pub(crate) struct ScriptedModel {
    replies: RefCell<Vec<Result<String>>>,
    pub(crate) requests: Rc<RefCell<Vec<Vec<ChatMessage>>>>,
}

impl ScriptedModel {
    pub(crate) fn new(replies: Vec<Result<String>>) -> Self {
        Self {
            replies: RefCell::new(replies),
            requests: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

impl LanguageModel for ScriptedModel {
    fn stream_chat(&self, messages: &[ChatMessage]) -> Result<TokenStream> {
        self.requests.borrow_mut().push(messages.to_vec());
        let mut replies = self.replies.borrow_mut();
        assert!(!replies.is_empty(), "unexpected model call");
        let reply = replies.remove(0)?;
        let tokens: Vec<Result<String>> = reply
            .chars()
            .collect::<Vec<_>>()
            .chunks(7)
            .map(|chunk| Ok(chunk.iter().collect()))
            .collect();
        Ok(Box::new(tokens.into_iter()))
    }
}

/// Engine that records queries and returns fixed rows, or fails.
pub(crate) struct RecordingEngine {
    pub(crate) executed: Rc<RefCell<Vec<String>>>,
    result: std::result::Result<Vec<Row>, String>,
}

impl RecordingEngine {
    pub(crate) fn returning(rows: Vec<Row>) -> Self {
        Self {
            executed: Rc::new(RefCell::new(Vec::new())),
            result: Ok(rows),
        }
    }

    pub(crate) fn failing(message: &str) -> Self {
        Self {
            executed: Rc::new(RefCell::new(Vec::new())),
            result: Err(message.to_string()),
        }
    }
}

impl SqlEngine for RecordingEngine {
    fn execute(&mut self, query: &CompiledQuery) -> Result<Vec<Row>> {
        self.executed.borrow_mut().push(query.sql.clone());
        self.result.clone().map_err(Error::Execution)
    }
}
