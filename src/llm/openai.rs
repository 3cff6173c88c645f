use std::io::{BufRead, BufReader};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::llm::prompt::ChatMessage;
use crate::llm::{LanguageModel, TokenStream};

/// Streaming client for an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiClient {
    api_base: String,
    api_key: String,
    model: String,
    client: reqwest::blocking::Client,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

#[derive(Deserialize)]
struct ChatChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
    #[serde(default)]
    error: Option<ErrorBody>,
}

#[derive(Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: Delta,
}

#[derive(Deserialize, Default)]
struct Delta {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl OpenAiClient {
    /// Create a client. `api_base` is the URL prefix before `/chat/completions`.
    pub fn new(api_base: &str, api_key: &str, model: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(None::<Duration>)
            .build()
            .map_err(|e| Error::Model(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            client,
        })
    }

    /// Model identifier sent with each request.
    pub fn model(&self) -> &str {
        &self.model
    }
}

impl LanguageModel for OpenAiClient {
    fn stream_chat(&self, messages: &[ChatMessage]) -> Result<TokenStream> {
        let url = format!("{}/chat/completions", self.api_base);
        debug!(%url, model = %self.model, messages = messages.len(), "requesting chat completion");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&ChatRequest {
                model: &self.model,
                messages,
                stream: true,
            })
            .send()
            .map_err(|e| Error::Model(format!("failed to send request: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(Error::Model(format!("HTTP {status}: {body}")));
        }

        Ok(Box::new(SseDeltas::new(BufReader::new(response))))
    }
}

/// Iterator over the text increments of a server-sent chat completion stream.
pub struct SseDeltas<R> {
    reader: R,
    done: bool,
}

impl<R: BufRead> SseDeltas<R> {
    /// Wrap a reader positioned at the start of the event stream.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            done: false,
        }
    }

    fn fail(&mut self, message: String) -> Option<Result<String>> {
        self.done = true;
        Some(Err(Error::Model(message)))
    }
}

impl<R: BufRead> Iterator for SseDeltas<R> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut line = String::new();
        while !self.done {
            line.clear();
            match self.reader.read_line(&mut line) {
                Ok(0) => {
                    self.done = true;
                    return None;
                }
                Ok(_) => {}
                Err(e) => return self.fail(format!("failed to read stream: {e}")),
            }

            let Some(payload) = line.trim().strip_prefix("data:") else {
                continue;
            };
            let payload = payload.trim();
            if payload == "[DONE]" {
                self.done = true;
                return None;
            }

            match serde_json::from_str::<ChatChunk>(payload) {
                Ok(ChatChunk {
                    error: Some(error), ..
                }) => return self.fail(error.message),
                Ok(chunk) => {
                    let content = chunk
                        .choices
                        .into_iter()
                        .next()
                        .and_then(|choice| choice.delta.content)
                        .filter(|content| !content.is_empty());
                    if let Some(content) = content {
                        trace!(%content, "received token");
                        return Some(Ok(content));
                    }
                }
                Err(e) => return self.fail(format!("unexpected stream event: {e}")),
            }
        }
        None
    }
}
