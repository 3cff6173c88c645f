//! Language-model collaborator: prompt shaping, history and the streaming client.

/// OpenAI-compatible streaming chat completion client.
pub mod openai;
/// Instruction formatting and conversation history.
pub mod prompt;

use crate::error::Result;
use crate::llm::prompt::ChatMessage;

/// Lazily produced text increments of one model response.
pub type TokenStream = Box<dyn Iterator<Item = Result<String>>>;

/// A chat model that answers with a token stream.
pub trait LanguageModel {
    /// Send `messages` and return the response as it is generated.
    fn stream_chat(&self, messages: &[ChatMessage]) -> Result<TokenStream>;
}

/// Drain `stream`, calling `on_token` for every increment, and return the full text.
pub fn collect_response(stream: TokenStream, mut on_token: impl FnMut(&str)) -> Result<String> {
    let mut response = String::new();
    for token in stream {
        let token = token?;
        on_token(&token);
        response.push_str(&token);
    }
    Ok(response)
}
