use serde::{Deserialize, Serialize};

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person asking.
    User,
    /// The model.
    Assistant,
}

/// One role/content pair sent to or received from the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who wrote the message.
    pub role: Role,
    /// Message text.
    pub content: String,
}

impl ChatMessage {
    /// Message authored by the user.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Message authored by the model.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Instruction asking the model to extract SQL parameters for `prompt`.
pub fn format_instruction(prompt: &str, context: &str) -> String {
    format!(
        "Question: {prompt}\n\nExtract the necessary SQL parameters for this query.\n\nContext: {context}"
    )
}

/// Append-only chat history.
///
/// The history keeps the question as asked; only the request for the current turn
/// carries the full extraction instruction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    /// Empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages recorded so far.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Prior history followed by the instruction for this turn.
    pub fn request_messages(&self, prompt: &str, context: &str) -> Vec<ChatMessage> {
        let mut messages = self.messages.clone();
        messages.push(ChatMessage::user(format_instruction(prompt, context)));
        messages
    }

    /// Record a finished turn.
    pub fn record_turn(&mut self, prompt: &str, response: &str) {
        self.messages.push(ChatMessage::user(prompt));
        self.messages.push(ChatMessage::assistant(response));
    }
}
