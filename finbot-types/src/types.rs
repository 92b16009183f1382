//! Chat messages, requests, and per-request outcomes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ChatError;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person chatting with FinBot.
    User,
    /// FinBot.
    Assistant,
}

/// What a message shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum MessageBody {
    /// Plain reply or prompt text.
    Text(String),
    /// A structured analysis payload rendered as its own entry.
    FinancialData(serde_json::Value),
}

/// One entry of the conversation the UI renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Author.
    pub role: Role,
    /// Content.
    pub body: MessageBody,
    /// `true` while the reply is still arriving.
    pub streaming: bool,
}

impl ChatMessage {
    /// A message typed by the user.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            body: MessageBody::Text(text.into()),
            streaming: false,
        }
    }

    /// An assistant reply that is still being streamed.
    #[must_use]
    pub fn streaming(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            body: MessageBody::Text(text.into()),
            streaming: true,
        }
    }

    /// A finished assistant reply.
    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            body: MessageBody::Text(text.into()),
            streaming: false,
        }
    }

    /// An assistant entry carrying a financial-analysis payload.
    #[must_use]
    pub fn financial_data(data: serde_json::Value) -> Self {
        Self {
            role: Role::Assistant,
            body: MessageBody::FinancialData(data),
            streaming: false,
        }
    }

    /// The text of this message, if it is a text message.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match &self.body {
            MessageBody::Text(t) => Some(t),
            MessageBody::FinancialData(_) => None,
        }
    }
}

/// Body of one chat request.
///
/// Serializes to the JSON the chat endpoint expects:
/// `{"message": "...", "chatId": "..." | null}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    /// Free-text prompt.
    pub message: String,
    /// Existing conversation to continue; `None` starts a new one.
    pub chat_id: Option<String>,
}

impl ChatRequest {
    /// A message that starts a new conversation.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            chat_id: None,
        }
    }

    /// Continue an existing conversation.
    #[must_use]
    pub fn in_chat(mut self, chat_id: impl Into<String>) -> Self {
        self.chat_id = Some(chat_id.into());
        self
    }
}

/// A change to the rendered message list.
pub enum MessageUpdate {
    /// Replace the whole list.
    Replace(Vec<ChatMessage>),
    /// Edit the previous list in place.
    Apply(Box<dyn FnOnce(&mut Vec<ChatMessage>) + Send>),
}

impl MessageUpdate {
    /// Wrap an updater closure.
    pub fn apply(f: impl FnOnce(&mut Vec<ChatMessage>) + Send + 'static) -> Self {
        Self::Apply(Box::new(f))
    }

    /// Run this update against a message list.
    pub fn apply_to(self, messages: &mut Vec<ChatMessage>) {
        match self {
            Self::Replace(next) => *messages = next,
            Self::Apply(f) => f(messages),
        }
    }
}

impl fmt::Debug for MessageUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Replace(msgs) => f.debug_tuple("Replace").field(msgs).finish(),
            Self::Apply(_) => f.write_str("Apply(..)"),
        }
    }
}

/// What one request produced, successful or not.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplySummary {
    /// Concatenation of every `text` fragment received.
    pub text: String,
    /// Last financial payload received, if any.
    pub financial_data: Option<serde_json::Value>,
    /// Conversation id adopted from a `done` frame during this request.
    pub chat_id: Option<String>,
    /// Whether the consumer asked the caller to refetch chat history.
    pub history_refresh_requested: bool,
    /// Prefixed lines that could not be decoded and were skipped.
    pub skipped_frames: usize,
}

/// Result of one `send_message` call.
#[derive(Debug)]
pub enum ChatOutcome {
    /// The stream ended normally and the final messages were written.
    Completed(ReplySummary),
    /// The request failed. Text already shown to the user stays shown.
    Failed {
        /// The captured failure.
        error: ChatError,
        /// Whatever was accumulated before the failure.
        partial: ReplySummary,
    },
}

impl ChatOutcome {
    /// `true` for [`ChatOutcome::Completed`].
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// The captured error, if the request failed.
    #[must_use]
    pub fn error(&self) -> Option<&ChatError> {
        match self {
            Self::Completed(_) => None,
            Self::Failed { error, .. } => Some(error),
        }
    }

    /// The accumulated summary, complete or partial.
    #[must_use]
    pub fn summary(&self) -> &ReplySummary {
        match self {
            Self::Completed(summary) => summary,
            Self::Failed { partial, .. } => partial,
        }
    }

    /// Convert into a `Result`, dropping the partial summary on failure.
    pub fn into_result(self) -> Result<ReplySummary, ChatError> {
        match self {
            Self::Completed(summary) => Ok(summary),
            Self::Failed { error, .. } => Err(error),
        }
    }
}
