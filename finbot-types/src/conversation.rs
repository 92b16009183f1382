//! In-memory conversation state.

use crate::hooks::ChatHooks;
use crate::types::{ChatMessage, MessageUpdate};

/// The state one chat view holds: its messages and conversation id.
///
/// Implements [`ChatHooks`] by applying every update to its own list, so it
/// can stand in for a UI in tests and command-line front ends.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conversation {
    /// Rendered messages, oldest first.
    pub messages: Vec<ChatMessage>,
    /// Current conversation id, once known.
    pub chat_id: Option<String>,
    /// How many history refetches were requested.
    pub history_refreshes: usize,
    /// How many scroll-to-bottom requests were made.
    pub scroll_requests: usize,
}

impl Conversation {
    /// An empty, not yet persisted conversation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume a known conversation.
    #[must_use]
    pub fn resume(chat_id: impl Into<String>) -> Self {
        Self {
            chat_id: Some(chat_id.into()),
            ..Self::default()
        }
    }

    /// The last message, if any.
    #[must_use]
    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// Whether a reply is still arriving.
    #[must_use]
    pub fn is_streaming(&self) -> bool {
        self.messages.iter().any(|m| m.streaming)
    }
}

impl ChatHooks for Conversation {
    fn update_messages(&mut self, update: MessageUpdate) {
        update.apply_to(&mut self.messages);
    }

    fn set_chat_id(&mut self, chat_id: &str) {
        self.chat_id = Some(chat_id.to_owned());
    }

    fn refresh_history(&mut self) {
        self.history_refreshes += 1;
    }

    fn scroll_to_bottom(&mut self) {
        self.scroll_requests += 1;
    }
}
