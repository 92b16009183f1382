//! Callbacks the streaming consumer drives while a reply arrives.

use crate::types::MessageUpdate;

/// Progressive-update hooks for one chat view.
///
/// The consumer calls these synchronously from its read loop, between
/// chunk reads. Implementations should return quickly; the next chunk is
/// not read until the hook returns.
pub trait ChatHooks: Send {
    /// Change the rendered message list. Called once per `text` fragment
    /// and once more when the reply is final.
    fn update_messages(&mut self, update: MessageUpdate);

    /// Adopt the conversation id the server assigned to a new chat.
    fn set_chat_id(&mut self, _chat_id: &str) {}

    /// Refetch the chat history list. Fired once when a new chat gets its id.
    fn refresh_history(&mut self) {}

    /// Keep the newest message in view.
    fn scroll_to_bottom(&mut self) {}
}

impl<H: ChatHooks + ?Sized> ChatHooks for &mut H {
    fn update_messages(&mut self, update: MessageUpdate) {
        (**self).update_messages(update);
    }

    fn set_chat_id(&mut self, chat_id: &str) {
        (**self).set_chat_id(chat_id);
    }

    fn refresh_history(&mut self) {
        (**self).refresh_history();
    }

    fn scroll_to_bottom(&mut self) {
        (**self).scroll_to_bottom();
    }
}
