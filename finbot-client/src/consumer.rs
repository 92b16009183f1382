//! Applies decoded chat events to the UI hooks and assembles the reply.

use bytes::Bytes;
use finbot_types::{
    ChatError, ChatHooks, ChatMessage, ChatOutcome, Event, MessageUpdate, ReplySummary, Role,
    decode_line,
};
use futures::{Stream, StreamExt};

use crate::streaming::frame_lines;

/// Per-request accumulator state.
///
/// Created when a request starts and consumed when it ends, so nothing
/// carries over from one request to the next.
#[derive(Debug)]
pub struct ReplyAccumulator {
    /// Whether the caller already had a conversation id for this request.
    had_chat_id: bool,
    text: String,
    financial_data: Option<serde_json::Value>,
    adopted_chat_id: Option<String>,
    history_refresh_requested: bool,
    skipped_frames: usize,
}

impl ReplyAccumulator {
    /// Start accumulating a reply for a request made with `existing_chat_id`.
    #[must_use]
    pub fn new(existing_chat_id: Option<&str>) -> Self {
        Self {
            had_chat_id: existing_chat_id.is_some(),
            text: String::new(),
            financial_data: None,
            adopted_chat_id: None,
            history_refresh_requested: false,
            skipped_frames: 0,
        }
    }

    /// Process one complete line of the stream.
    ///
    /// Non-frame lines are ignored. Frames that fail to decode are logged
    /// and skipped. Only an explicit error frame returns `Err`.
    pub fn handle_line<H: ChatHooks + ?Sized>(
        &mut self,
        line: &str,
        hooks: &mut H,
    ) -> Result<(), ChatError> {
        match decode_line(line) {
            None => Ok(()),
            Some(Ok(event)) => self.handle_event(event, hooks),
            Some(Err(e)) => {
                self.skipped_frames += 1;
                tracing::warn!(error = %e, line, "skipping undecodable stream frame");
                Ok(())
            }
        }
    }

    /// Apply one decoded event.
    pub fn handle_event<H: ChatHooks + ?Sized>(
        &mut self,
        event: Event,
        hooks: &mut H,
    ) -> Result<(), ChatError> {
        match event {
            Event::FinancialData { data } => {
                if self.financial_data.is_some() {
                    tracing::debug!("replacing earlier financial payload");
                }
                self.financial_data = Some(data);
            }
            Event::Text { content } => {
                self.text.push_str(&content);
                let snapshot = self.text.clone();
                hooks.update_messages(MessageUpdate::apply(move |msgs| {
                    upsert_streaming(msgs, snapshot);
                }));
                hooks.scroll_to_bottom();
            }
            Event::Done { chat_id } => {
                tracing::debug!(chat_id = ?chat_id, "stream signalled done");
                if let Some(id) = chat_id {
                    if !self.had_chat_id && self.adopted_chat_id.is_none() {
                        hooks.set_chat_id(&id);
                        hooks.refresh_history();
                        self.adopted_chat_id = Some(id);
                        self.history_refresh_requested = true;
                    }
                }
            }
            Event::Error { message } => return Err(ChatError::Remote(message)),
        }
        Ok(())
    }

    /// Replace the streaming message with the final reply and hand back the summary.
    pub fn finish<H: ChatHooks + ?Sized>(self, hooks: &mut H) -> ReplySummary {
        let text = self.text.clone();
        let financial_data = self.financial_data.clone();
        hooks.update_messages(MessageUpdate::apply(move |msgs| {
            if msgs.last().is_some_and(is_streaming_reply) {
                msgs.pop();
            }
            msgs.push(ChatMessage::assistant(text));
            if let Some(data) = financial_data {
                msgs.push(ChatMessage::financial_data(data));
            }
        }));
        hooks.scroll_to_bottom();
        self.into_summary()
    }

    /// Everything accumulated so far, without touching the hooks.
    #[must_use]
    pub fn into_summary(self) -> ReplySummary {
        ReplySummary {
            text: self.text,
            financial_data: self.financial_data,
            chat_id: self.adopted_chat_id,
            history_refresh_requested: self.history_refresh_requested,
            skipped_frames: self.skipped_frames,
        }
    }

    /// Text assembled so far.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

fn is_streaming_reply(msg: &ChatMessage) -> bool {
    msg.streaming && msg.role == Role::Assistant
}

fn upsert_streaming(msgs: &mut Vec<ChatMessage>, text: String) {
    match msgs.last_mut() {
        Some(last) if is_streaming_reply(last) => *last = ChatMessage::streaming(text),
        _ => msgs.push(ChatMessage::streaming(text)),
    }
}

/// Drive a response body to completion.
///
/// Reads lines until the body ends, applying each frame to `hooks`. On
/// success the final messages are written; on failure whatever was
/// streamed stays as it is and the partial summary is returned.
pub async fn consume_stream<S, E, H>(
    byte_stream: S,
    existing_chat_id: Option<&str>,
    hooks: &mut H,
) -> ChatOutcome
where
    S: Stream<Item = Result<Bytes, E>>,
    E: std::error::Error + Send + Sync + 'static,
    H: ChatHooks + ?Sized,
{
    let mut acc = ReplyAccumulator::new(existing_chat_id);
    let lines = frame_lines(byte_stream);
    let mut lines = std::pin::pin!(lines);

    while let Some(line) = lines.next().await {
        let result = line.and_then(|line| acc.handle_line(&line, hooks));
        if let Err(error) = result {
            tracing::error!(error = %error, received = acc.text().len(), "chat stream failed");
            return ChatOutcome::Failed {
                error,
                partial: acc.into_summary(),
            };
        }
    }

    let summary = acc.finish(hooks);
    tracing::debug!(
        chars = summary.text.chars().count(),
        financial_data = summary.financial_data.is_some(),
        skipped_frames = summary.skipped_frames,
        "chat stream complete"
    );
    ChatOutcome::Completed(summary)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
