//! Streaming example: print a FinBot reply as it arrives.
//!
//! Set FINBOT_BASE_URL and FINBOT_TOKEN in your environment and run:
//!   cargo run --example streaming -p finbot-client -- "THYAO için teknik analiz"

use std::io::Write;

use finbot_client::FinBot;
use finbot_types::{ChatHooks, ChatMessage, ChatRequest, Conversation, MessageBody, MessageUpdate};
use tracing_subscriber::EnvFilter;

/// Prints only the newly arrived part of the streaming reply.
struct Terminal {
    conversation: Conversation,
    printed: usize,
}

impl ChatHooks for Terminal {
    fn update_messages(&mut self, update: MessageUpdate) {
        self.conversation.update_messages(update);
        let streaming = self
            .conversation
            .last()
            .filter(|m| m.streaming)
            .and_then(ChatMessage::text);
        let Some(text) = streaming else {
            // Reply finalized; the next one prints from the start.
            self.printed = 0;
            return;
        };

        let delta = text.get(self.printed..).unwrap_or(text);
        let mut stdout = std::io::stdout().lock();
        if let Err(e) = stdout.write_all(delta.as_bytes()).and_then(|()| stdout.flush()) {
            tracing::warn!(error = %e, "failed to write reply to stdout");
        }
        self.printed = text.len();
    }

    fn set_chat_id(&mut self, chat_id: &str) {
        self.conversation.set_chat_id(chat_id);
    }

    fn refresh_history(&mut self) {
        eprintln!("\n[new conversation saved]");
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let prompt = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "BIST100 bugün nasıl?".into());

    let client = FinBot::from_env()?;
    let mut terminal = Terminal {
        conversation: Conversation::new(),
        printed: 0,
    };

    let outcome = client
        .send_message(ChatRequest::new(prompt), &mut terminal)
        .await;
    println!();

    for message in terminal.conversation.messages.iter().skip(2) {
        if let MessageBody::FinancialData(data) = &message.body {
            println!("Financial data:\n{}", serde_json::to_string_pretty(data)?);
        }
    }
    if let Some(id) = &terminal.conversation.chat_id {
        println!("Conversation id: {id}");
    }

    Ok(outcome.into_result().map(|_| ())?)
}
