#![deny(missing_docs)]
//! Streaming chat client for the FinBot financial assistant.
//!
//! [`FinBot::send_message`] posts one prompt, reads the `data: {...}` frames
//! of the reply as they arrive, pushes progressive updates through
//! [`ChatHooks`](finbot_types::ChatHooks), and returns a
//! [`ChatOutcome`](finbot_types::ChatOutcome). Failures never escape as
//! errors; they are logged with `tracing` and captured in the outcome.

pub mod client;
pub mod consumer;
pub(crate) mod error;
pub mod sanitize;
pub mod session;
pub mod streaming;

pub use client::{FinBot, FinBotConfig};
pub use consumer::{ReplyAccumulator, consume_stream};
pub use sanitize::PromptSanitizer;
pub use session::SessionStore;
pub use streaming::{DEFAULT_MAX_LINE_BYTES, FrameBuffer, frame_lines, frame_lines_with_limit};

// Re-export finbot-types for convenience
pub use finbot_types::{ChatError, ChatHooks, ChatOutcome, ChatRequest, Conversation, Event};
