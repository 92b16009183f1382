#![deny(missing_docs)]
//! Shared vocabulary for the FinBot streaming chat client.
//!
//! - [`Event`]: one decoded frame of the chat stream, plus the frame decoder.
//! - [`ChatMessage`] / [`MessageUpdate`]: the message list the UI renders.
//! - [`ChatHooks`]: progressive-update callbacks driven by the consumer.
//! - [`KeyValueStore`]: injected keyed state (tokens, onboarding flags).
//! - Error types for every crate boundary.

pub mod conversation;
pub mod error;
pub mod event;
pub mod hooks;
pub mod store;
pub mod types;

pub use conversation::*;
pub use error::*;
pub use event::*;
pub use hooks::*;
pub use store::*;
pub use types::*;
