#![deny(missing_docs)]
//! # finbot — umbrella crate
//!
//! A single import surface for the FinBot streaming chat client. The wire
//! types are always available; the HTTP client and the state backends sit
//! behind feature flags, and [`prelude`] covers the happy path.

pub use finbot_types;
#[cfg(feature = "client")]
pub use finbot_client;
#[cfg(feature = "state-fs")]
pub use finbot_state_fs;
#[cfg(feature = "state-memory")]
pub use finbot_state_memory;

/// Happy-path imports for talking to FinBot.
pub mod prelude {
    pub use finbot_types::{
        ChatError, ChatHooks, ChatMessage, ChatOutcome, ChatRequest, Conversation, Event,
        KeyValueStore, MessageBody, MessageUpdate, ReplySummary, Role, Scope,
    };

    #[cfg(feature = "client")]
    pub use finbot_client::{FinBot, FinBotConfig, PromptSanitizer, SessionStore};

    #[cfg(feature = "state-memory")]
    pub use finbot_state_memory::MemoryStore;

    #[cfg(feature = "state-fs")]
    pub use finbot_state_fs::FsStore;
}
