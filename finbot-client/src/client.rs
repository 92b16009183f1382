//! FinBot chat client and its configuration.

use finbot_types::{
    ChatError, ChatHooks, ChatMessage, ChatOutcome, ChatRequest, KeyValueStore, MessageUpdate,
    ReplySummary,
};

use crate::consumer::consume_stream;
use crate::error::{map_http_status, map_reqwest_error};
use crate::sanitize::PromptSanitizer;
use crate::session::SessionStore;

/// Default FinBot API base URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Default path of the streaming chat endpoint.
pub const DEFAULT_CHAT_PATH: &str = "/api/finbot/chat";

/// Environment variable overriding the base URL.
pub const ENV_BASE_URL: &str = "FINBOT_BASE_URL";

/// Environment variable overriding the chat path.
pub const ENV_CHAT_PATH: &str = "FINBOT_CHAT_PATH";

/// Environment variable holding the bearer token.
pub const ENV_TOKEN: &str = "FINBOT_TOKEN";

/// Where and how to reach the chat endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinBotConfig {
    /// API base URL, without a trailing slash.
    pub base_url: String,
    /// Path of the streaming chat endpoint.
    pub chat_path: String,
    /// Bearer token sent as `Authorization: Bearer <token>`.
    pub token: Option<String>,
}

impl Default for FinBotConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            chat_path: DEFAULT_CHAT_PATH.into(),
            token: None,
        }
    }
}

impl FinBotConfig {
    /// Defaults overridden by `FINBOT_BASE_URL`, `FINBOT_CHAT_PATH` and `FINBOT_TOKEN`.
    pub fn from_env() -> Result<Self, ChatError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ChatError> {
        let mut config = Self::default();
        if let Some(url) = lookup(ENV_BASE_URL) {
            config.base_url = url;
        }
        if let Some(path) = lookup(ENV_CHAT_PATH) {
            config.chat_path = path;
        }
        config.token = lookup(ENV_TOKEN).filter(|t| !t.is_empty());
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that cannot produce a request URL.
    pub fn validate(&self) -> Result<(), ChatError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ChatError::InvalidConfig(format!(
                "{ENV_BASE_URL} must be an http(s) URL, got {:?}",
                self.base_url
            )));
        }
        if !self.chat_path.starts_with('/') {
            return Err(ChatError::InvalidConfig(format!(
                "{ENV_CHAT_PATH} must start with '/', got {:?}",
                self.chat_path
            )));
        }
        Ok(())
    }

    /// Full URL of the chat endpoint.
    #[must_use]
    pub fn chat_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.chat_path)
    }
}

/// Client for the FinBot streaming chat endpoint.
///
/// Each [`send_message`](Self::send_message) call is independent: it owns
/// its own buffers, so concurrent or repeated calls share nothing but the
/// HTTP connection pool.
///
/// # Example
///
/// ```no_run
/// use finbot_client::FinBot;
/// use finbot_types::{ChatRequest, Conversation};
///
/// # async fn run() {
/// let client = FinBot::new()
///     .base_url("https://finbot.example.com")
///     .bearer_token("eyJhbGciOi...");
/// let mut conversation = Conversation::new();
/// let outcome = client
///     .send_message(ChatRequest::new("THYAO için teknik analiz"), &mut conversation)
///     .await;
/// assert!(outcome.is_success());
/// # }
/// ```
pub struct FinBot {
    pub(crate) config: FinBotConfig,
    pub(crate) sanitizer: PromptSanitizer,
    /// Shared HTTP client.
    pub(crate) client: reqwest::Client,
}

impl FinBot {
    /// A client with default configuration and no token.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(FinBotConfig::default())
    }

    /// A client using `config` as is.
    #[must_use]
    pub fn with_config(config: FinBotConfig) -> Self {
        Self {
            config,
            sanitizer: PromptSanitizer::default(),
            client: reqwest::Client::new(),
        }
    }

    /// A client configured from the environment.
    pub fn from_env() -> Result<Self, ChatError> {
        FinBotConfig::from_env().map(Self::with_config)
    }

    /// A client carrying the token persisted in `session`.
    pub async fn with_session<S: KeyValueStore>(
        config: FinBotConfig,
        session: &SessionStore<S>,
    ) -> Result<Self, ChatError> {
        let token = session.require_token().await?;
        Ok(Self::with_config(config).bearer_token(token))
    }

    /// Override the API base URL.
    ///
    /// Useful for testing with a local mock server.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Override the chat endpoint path.
    #[must_use]
    pub fn chat_path(mut self, path: impl Into<String>) -> Self {
        self.config.chat_path = path.into();
        self
    }

    /// Set the bearer token.
    #[must_use]
    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        self.config.token = Some(token.into());
        self
    }

    /// Replace the prompt sanitizer.
    #[must_use]
    pub fn sanitizer(mut self, sanitizer: PromptSanitizer) -> Self {
        self.sanitizer = sanitizer;
        self
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> &FinBotConfig {
        &self.config
    }

    /// Send one message and stream the reply into `hooks`.
    ///
    /// The user's message is echoed into the conversation first, then the
    /// reply is streamed in as it arrives. Never returns early with an
    /// error: every failure is logged and captured in the outcome.
    pub async fn send_message<H: ChatHooks + ?Sized>(
        &self,
        request: ChatRequest,
        hooks: &mut H,
    ) -> ChatOutcome {
        let request = match self.prepare(request) {
            Ok(request) => request,
            Err(error) => return failed(error),
        };

        let echo = request.message.clone();
        hooks.update_messages(MessageUpdate::apply(move |msgs| {
            msgs.push(ChatMessage::user(echo));
        }));
        hooks.scroll_to_bottom();

        let response = match self.open_stream(&request).await {
            Ok(response) => response,
            Err(error) => return failed(error),
        };

        consume_stream(response.bytes_stream(), request.chat_id.as_deref(), hooks).await
    }

    fn prepare(&self, request: ChatRequest) -> Result<ChatRequest, ChatError> {
        self.config.validate()?;
        let message = self.sanitizer.sanitize(&request.message)?;
        Ok(ChatRequest { message, ..request })
    }

    /// Send the request and check the status, without reading the body.
    async fn open_stream(&self, request: &ChatRequest) -> Result<reqwest::Response, ChatError> {
        let url = self.config.chat_url();
        tracing::debug!(
            url = %url,
            chat_id = ?request.chat_id,
            authenticated = self.config.token.is_some(),
            "sending chat request"
        );

        let mut builder = self
            .client
            .post(&url)
            .header("accept", "text/event-stream")
            .json(request);
        if let Some(token) = &self.config.token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(map_http_status(status));
        }
        Ok(response)
    }
}

impl Default for FinBot {
    fn default() -> Self {
        Self::new()
    }
}

fn failed(error: ChatError) -> ChatOutcome {
    tracing::error!(error = %error, "chat request failed");
    ChatOutcome::Failed {
        error,
        partial: ReplySummary::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn default_config() {
        let client = FinBot::new();
        assert_eq!(client.config.base_url, DEFAULT_BASE_URL);
        assert_eq!(client.config.chat_path, DEFAULT_CHAT_PATH);
        assert!(client.config.token.is_none());
    }

    #[test]
    fn builder_overrides() {
        let client = FinBot::new()
            .base_url("http://localhost:9999")
            .chat_path("/v2/chat")
            .bearer_token("tok");
        assert_eq!(client.config.chat_url(), "http://localhost:9999/v2/chat");
        assert_eq!(client.config.token.as_deref(), Some("tok"));
    }

    #[test]
    fn chat_url_tolerates_trailing_slash() {
        let client = FinBot::new().base_url("http://localhost:9999/");
        assert_eq!(client.config.chat_url(), "http://localhost:9999/api/finbot/chat");
    }

    #[test]
    fn config_from_lookup() {
        let config = FinBotConfig::from_lookup(lookup(&[
            (ENV_BASE_URL, "https://api.example.com"),
            (ENV_TOKEN, "secret"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "https://api.example.com");
        assert_eq!(config.chat_path, DEFAULT_CHAT_PATH);
        assert_eq!(config.token.as_deref(), Some("secret"));
    }

    #[test]
    fn empty_token_is_ignored() {
        let config = FinBotConfig::from_lookup(lookup(&[(ENV_TOKEN, "")])).unwrap();
        assert!(config.token.is_none());
    }

    #[test]
    fn rejects_non_http_base_url() {
        let err = FinBotConfig::from_lookup(lookup(&[(ENV_BASE_URL, "ftp://x")])).unwrap_err();
        assert!(matches!(err, ChatError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_relative_chat_path() {
        let err = FinBotConfig::from_lookup(lookup(&[(ENV_CHAT_PATH, "chat")])).unwrap_err();
        assert!(err.to_string().contains(ENV_CHAT_PATH));
    }
}
