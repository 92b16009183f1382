//! Internal error helpers for mapping HTTP/reqwest errors to [`ChatError`].

use finbot_types::ChatError;

/// Map a non-success HTTP status to a [`ChatError`].
///
/// The body is left unread: a failed request never consumes
/// any part of the stream.
pub(crate) fn map_http_status(status: reqwest::StatusCode) -> ChatError {
    ChatError::Http {
        status: status.as_u16(),
    }
}

/// Map a [`reqwest::Error`] raised while sending to a [`ChatError`].
pub(crate) fn map_reqwest_error(err: reqwest::Error) -> ChatError {
    if err.is_builder() {
        ChatError::InvalidConfig(err.to_string())
    } else {
        ChatError::Network(Box::new(err))
    }
}
