//! Chat stream events and the frame decoder.
//!
//! The chat endpoint answers with newline-delimited frames:
//!
//! ```text
//! data: {"type":"text","content":"Merhaba"}
//!
//! data: {"type":"financialData","data":{"symbol":"THYAO","rsi":61.2}}
//!
//! data: {"type":"done","chatId":"abc123"}
//! ```
//!
//! Only lines starting with [`FRAME_PREFIX`] are frames. Everything else
//! (blank separators, `event:` lines, `:` comments) is ignored.

use serde_json::{Map, Value};

use crate::error::FrameError;

/// Marker that starts every frame line.
pub const FRAME_PREFIX: &str = "data: ";

/// One decoded frame of the chat stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// An incremental fragment of the assistant's reply.
    Text {
        /// Fragment to append to the running reply.
        content: String,
    },
    /// Structured analysis payload, passed through untouched.
    FinancialData {
        /// Opaque payload.
        data: Value,
    },
    /// End of the reply. Carries the conversation id the server assigned.
    Done {
        /// Conversation id, if the server sent one.
        chat_id: Option<String>,
    },
    /// The server aborted the reply.
    Error {
        /// Human-readable reason.
        message: String,
    },
}

impl Event {
    /// Decode a frame payload (the text after [`FRAME_PREFIX`]).
    pub fn from_json(payload: &str) -> Result<Self, FrameError> {
        let value: Value = serde_json::from_str(payload)
            .map_err(|e| FrameError::MalformedJson(e.to_string()))?;
        Self::from_value(value)
    }

    /// Decode an already-parsed JSON payload.
    ///
    /// Any object with a truthy `error` field is an [`Event::Error`],
    /// whatever its `type` says. `null`, `false`, `0` and `""` are not
    /// truthy and leave the frame to its `type`.
    pub fn from_value(value: Value) -> Result<Self, FrameError> {
        let Value::Object(mut obj) = value else {
            return Err(FrameError::NotAnObject);
        };

        if obj.get("error").is_some_and(is_truthy) {
            if let Some(err) = obj.remove("error") {
                return Ok(Self::Error {
                    message: error_message(err),
                });
            }
        }

        let kind = match obj.get("type").and_then(Value::as_str) {
            Some(kind) => kind.to_owned(),
            None => return Err(FrameError::MissingType),
        };

        match kind.as_str() {
            "text" => match obj.remove("content") {
                Some(Value::String(content)) => Ok(Self::Text { content }),
                _ => Err(FrameError::MissingField {
                    kind: "text",
                    field: "content",
                }),
            },
            "financialData" => obj
                .remove("data")
                .map(|data| Self::FinancialData { data })
                .ok_or(FrameError::MissingField {
                    kind: "financialData",
                    field: "data",
                }),
            "done" => Ok(Self::Done {
                chat_id: obj.remove("chatId").and_then(chat_id_string),
            }),
            "error" => Ok(Self::Error {
                message: match obj.remove("error").filter(|v| !v.is_null()) {
                    Some(err) => error_message(err),
                    None => message_field(&obj).unwrap_or_else(|| "unknown stream error".into()),
                },
            }),
            other => Err(FrameError::UnknownType(other.to_owned())),
        }
    }

    /// Encode this event as one wire frame, blank-line terminated.
    #[must_use]
    pub fn to_frame(&self) -> String {
        let payload = match self {
            Self::Text { content } => serde_json::json!({ "type": "text", "content": content }),
            Self::FinancialData { data } => {
                serde_json::json!({ "type": "financialData", "data": data })
            }
            Self::Done { chat_id } => serde_json::json!({ "type": "done", "chatId": chat_id }),
            Self::Error { message } => serde_json::json!({ "type": "error", "error": message }),
        };
        format!("{FRAME_PREFIX}{payload}\n\n")
    }
}

/// Decode one complete line of the stream.
///
/// Returns `None` for lines that are not frames, so callers can skip them
/// without treating them as failures.
pub fn decode_line(line: &str) -> Option<Result<Event, FrameError>> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    line.strip_prefix(FRAME_PREFIX).map(Event::from_json)
}

fn error_message(err: Value) -> String {
    match err {
        Value::String(s) => s,
        Value::Object(obj) => message_field(&obj).unwrap_or_else(|| Value::Object(obj).to_string()),
        other => other.to_string(),
    }
}

fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn message_field(obj: &Map<String, Value>) -> Option<String> {
    obj.get("message")
        .and_then(Value::as_str)
        .map(ToOwned::to_owned)
}

fn chat_id_string(v: Value) -> Option<String> {
    match v {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
