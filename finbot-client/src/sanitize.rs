//! Outgoing prompt cleanup.

use finbot_types::ChatError;

/// Default upper bound on prompt length, in characters.
pub const DEFAULT_MAX_PROMPT_CHARS: usize = 4000;

/// Cleans a user prompt before it is sent.
///
/// Strips control characters (keeping newlines and tabs), squeezes runs of
/// blank lines down to one, trims the ends, and rejects prompts that are
/// too long or end up empty.
#[derive(Debug, Clone)]
pub struct PromptSanitizer {
    max_chars: usize,
}

impl Default for PromptSanitizer {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_PROMPT_CHARS,
        }
    }
}

impl PromptSanitizer {
    /// A sanitizer with a custom length limit.
    #[must_use]
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    /// The configured length limit.
    #[must_use]
    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Clean `input`, or explain why it cannot be sent.
    pub fn sanitize(&self, input: &str) -> Result<String, ChatError> {
        let len = input.chars().count();
        if len > self.max_chars {
            return Err(ChatError::InvalidMessage(format!(
                "message is {len} characters, limit is {}",
                self.max_chars
            )));
        }

        let stripped: String = input
            .chars()
            .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
            .collect();

        let mut cleaned = String::with_capacity(stripped.len());
        let mut blank_run = 0;
        for line in stripped.lines() {
            if line.trim().is_empty() {
                blank_run += 1;
                if blank_run > 1 {
                    continue;
                }
            } else {
                blank_run = 0;
            }
            if !cleaned.is_empty() {
                cleaned.push('\n');
            }
            cleaned.push_str(line.trim_end());
        }

        let cleaned = cleaned.trim();
        if cleaned.is_empty() {
            return Err(ChatError::InvalidMessage("message is empty".into()));
        }
        Ok(cleaned.to_owned())
    }
}
