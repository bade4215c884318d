//! Error body returned by the API on rejected requests.

use serde::Deserialize;

/// The server sends either a single message or a list of validation messages
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ErrorMessage {
    Single(String),
    Many(Vec<String>),
}

/// Error body of a non-success response
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub message: Option<ErrorMessage>,
}

impl ErrorBody {
    /// Flatten the message into one displayable line, if any was sent
    pub fn into_message(self) -> Option<String> {
        let text = match self.message? {
            ErrorMessage::Single(text) => text,
            ErrorMessage::Many(lines) => lines.join("; "),
        };
        let text = text.trim().to_string();
        (!text.is_empty()).then_some(text)
    }
}
