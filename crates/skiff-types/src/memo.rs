use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Maximum byte length of a stellar text memo.
pub const MAX_TEXT_MEMO_BYTES: usize = 28;

/// A validated stellar transaction memo. Only one kind can be attached at a
/// time, so setting a text memo after an id memo replaces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Memo {
    Text(String),
    Id(u64),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MemoError {
    #[error("text memo is {0} bytes, limit is {MAX_TEXT_MEMO_BYTES}")]
    TextTooLong(usize),

    #[error("id memo {0} exceeds the signed 64-bit range")]
    IdOutOfRange(u64),
}

impl Memo {
    /// Validates a text memo against the 28 byte limit. The limit counts
    /// UTF-8 bytes, not characters.
    pub fn text(value: impl Into<String>) -> Result<Self, MemoError> {
        let value = value.into();
        let len = value.len();
        if len > MAX_TEXT_MEMO_BYTES {
            return Err(MemoError::TextTooLong(len));
        }

        Ok(Memo::Text(value))
    }

    pub fn id(value: u64) -> Result<Self, MemoError> {
        if value > i64::MAX as u64 {
            return Err(MemoError::IdOutOfRange(value));
        }

        Ok(Memo::Id(value))
    }
}

impl Display for Memo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Memo::Text(text) => write!(f, "{text}"),
            Memo::Id(id) => write!(f, "{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_text_at_limit() {
        let text = "a".repeat(28);
        assert_eq!(Memo::text(text.clone()), Ok(Memo::Text(text)));
    }

    #[test]
    fn test_text_over_limit() {
        let text = "a".repeat(29);
        assert_eq!(Memo::text(text), Err(MemoError::TextTooLong(29)));
    }

    #[test]
    fn test_limit_counts_bytes_not_chars() {
        // 15 chars but 30 bytes
        let text = "é".repeat(15);
        assert_eq!(text.chars().count(), 15);
        assert!(Memo::text(text).is_err());
    }

    #[test]
    fn test_id_range() {
        assert!(Memo::id(i64::MAX as u64).is_ok());
        assert!(Memo::id(i64::MAX as u64 + 1).is_err());
    }
}
