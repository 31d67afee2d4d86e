//! Alert memo handling
//!
//! The covert alert carries a short marker memo so the trusted recipient
//! can recognize it. Enforces UTF-8 content and the 512-byte on-chain limit.

use crate::{Error, Result};

/// Maximum memo length in bytes
pub const MAX_MEMO_LENGTH: usize = 512;

/// Memo carried by an alert transaction
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum Memo {
    /// Empty memo (no data)
    #[default]
    Empty,
    /// Text memo (UTF-8 string)
    Text(String),
}

impl Memo {
    /// Create a text memo with strict validation.
    pub fn from_text(text: String) -> Result<Self> {
        if text.is_empty() {
            return Ok(Memo::Empty);
        }

        if !Self::is_valid_memo_text(&text) {
            return Err(Error::InvalidMemo(
                "Memo contains control characters".to_string(),
            ));
        }

        if text.len() > MAX_MEMO_LENGTH {
            return Err(Error::MemoTooLong(format!(
                "Memo is {} bytes, maximum is {} bytes",
                text.len(),
                MAX_MEMO_LENGTH
            )));
        }

        Ok(Memo::Text(text))
    }

    /// Create a text memo, truncating and filtering instead of failing.
    pub fn from_text_truncated(text: String) -> Self {
        let filtered: String = text
            .chars()
            .filter(|c| *c == '\n' || *c == '\t' || *c == '\r' || !c.is_control())
            .collect();

        let mut truncated = String::new();
        for c in filtered.chars() {
            if truncated.len() + c.len_utf8() > MAX_MEMO_LENGTH {
                break;
            }
            truncated.push(c);
        }

        if truncated.is_empty() {
            Memo::Empty
        } else {
            Memo::Text(truncated)
        }
    }

    fn is_valid_memo_text(text: &str) -> bool {
        text.chars()
            .all(|c| c == '\n' || c == '\t' || c == '\r' || !c.is_control())
    }

    /// Check if memo is empty.
    pub fn is_empty(&self) -> bool {
        matches!(self, Memo::Empty)
    }

    /// Byte length of memo content.
    pub fn byte_len(&self) -> usize {
        match self {
            Memo::Empty => 0,
            Memo::Text(text) => text.len(),
        }
    }

    /// Get as string (if text memo).
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Memo::Text(text) => Some(text),
            Memo::Empty => None,
        }
    }
}

impl From<&str> for Memo {
    fn from(text: &str) -> Self {
        Memo::from_text(text.to_string()).unwrap_or(Memo::Empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_memo() {
        let memo = Memo::from_text(String::new()).unwrap();
        assert!(memo.is_empty());
        assert_eq!(memo.byte_len(), 0);
    }

    #[test]
    fn test_text_memo() {
        let memo = Memo::from_text("duress alert".to_string()).unwrap();
        assert_eq!(memo.as_str(), Some("duress alert"));
        assert_eq!(memo.byte_len(), 12);
    }

    #[test]
    fn test_memo_too_long() {
        let long = "A".repeat(MAX_MEMO_LENGTH + 1);
        assert!(Memo::from_text(long).is_err());
    }

    #[test]
    fn test_control_characters_rejected() {
        assert!(Memo::from_text("bad\u{0000}memo".to_string()).is_err());
        assert!(Memo::from_text("ok\nmemo".to_string()).is_ok());
    }

    #[test]
    fn test_truncated_respects_utf8_boundary() {
        let text = "é".repeat(MAX_MEMO_LENGTH);
        let memo = Memo::from_text_truncated(text);
        assert!(memo.byte_len() <= MAX_MEMO_LENGTH);
        assert!(!memo.is_empty());
    }
}
