//! Shared domain types used across the triage crates.

use std::borrow::Borrow;
use std::fmt;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

// =============================================================================
// SessionToken
// =============================================================================

/// Opaque, URL-safe identifier for one conversation.
///
/// Immutable once issued. Safe to place in a cookie or header value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short prefix suitable for log output.
    pub fn redacted(&self) -> &str {
        let end = self
            .0
            .char_indices()
            .nth(6)
            .map(|(i, _)| i)
            .unwrap_or(self.0.len());
        &self.0[..end]
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SessionToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for SessionToken {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// Stage
// =============================================================================

/// Conversation progress for a session.
///
/// Ordered: a session only moves forward until it is explicitly reset for
/// a new diagnostic cycle.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Stage {
    /// Newly created, awaiting symptoms.
    #[default]
    New = 0,
    /// At least one symptom gathered.
    Collecting = 1,
    /// A diagnosis and recommendation were issued.
    Diagnosed = 2,
}

impl Stage {
    /// Integer stage code.
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Stage::New),
            1 => Some(Stage::Collecting),
            2 => Some(Stage::Diagnosed),
            _ => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::New => "new",
            Stage::Collecting => "collecting",
            Stage::Diagnosed => "diagnosed",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Chat transcript
// =============================================================================

/// Who authored a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One entry in a session transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    pub created_at: DateTime<Local>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
            created_at: Local::now(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
            created_at: Local::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_stage_ordering() {
        assert!(Stage::New < Stage::Collecting);
        assert!(Stage::Collecting < Stage::Diagnosed);
    }

    #[test]
    fn test_stage_codes_roundtrip() {
        for stage in [Stage::New, Stage::Collecting, Stage::Diagnosed] {
            assert_eq!(Stage::from_code(stage.code()), Some(stage));
        }
        assert_eq!(Stage::New.code(), 0);
        assert_eq!(Stage::from_code(7), None);
    }

    #[test]
    fn test_stage_serde_snake_case() {
        let json = serde_json::to_string(&Stage::Collecting).unwrap();
        assert_eq!(json, "\"collecting\"");
    }

    #[test]
    fn test_token_lookup_by_str() {
        let mut map = HashMap::new();
        map.insert(SessionToken::new("abcdefghij"), 1);
        assert_eq!(map.get("abcdefghij"), Some(&1));
    }

    #[test]
    fn test_token_redacted_prefix() {
        assert_eq!(SessionToken::new("abcdefghij").redacted(), "abcdef");
        assert_eq!(SessionToken::new("abc").redacted(), "abc");
    }

    #[test]
    fn test_token_serializes_as_plain_string() {
        let json = serde_json::to_string(&SessionToken::new("tok")).unwrap();
        assert_eq!(json, "\"tok\"");
    }

    #[test]
    fn test_chat_message_roles() {
        assert_eq!(ChatMessage::user("hi").role, ChatRole::User);
        assert_eq!(ChatMessage::assistant("hello").role, ChatRole::Assistant);
    }
}
