//! Conversation sessions and append-only history.
//!
//! A session is a logical conversation identity holding one history across
//! turns. History is append-only and shared by reference within a session;
//! it is mutated exactly once per turn, when the final reply is known.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Speaker of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Assistant,
}

/// One recorded message within a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: Speaker,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// Ordered, append-only record of prior turns in one session.
///
/// Never truncated automatically; callers that need a bound must manage
/// session lifetime themselves.
#[derive(Debug, Clone, Default)]
pub struct ConversationHistory {
    turns: Vec<Turn>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a completed query/reply exchange.
    ///
    /// This is the only mutation point; it runs at the end of a turn so the
    /// history always reflects the reply that was actually returned.
    pub fn record_exchange(&mut self, query: &str, reply: &str) {
        let now = Utc::now();
        self.turns.push(Turn {
            role: Speaker::User,
            text: query.to_string(),
            timestamp: now,
        });
        self.turns.push(Turn {
            role: Speaker::Assistant,
            text: reply.to_string(),
            timestamp: now,
        });
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Render the most recent turns as plain `role: text` lines.
    ///
    /// Used to thread conversation context into classification prompts.
    pub fn recent_lines(&self, max_turns: usize) -> String {
        let start = self.turns.len().saturating_sub(max_turns);
        self.turns[start..]
            .iter()
            .map(|t| {
                let role = match t.role {
                    Speaker::User => "user",
                    Speaker::Assistant => "assistant",
                };
                format!("{}: {}", role, t.text)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A logical conversation identity holding one history across turns.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub history: ConversationHistory,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

impl Session {
    /// Create a fresh session with an empty history.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            history: ConversationHistory::new(),
            created_at: now,
            last_active: now,
        }
    }

    /// Mark the session as active now.
    pub fn touch(&mut self) {
        self.last_active = Utc::now();
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Listing entry for the sessions API.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
    pub turn_count: usize,
}

impl SessionSummary {
    pub fn of(session: &Session) -> Self {
        Self {
            id: session.id,
            created_at: session.created_at,
            last_active: session.last_active,
            turn_count: session.history.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_exchange_appends_pair() {
        let mut history = ConversationHistory::new();
        history.record_exchange("hello", "hi there");

        assert_eq!(history.len(), 2);
        assert_eq!(history.turns()[0].role, Speaker::User);
        assert_eq!(history.turns()[0].text, "hello");
        assert_eq!(history.turns()[1].role, Speaker::Assistant);
        assert_eq!(history.turns()[1].text, "hi there");
    }

    #[test]
    fn test_history_preserves_order() {
        let mut history = ConversationHistory::new();
        history.record_exchange("first", "one");
        history.record_exchange("second", "two");

        let texts: Vec<_> = history.turns().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "one", "second", "two"]);
    }

    #[test]
    fn test_recent_lines_caps_turns() {
        let mut history = ConversationHistory::new();
        history.record_exchange("a", "b");
        history.record_exchange("c", "d");

        let lines = history.recent_lines(2);
        assert_eq!(lines, "user: c\nassistant: d");
    }

    #[test]
    fn test_recent_lines_empty_history() {
        let history = ConversationHistory::new();
        assert_eq!(history.recent_lines(10), "");
    }

    #[test]
    fn test_new_session_is_empty() {
        let session = Session::new();
        assert!(session.history.is_empty());
        assert_eq!(session.created_at, session.last_active);
    }

    #[test]
    fn test_summary_counts_turns() {
        let mut session = Session::new();
        session.history.record_exchange("q", "r");
        let summary = SessionSummary::of(&session);
        assert_eq!(summary.id, session.id);
        assert_eq!(summary.turn_count, 2);
    }
}
