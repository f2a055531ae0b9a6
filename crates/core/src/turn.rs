//! Conversation turns.

use chrono::{DateTime, Utc};
use docchat_model::{HistoryTurn, Reference, Talker};

/// Who produced a turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Speaker {
    /// The chat view itself, e.g. the greeting of a bound document.
    System,
    /// The user.
    Human,
    /// The backend.
    Ai,
}

impl From<Speaker> for Talker {
    #[inline]
    fn from(speaker: Speaker) -> Self {
        match speaker {
            Speaker::System => Talker::System,
            Speaker::Human => Talker::Human,
            Speaker::Ai => Talker::Ai,
        }
    }
}

/// Escalation status of an answer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Escalation {
    pub(crate) offered: bool,
    pub(crate) description: String,
    pub(crate) ticket_id: Option<String>,
    pub(crate) acknowledged: bool,
}

impl Escalation {
    /// Whether the backend suggested turning this answer into a ticket.
    #[inline]
    pub fn offered(&self) -> bool {
        self.offered
    }

    /// The ticket description suggested by the backend.
    #[inline]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Identifier of the ticket created for this answer.
    #[inline]
    pub fn ticket_id(&self) -> Option<&str> {
        self.ticket_id.as_deref()
    }

    /// Whether a ticket was created for this answer.
    #[inline]
    pub fn acknowledged(&self) -> bool {
        self.acknowledged
    }
}

/// One message unit in a conversation.
#[derive(Clone, Debug, PartialEq)]
pub struct ChatTurn {
    pub(crate) text: String,
    pub(crate) speaker: Speaker,
    pub(crate) timestamp: DateTime<Utc>,
    pub(crate) is_pending: bool,
    pub(crate) references: Option<Vec<Reference>>,
    pub(crate) escalation: Option<Escalation>,
}

impl ChatTurn {
    fn new(text: String, speaker: Speaker, timestamp: DateTime<Utc>) -> Self {
        Self {
            text,
            speaker,
            timestamp,
            is_pending: false,
            references: None,
            escalation: None,
        }
    }

    /// Creates a turn produced by the chat view.
    #[inline]
    pub fn system<S: Into<String>>(text: S, timestamp: DateTime<Utc>) -> Self {
        Self::new(text.into(), Speaker::System, timestamp)
    }

    /// Creates a turn typed by the user.
    #[inline]
    pub fn human<S: Into<String>>(text: S, timestamp: DateTime<Utc>) -> Self {
        Self::new(text.into(), Speaker::Human, timestamp)
    }

    /// Creates the placeholder of an answer that hasn't arrived yet.
    #[inline]
    pub fn pending_ai<S: Into<String>>(
        loading: S,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            is_pending: true,
            ..Self::new(loading.into(), Speaker::Ai, timestamp)
        }
    }

    /// Returns the text of this turn.
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns who produced this turn.
    #[inline]
    pub fn speaker(&self) -> Speaker {
        self.speaker
    }

    /// Returns when this turn was created.
    #[inline]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Whether this is an answer still waiting for the backend.
    #[inline]
    pub fn is_pending(&self) -> bool {
        self.is_pending
    }

    /// Sources cited by a resolved answer.
    #[inline]
    pub fn references(&self) -> Option<&[Reference]> {
        self.references.as_deref()
    }

    /// Escalation status, set only on answers.
    #[inline]
    pub fn escalation(&self) -> Option<&Escalation> {
        self.escalation.as_ref()
    }

    /// Whether the backend suggested escalating this turn.
    #[inline]
    pub fn escalation_offered(&self) -> bool {
        self.escalation.as_ref().is_some_and(|e| e.offered)
    }

    /// Converts this turn into the shape the backend expects as history.
    pub fn to_history(&self) -> HistoryTurn {
        HistoryTurn {
            message: self.text.clone(),
            talker: self.speaker.into(),
            interaction_date: self
                .timestamp
                .format("%Y-%m-%d %H:%M:%S%.3f")
                .to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_history_date_has_millis() {
        let at = Utc
            .with_ymd_and_hms(2026, 1, 2, 3, 4, 5)
            .unwrap()
            .checked_add_signed(chrono::TimeDelta::milliseconds(6))
            .unwrap();
        let history = ChatTurn::human("hola", at).to_history();
        assert_eq!(history.interaction_date, "2026-01-02 03:04:05.006");
        assert_eq!(history.talker, Talker::Human);
        assert_eq!(history.message, "hola");
    }

    #[test]
    fn test_only_placeholders_are_pending() {
        let now = Utc::now();
        assert!(ChatTurn::pending_ai("...", now).is_pending());
        assert!(!ChatTurn::human("hola", now).is_pending());
        assert!(!ChatTurn::system("hi", now).escalation_offered());
    }
}
