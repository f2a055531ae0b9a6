use docchat_model::{ChatReply, Reference};
use serde::{Deserialize, Serialize};

/// The preset answer for one chat request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetReply {
    /// Answer text.
    pub message: String,
    /// Cited sources.
    #[serde(default)]
    pub references: Vec<Reference>,
    /// If set, the answer offers an escalation with this description.
    #[serde(default)]
    pub escalation: Option<String>,
}

impl PresetReply {
    /// Creates a plain answer.
    #[inline]
    pub fn answer<S: Into<String>>(message: S) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    /// Attaches cited sources.
    #[inline]
    pub fn with_references(
        mut self,
        references: impl Into<Vec<Reference>>,
    ) -> Self {
        self.references = references.into();
        self
    }

    /// Makes the answer offer a support ticket.
    #[inline]
    pub fn with_escalation<S: Into<String>>(mut self, description: S) -> Self {
        self.escalation = Some(description.into());
        self
    }
}

impl From<PresetReply> for ChatReply {
    fn from(preset: PresetReply) -> Self {
        let create_ticket = preset.escalation.is_some();
        ChatReply {
            message: preset.message,
            references: preset.references,
            create_ticket,
            description: preset.escalation.unwrap_or_default(),
        }
    }
}
