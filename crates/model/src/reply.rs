use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A source the backend cited for an answer.
///
/// References are rendered by the view as they are, so they're kept as raw
/// JSON values.
pub type Reference = Value;

/// The backend answer to a [`crate::ChatRequest`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    /// The rendered answer text.
    pub message: String,
    /// Sources cited by the answer.
    #[serde(default)]
    pub references: Vec<Reference>,
    /// Set when the backend could not resolve the question and suggests
    /// escalating it to a support ticket.
    #[serde(default)]
    pub create_ticket: bool,
    /// Suggested ticket description, meaningful only with `create_ticket`.
    #[serde(default)]
    pub description: String,
}

/// The backend answer to a [`crate::TicketRequest`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TicketReceipt {
    /// Identifier of the created ticket.
    pub response: String,
}
