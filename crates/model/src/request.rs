use serde::{Deserialize, Serialize};

/// A chat message request sent to the backend.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The user input text.
    pub message: String,
    /// Language code of the conversation.
    pub language: String,
    /// Identifier of the selected topic.
    pub topic: String,
    /// Whether the backend should summarize instead of answering. The chat
    /// view always sends `false`.
    pub summary: bool,
    /// The trailing turns that precede this message.
    pub chat_history: Vec<HistoryTurn>,
    /// Vector index of the bound document, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector_id: Option<String>,
}

/// The role of a turn as the backend spells it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Talker {
    /// A message produced by the chat view itself.
    System,
    /// A message typed by the user.
    Human,
    /// An answer from the backend.
    Ai,
}

/// A prior turn carried as conversational context.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HistoryTurn {
    /// The text of the turn.
    pub message: String,
    /// Who produced the turn.
    pub talker: Talker,
    /// UTC creation time, formatted as `yyyy-MM-dd HH:mm:ss.SSS`.
    pub interaction_date: String,
}

/// A support ticket submitted on behalf of the user.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TicketRequest {
    /// Name of the requester.
    pub name: String,
    /// Contact email of the requester.
    pub email: String,
    /// What the requester needs help with.
    pub description: String,
}

/// Whether a document lookup targets a single document or a whole topic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BindingKind {
    /// A single uploaded document.
    #[default]
    Document,
    /// A topic grouping several documents.
    Topic,
}

/// Parameters for fetching the metadata of a document or topic.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DocumentQuery {
    /// Identifier of the document or topic.
    pub document_id: String,
    /// What the identifier refers to.
    pub kind: BindingKind,
    /// The requesting user. Transports fall back to their configured
    /// identity when this is `None`.
    pub user_email: Option<String>,
}

/// Parameters for wiping the stored history of a document chat.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DeleteChatQuery {
    /// Identifier of the document whose chat should be deleted.
    pub document_id: String,
    /// The requesting user, see [`DocumentQuery::user_email`].
    pub user_email: Option<String>,
}
