//! The document or topic the conversation is bound to.

use chrono::{DateTime, Utc};
use docchat_model::DocumentInfo;

use crate::escalation::EscalationWorkflow;
use crate::exchange::ExchangeCoordinator;
use crate::locale::Locale;
use crate::store::MessageStore;
use crate::turn::ChatTurn;

/// A document the user chats with.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct BoundDocument {
    /// Identifier of the document.
    pub id: String,
    /// Display name shown in the greeting.
    pub alias: String,
    /// Vector index forwarded with every question.
    pub vector_id: Option<String>,
}

impl BoundDocument {
    /// Builds a bound document from the metadata the backend returned.
    pub fn from_info<S: Into<String>>(id: S, info: DocumentInfo) -> Self {
        Self {
            id: id.into(),
            alias: info.alias,
            vector_id: info.vector_id,
        }
    }
}

/// The active binding of a conversation.
///
/// The selection is owned by the host; the session only sees it through
/// [`crate::ChatSession::bind`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ConversationContext {
    /// Identifier of the selected topic.
    pub topic_id: String,
    /// Display name of the selected topic.
    pub topic_name: String,
    /// Language code, e.g. `spanish` or `english`.
    pub language_code: String,
    /// The bound document, if any.
    pub document: Option<BoundDocument>,
}

impl ConversationContext {
    /// Returns the identifier of the bound document.
    #[inline]
    pub fn document_id(&self) -> Option<&str> {
        self.document.as_ref().map(|doc| doc.id.as_str())
    }

    /// Returns the vector index of the bound document.
    #[inline]
    pub fn vector_id(&self) -> Option<&str> {
        self.document.as_ref().and_then(|doc| doc.vector_id.as_deref())
    }

    /// Returns the locale of this conversation.
    #[inline]
    pub fn locale(&self) -> Locale {
        Locale::from_code(&self.language_code)
    }
}

/// What a [`ContextBinder::bind`] call did.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BindOutcome {
    /// The document didn't change, only the context fields were updated.
    Kept,
    /// The store was reset to a new generation.
    Reset {
        /// The new generation.
        generation: u64,
    },
}

/// Resets the conversation whenever the bound document changes.
#[derive(Clone, Debug, Default)]
pub struct ContextBinder {
    current: ConversationContext,
}

impl ContextBinder {
    /// Returns the active context.
    #[inline]
    pub fn context(&self) -> &ConversationContext {
        &self.current
    }

    /// Makes `context` the active binding.
    ///
    /// If its document differs from the previous one (binding or unbinding
    /// included), the store is reset: to a single greeting turn when a
    /// document is bound, or to nothing otherwise. The pending exchange and
    /// the ticket dialog belong to the old conversation and are cancelled.
    pub fn bind(
        &mut self,
        context: ConversationContext,
        store: &mut MessageStore,
        exchange: &mut ExchangeCoordinator,
        escalation: &mut EscalationWorkflow,
        now: DateTime<Utc>,
    ) -> BindOutcome {
        let changed = context.document_id() != self.current.document_id();
        self.current = context;
        if !changed {
            return BindOutcome::Kept;
        }

        let seed = self.greeting(now);
        let generation = reset_conversation(store, exchange, escalation, seed);
        debug!(
            "bound document {:?}, generation {generation}",
            self.current.document_id()
        );
        BindOutcome::Reset { generation }
    }

    /// Starts the conversation over on the bound document, seeding a fresh
    /// greeting. Returns the new generation.
    pub fn reload(
        &self,
        store: &mut MessageStore,
        exchange: &mut ExchangeCoordinator,
        escalation: &mut EscalationWorkflow,
        now: DateTime<Utc>,
    ) -> u64 {
        let generation =
            reset_conversation(store, exchange, escalation, self.greeting(now));
        debug!(
            "reloaded document {:?}, generation {generation}",
            self.current.document_id()
        );
        generation
    }

    /// Forgets the topic and the document, and empties the store.
    pub fn clear(
        &mut self,
        store: &mut MessageStore,
        exchange: &mut ExchangeCoordinator,
        escalation: &mut EscalationWorkflow,
    ) -> u64 {
        self.current = ConversationContext {
            language_code: std::mem::take(&mut self.current.language_code),
            ..Default::default()
        };
        reset_conversation(store, exchange, escalation, None)
    }

    fn greeting(&self, now: DateTime<Utc>) -> Option<ChatTurn> {
        self.current.document.as_ref().map(|doc| {
            ChatTurn::system(
                self.current.locale().document_greeting(&doc.alias),
                now,
            )
        })
    }
}

fn reset_conversation(
    store: &mut MessageStore,
    exchange: &mut ExchangeCoordinator,
    escalation: &mut EscalationWorkflow,
    seed: Option<ChatTurn>,
) -> u64 {
    exchange.cancel();
    escalation.reset();
    store.reset(seed)
}
