mod builder;
mod state;

use docchat_actor::Actor;
use docchat_model::{DeleteChatQuery, DocumentQuery};
use serde_json::Value;

use crate::backend_client::BackendClient;
use crate::context::{BindOutcome, BoundDocument, ConversationContext};
use crate::error::{Error, Rejection, TransportError};
use crate::escalation::{EscalationState, FieldErrors, TicketDraft};
use crate::turn::ChatTurn;
pub use builder::ChatSessionBuilder;
use state::SessionState;

/// Something that happened in the session without a caller waiting for
/// it, typically the settlement of a backend request.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    /// The conversation was reset to a new generation.
    ConversationReset {
        /// The new generation.
        generation: u64,
    },
    /// An answer replaced its placeholder.
    ExchangeResolved {
        /// Index of the answer turn.
        index: usize,
        /// Whether the answer offers an escalation.
        escalation_offered: bool,
    },
    /// A chat request failed and its placeholder was removed.
    ExchangeFailed {
        /// Why the request failed.
        error: TransportError,
    },
    /// A ticket was created for the turn at `index`.
    TicketCreated {
        /// Index of the escalated turn.
        index: usize,
        /// Identifier of the ticket.
        ticket_id: String,
    },
    /// A ticket submission failed; the draft is kept.
    TicketFailed {
        /// Why the request failed.
        error: TransportError,
    },
    /// A result for an outdated conversation was discarded.
    StaleDiscarded {
        /// Generation the result was issued for.
        generation: u64,
    },
}

/// What the view needs to render the session.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionSnapshot {
    /// The turns of the conversation, oldest first.
    pub turns: Vec<ChatTurn>,
    /// The current store generation.
    pub generation: u64,
    /// Whether sending is blocked by a pending exchange.
    pub sending_blocked: bool,
    /// The input buffer.
    pub input: String,
    /// Placeholder of the input box, set when no topic is selected.
    pub input_placeholder: Option<&'static str>,
    /// The active binding.
    pub context: ConversationContext,
    /// State of the ticket dialog.
    pub escalation: EscalationState,
    /// Content of the ticket dialog while it's open.
    pub draft: Option<TicketDraft>,
}

/// A chat session over one document or topic at a time.
///
/// The session owns the conversation exclusively. Every operation is
/// handled by a single event loop in the order it was issued, and backend
/// requests never block that loop: their results come back as events that
/// are reconciled against the conversation they were issued in.
#[derive(Clone)]
pub struct ChatSession {
    actor: Actor<SessionState>,
    client: BackendClient,
}

impl ChatSession {
    /// Binds the session to `context`.
    ///
    /// Changing the document resets the conversation and cancels whatever
    /// was in flight for the previous one.
    pub async fn bind(
        &self,
        context: ConversationContext,
    ) -> Result<BindOutcome, Error> {
        Ok(self
            .actor
            .ask(move |state, _| state.bind(context))
            .await?)
    }

    /// Looks up a document and binds the session to it.
    ///
    /// `context` carries the topic and language; its document is replaced
    /// by the one fetched from the backend. Documents that are not ready
    /// are refused.
    pub async fn select_document(
        &self,
        query: DocumentQuery,
        mut context: ConversationContext,
    ) -> Result<BindOutcome, Error> {
        let info = self.client.fetch_document(&query).await?;
        if !info.status {
            info!("document {} is not active yet", query.document_id);
            return Err(Rejection::DocumentInactive.into());
        }
        context.document =
            Some(BoundDocument::from_info(query.document_id, info));
        self.bind(context).await
    }

    /// Replaces the input buffer.
    pub async fn set_input<S: Into<String>>(
        &self,
        text: S,
    ) -> Result<(), Error> {
        let text = text.into();
        Ok(self
            .actor
            .ask(move |state, _| state.exchange.set_input(text))
            .await?)
    }

    /// Sends `text` as a question.
    ///
    /// Returns once the question and its placeholder are in the
    /// conversation; the answer arrives later as a [`SessionEvent`].
    pub async fn send_message<S: Into<String>>(
        &self,
        text: S,
    ) -> Result<(), Error> {
        let text = text.into();
        self.actor
            .ask(move |state, actor| state.send(&text, actor))
            .await?
    }

    /// Sends the content of the input buffer, see [`Self::send_message`].
    pub async fn send_input(&self) -> Result<(), Error> {
        self.actor
            .ask(|state, actor| {
                let text = state.exchange.input().to_owned();
                state.send(&text, actor)
            })
            .await?
    }

    /// Opens the ticket dialog for the turn at `index`.
    pub async fn open_escalation(
        &self,
        index: usize,
    ) -> Result<TicketDraft, Error> {
        self.actor
            .ask(move |state, _| state.open_escalation(index))
            .await?
    }

    /// Edits the open ticket draft and returns the fields that are still
    /// invalid.
    pub async fn edit_draft<F>(&self, edit: F) -> Result<FieldErrors, Error>
    where
        F: FnOnce(&mut TicketDraft) + Send + 'static,
    {
        self.actor
            .ask(move |state, _| -> Result<FieldErrors, Error> {
                let draft = state.escalation.draft_mut()?;
                edit(draft);
                Ok(draft.validate())
            })
            .await?
    }

    /// Submits the open ticket draft.
    ///
    /// Returns once the submission is dispatched; the result arrives later
    /// as a [`SessionEvent`].
    pub async fn submit_ticket(&self) -> Result<(), Error> {
        self.actor
            .ask(|state, actor| state.submit_ticket(actor))
            .await?
    }

    /// Closes the ticket dialog without submitting.
    pub async fn dismiss_escalation(&self) -> Result<(), Error> {
        self.actor
            .ask(|state, _| state.escalation.dismiss().map_err(Error::from))
            .await?
    }

    /// Copies the turn at `index` together with the question before it to
    /// the clipboard, and returns the copied text.
    pub async fn copy_answer(&self, index: usize) -> Result<String, Error> {
        self.actor
            .ask(move |state, _| state.copy_answer(index))
            .await?
    }

    /// Starts the conversation over on the bound document and returns the
    /// new generation. Whatever was in flight is discarded.
    pub async fn reload(&self) -> Result<u64, Error> {
        Ok(self.actor.ask(|state, _| state.reload()).await?)
    }

    /// Forgets the topic and the conversation.
    pub async fn clear(&self) -> Result<(), Error> {
        Ok(self.actor.ask(|state, _| state.clear()).await?)
    }

    /// Forgets the topic and the conversation, then asks the host to go
    /// back to the topic selection.
    pub async fn step_back(&self) -> Result<(), Error> {
        Ok(self
            .actor
            .ask(|state, _| {
                state.clear();
                state.sinks.step_back();
            })
            .await?)
    }

    /// Returns what the view needs to render the session.
    pub async fn snapshot(&self) -> Result<SessionSnapshot, Error> {
        Ok(self.actor.ask(|state, _| state.snapshot()).await?)
    }

    /// Lists the documents of a topic.
    pub async fn list_topic_documents(
        &self,
        topic_id: &str,
    ) -> Result<Value, Error> {
        Ok(self.client.list_topic_documents(topic_id).await?)
    }

    /// Lists the suggested prompts.
    pub async fn list_prompts(&self, body: &Value) -> Result<Value, Error> {
        Ok(self.client.list_prompts(body).await?)
    }

    /// Shares a question and its answer.
    pub async fn share_questions(&self, body: &Value) -> Result<Value, Error> {
        Ok(self.client.share_questions(body).await?)
    }

    /// Deletes the stored chat of a document.
    pub async fn delete_chat(
        &self,
        query: DeleteChatQuery,
    ) -> Result<Value, Error> {
        Ok(self.client.delete_chat(&query).await?)
    }

    /// Stops the session loop. Pending results are dropped.
    #[inline]
    pub fn close(&self) {
        self.actor.try_kill();
    }
}
