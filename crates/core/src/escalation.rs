//! Escalation of unresolved answers into support tickets.

mod form;

use docchat_model::{TicketReceipt, TicketRequest};

use crate::error::{Error, Rejection, TransportError};
use crate::store::MessageStore;
pub use form::{FieldError, FieldErrors, TicketDraft, TicketField};

/// State of the ticket dialog.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EscalationState {
    /// No dialog is open.
    #[default]
    Closed,
    /// The user is filling in the form.
    Drafting,
    /// The ticket is being submitted.
    Submitting,
}

#[derive(Clone, Debug)]
struct Dialog {
    target: usize,
    generation: u64,
    draft: TicketDraft,
    submitting: bool,
}

/// A ticket the caller must submit to the backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Submission {
    /// The store generation the dialog was opened in.
    pub generation: u64,
    /// Index of the turn being escalated.
    pub target: usize,
    /// The request payload.
    pub request: TicketRequest,
}

/// How a ticket submission ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TicketSettlement {
    /// The ticket was created and recorded on the turn. The dialog is
    /// closed.
    Created {
        /// Index of the escalated turn.
        target: usize,
        /// Identifier of the ticket.
        ticket_id: String,
    },
    /// The submission failed. The dialog is back to drafting with the
    /// draft untouched.
    Failed {
        /// Index of the escalated turn.
        target: usize,
        /// Why the request failed.
        error: TransportError,
    },
    /// The conversation was reset while the ticket was in flight.
    Stale {
        /// Generation the submission was issued for.
        generation: u64,
    },
}

/// The ticket dialog state machine.
///
/// The workflow only ever touches the escalation status of the turn it
/// was opened for, never the structure of the store.
#[derive(Clone, Debug, Default)]
pub struct EscalationWorkflow {
    dialog: Option<Dialog>,
}

impl EscalationWorkflow {
    /// Returns the current state.
    pub fn state(&self) -> EscalationState {
        match &self.dialog {
            None => EscalationState::Closed,
            Some(Dialog {
                submitting: false, ..
            }) => EscalationState::Drafting,
            Some(Dialog {
                submitting: true, ..
            }) => EscalationState::Submitting,
        }
    }

    /// Returns the turn index the dialog was opened for.
    #[inline]
    pub fn target(&self) -> Option<usize> {
        self.dialog.as_ref().map(|dialog| dialog.target)
    }

    /// Returns the draft while the dialog is open.
    #[inline]
    pub fn draft(&self) -> Option<&TicketDraft> {
        self.dialog.as_ref().map(|dialog| &dialog.draft)
    }

    /// Returns the draft for editing. Editing is refused while the ticket
    /// is being submitted.
    pub fn draft_mut(&mut self) -> Result<&mut TicketDraft, Rejection> {
        match &mut self.dialog {
            None => Err(Rejection::DialogClosed),
            Some(dialog) if dialog.submitting => {
                Err(Rejection::SubmissionPending)
            }
            Some(dialog) => Ok(&mut dialog.draft),
        }
    }

    /// Opens the dialog for the turn at `index`, prefilled with the
    /// description the backend suggested.
    ///
    /// Opening while drafting starts over for the new turn.
    pub fn open_for(
        &mut self,
        store: &MessageStore,
        index: usize,
    ) -> Result<&TicketDraft, Rejection> {
        if self.state() == EscalationState::Submitting {
            return Err(Rejection::SubmissionPending);
        }
        let Some(escalation) = store
            .get(index)
            .and_then(|turn| turn.escalation())
            .filter(|escalation| escalation.offered())
        else {
            return Err(Rejection::NoEscalationOffer);
        };

        let draft = TicketDraft::with_description(escalation.description());
        let dialog = self.dialog.insert(Dialog {
            target: index,
            generation: store.generation(),
            draft,
            submitting: false,
        });
        debug!("ticket dialog opened for turn {index}");
        Ok(&dialog.draft)
    }

    /// Validates the draft and moves to submitting.
    pub fn begin_submit(&mut self) -> Result<Submission, Error> {
        let Some(dialog) = &mut self.dialog else {
            return Err(Rejection::DialogClosed.into());
        };
        if dialog.submitting {
            return Err(Rejection::SubmissionPending.into());
        }
        let errors = dialog.draft.validate();
        if !errors.is_empty() {
            return Err(Error::Validation(errors));
        }

        dialog.submitting = true;
        Ok(Submission {
            generation: dialog.generation,
            target: dialog.target,
            request: dialog.draft.to_request(),
        })
    }

    /// Applies the result of the submission issued for `generation`.
    pub fn settle(
        &mut self,
        store: &mut MessageStore,
        generation: u64,
        result: Result<TicketReceipt, TransportError>,
    ) -> TicketSettlement {
        let target = match &self.dialog {
            Some(dialog)
                if dialog.submitting
                    && dialog.generation == generation
                    && store.generation() == generation =>
            {
                dialog.target
            }
            _ => return TicketSettlement::Stale { generation },
        };

        match result {
            Ok(receipt) => {
                self.dialog = None;
                let escalation = store
                    .turn_mut(target)
                    .escalation
                    .get_or_insert_with(Default::default);
                escalation.ticket_id = Some(receipt.response.clone());
                escalation.acknowledged = true;
                TicketSettlement::Created {
                    target,
                    ticket_id: receipt.response,
                }
            }
            Err(error) => {
                if let Some(dialog) = &mut self.dialog {
                    dialog.submitting = false;
                }
                TicketSettlement::Failed { target, error }
            }
        }
    }

    /// Closes the dialog and drops the draft. Refused while submitting.
    pub fn dismiss(&mut self) -> Result<(), Rejection> {
        match self.state() {
            EscalationState::Closed => Err(Rejection::DialogClosed),
            EscalationState::Submitting => Err(Rejection::SubmissionPending),
            EscalationState::Drafting => {
                self.dialog = None;
                Ok(())
            }
        }
    }

    /// Closes the dialog because its conversation is gone. A submission in
    /// flight will be settled as stale.
    pub(crate) fn reset(&mut self) {
        if let Some(dialog) = self.dialog.take() {
            debug!("ticket dialog for turn {} discarded", dialog.target);
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use docchat_model::{ChatReply, ErrorKind as BackendErrorKind};

    use super::*;
    use crate::context::ConversationContext;
    use crate::error::ErrorKind;
    use crate::exchange::ExchangeCoordinator;

    /// Builds a store of `[HUMAN, AI]` where the answer offers a ticket
    /// when `offered` is set.
    fn store_with_answer(offered: bool) -> MessageStore {
        let mut store = MessageStore::default();
        let mut exchange = ExchangeCoordinator::default();
        let context = ConversationContext::default();
        exchange
            .begin(&mut store, &context, "hola", Utc::now())
            .unwrap();
        let reply = ChatReply {
            message: "no lo sé".to_owned(),
            create_ticket: offered,
            description: "need human help".to_owned(),
            ..Default::default()
        };
        exchange.settle(&mut store, 0, Ok(reply));
        store
    }

    fn fill(workflow: &mut EscalationWorkflow) {
        let draft = workflow.draft_mut().unwrap();
        draft.set_name("Ana");
        draft.set_email("ana@example.com");
    }

    #[test]
    fn test_open_requires_an_offer() {
        let store = store_with_answer(false);
        let mut workflow = EscalationWorkflow::default();
        assert_eq!(
            workflow.open_for(&store, 1).err(),
            Some(Rejection::NoEscalationOffer)
        );
        assert_eq!(
            workflow.open_for(&store, 9).err(),
            Some(Rejection::NoEscalationOffer)
        );
        assert_eq!(workflow.state(), EscalationState::Closed);
    }

    #[test]
    fn test_open_seeds_the_description() {
        let store = store_with_answer(true);
        let mut workflow = EscalationWorkflow::default();
        let draft = workflow.open_for(&store, 1).unwrap();
        assert_eq!(draft.description(), "need human help");
        assert_eq!(workflow.state(), EscalationState::Drafting);
        assert_eq!(workflow.target(), Some(1));
    }

    #[test]
    fn test_invalid_email_blocks_submission() {
        let store = store_with_answer(true);
        let mut workflow = EscalationWorkflow::default();
        workflow.open_for(&store, 1).unwrap();
        fill(&mut workflow);
        workflow.draft_mut().unwrap().set_email("not-an-email");

        let err = workflow.begin_submit().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(
            err,
            Error::Validation(FieldErrors::from([(
                TicketField::Email,
                FieldError::InvalidEmail
            )]))
        );
        assert_eq!(workflow.state(), EscalationState::Drafting);
    }

    #[test]
    fn test_created_ticket_is_recorded_on_the_turn() {
        let mut store = store_with_answer(true);
        let mut workflow = EscalationWorkflow::default();
        workflow.open_for(&store, 1).unwrap();
        fill(&mut workflow);

        let submission = workflow.begin_submit().unwrap();
        assert_eq!(submission.target, 1);
        assert_eq!(submission.request.description, "need human help");
        assert_eq!(workflow.state(), EscalationState::Submitting);
        assert_eq!(
            workflow.begin_submit().unwrap_err(),
            Error::Rejected(Rejection::SubmissionPending)
        );
        assert_eq!(workflow.dismiss(), Err(Rejection::SubmissionPending));

        let receipt = TicketReceipt {
            response: "T-42".to_owned(),
        };
        let settlement = workflow.settle(&mut store, 0, Ok(receipt));
        assert_eq!(
            settlement,
            TicketSettlement::Created {
                target: 1,
                ticket_id: "T-42".to_owned()
            }
        );
        assert_eq!(workflow.state(), EscalationState::Closed);
        let escalation = store.turns()[1].escalation().unwrap();
        assert_eq!(escalation.ticket_id(), Some("T-42"));
        assert!(escalation.acknowledged());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_failed_submission_keeps_the_draft() {
        let mut store = store_with_answer(true);
        let mut workflow = EscalationWorkflow::default();
        workflow.open_for(&store, 1).unwrap();
        fill(&mut workflow);
        workflow.begin_submit().unwrap();

        let error = TransportError::new(BackendErrorKind::Unavailable, "down");
        let settlement = workflow.settle(&mut store, 0, Err(error.clone()));
        assert_eq!(settlement, TicketSettlement::Failed { target: 1, error });
        assert_eq!(workflow.state(), EscalationState::Drafting);
        assert_eq!(workflow.draft().map(TicketDraft::name), Some("Ana"));
        assert!(!store.turns()[1].escalation().unwrap().acknowledged());

        workflow.dismiss().unwrap();
        assert_eq!(workflow.state(), EscalationState::Closed);
        assert_eq!(workflow.dismiss(), Err(Rejection::DialogClosed));
    }

    #[test]
    fn test_ticket_after_reset_is_stale() {
        let mut store = store_with_answer(true);
        let mut workflow = EscalationWorkflow::default();
        workflow.open_for(&store, 1).unwrap();
        fill(&mut workflow);
        workflow.begin_submit().unwrap();

        workflow.reset();
        store.reset(None);
        let receipt = TicketReceipt {
            response: "T-1".to_owned(),
        };
        let settlement = workflow.settle(&mut store, 0, Ok(receipt));
        assert_eq!(settlement, TicketSettlement::Stale { generation: 0 });
        assert!(store.is_empty());
    }
}
