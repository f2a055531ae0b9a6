//! The send-and-reconcile protocol of chat exchanges.

use chrono::{DateTime, Utc};
use docchat_model::{ChatReply, ChatRequest};

use crate::context::ConversationContext;
use crate::error::{Rejection, TransportError};
use crate::prompt::{self, HISTORY_WINDOW};
use crate::store::MessageStore;
use crate::turn::{ChatTurn, Escalation};

/// The outstanding exchange of a conversation.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingExchange {
    index: usize,
    generation: u64,
    cancelled: bool,
}

impl PendingExchange {
    /// Returns the index of the placeholder turn.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the store generation the exchange belongs to.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// A request the caller must send to the backend.
#[derive(Clone, Debug, PartialEq)]
pub struct Dispatch {
    /// The store generation to settle the answer against.
    pub generation: u64,
    /// The request payload.
    pub request: ChatRequest,
}

/// How an exchange ended.
#[derive(Clone, Debug, PartialEq)]
pub enum Settlement {
    /// The placeholder now holds the answer.
    Resolved {
        /// Index of the answer turn.
        index: usize,
        /// Whether the answer offers an escalation.
        escalation_offered: bool,
    },
    /// The placeholder was removed; the question is kept for a retry.
    RolledBack {
        /// Index the placeholder had.
        index: usize,
        /// Why the request failed.
        error: TransportError,
    },
    /// The result belonged to a conversation that no longer exists and
    /// was dropped.
    Stale {
        /// Generation the result was issued for.
        generation: u64,
    },
}

/// Owns the input buffer and the lifecycle of chat exchanges.
///
/// At most one exchange is pending at a time; sending while one is pending
/// is rejected rather than queued.
#[derive(Clone, Debug, Default)]
pub struct ExchangeCoordinator {
    input: String,
    pending: Option<PendingExchange>,
}

impl ExchangeCoordinator {
    /// Returns the input buffer.
    #[inline]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Replaces the input buffer.
    #[inline]
    pub fn set_input<S: Into<String>>(&mut self, text: S) {
        self.input = text.into();
    }

    /// Returns the outstanding exchange, if any.
    #[inline]
    pub fn pending(&self) -> Option<&PendingExchange> {
        self.pending.as_ref().filter(|pending| !pending.cancelled)
    }

    /// Whether new sends are blocked by an outstanding exchange.
    #[inline]
    pub fn is_blocked(&self) -> bool {
        self.pending().is_some()
    }

    /// Starts an exchange for `text`.
    ///
    /// Appends the question and an answer placeholder, clears the input
    /// buffer and returns the request to dispatch.
    pub fn begin(
        &mut self,
        store: &mut MessageStore,
        context: &ConversationContext,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<Dispatch, Rejection> {
        if text.trim().is_empty() {
            return Err(Rejection::EmptyInput);
        }
        if self.is_blocked() {
            return Err(Rejection::ExchangePending);
        }

        // The history is the context of this question, so it's taken
        // before the question itself is appended.
        let request =
            prompt::compose(text, context, store.window(HISTORY_WINDOW));
        store.append(ChatTurn::human(text, now));
        let index =
            store.append(ChatTurn::pending_ai(context.locale().loading(), now));
        self.input.clear();

        let generation = store.generation();
        trace!("exchange started at {index}, generation {generation}");
        self.pending = Some(PendingExchange {
            index,
            generation,
            cancelled: false,
        });
        Ok(Dispatch {
            generation,
            request,
        })
    }

    /// Marks the outstanding exchange as cancelled, so that its result is
    /// discarded when it arrives.
    pub fn cancel(&mut self) {
        if let Some(pending) = &mut self.pending {
            if !pending.cancelled {
                let generation = pending.generation;
                debug!("cancelled exchange of generation {generation}");
            }
            pending.cancelled = true;
        }
    }

    /// Applies the result of the exchange issued for `generation`.
    pub fn settle(
        &mut self,
        store: &mut MessageStore,
        generation: u64,
        result: Result<ChatReply, TransportError>,
    ) -> Settlement {
        let matched = self
            .pending
            .as_ref()
            .filter(|pending| pending.generation == generation)
            .map(|pending| (pending.index, pending.cancelled));
        let index = match matched {
            Some((index, false)) if store.generation() == generation => index,
            Some(_) => {
                // A cancelled exchange is finally over.
                self.pending = None;
                return Settlement::Stale { generation };
            }
            None => return Settlement::Stale { generation },
        };
        self.pending = None;
        debug_assert_eq!(store.pending_index(), Some(index));

        match result {
            Ok(reply) => {
                let escalation_offered = reply.create_ticket;
                let turn = store.turn_mut(index);
                turn.text = reply.message;
                turn.references = Some(reply.references);
                turn.is_pending = false;
                if escalation_offered {
                    turn.escalation = Some(Escalation {
                        offered: true,
                        description: reply.description,
                        ..Default::default()
                    });
                }
                Settlement::Resolved {
                    index,
                    escalation_offered,
                }
            }
            Err(error) => {
                let removed = store.remove_last();
                debug_assert!(removed.is_some_and(|turn| turn.is_pending));
                Settlement::RolledBack { index, error }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use docchat_model::ErrorKind as BackendErrorKind;
    use serde_json::json;

    use super::*;
    use crate::turn::Speaker;

    fn context() -> ConversationContext {
        ConversationContext {
            topic_id: "agro".to_owned(),
            language_code: "english".to_owned(),
            ..Default::default()
        }
    }

    fn reply(message: &str) -> ChatReply {
        ChatReply {
            message: message.to_owned(),
            ..Default::default()
        }
    }

    #[test]
    fn test_begin_appends_question_and_placeholder() {
        let mut store = MessageStore::default();
        let mut exchange = ExchangeCoordinator::default();
        exchange.set_input("hello");

        let dispatch = exchange
            .begin(&mut store, &context(), "hello", Utc::now())
            .unwrap();
        assert_eq!(dispatch.generation, 0);
        assert_eq!(dispatch.request.message, "hello");
        assert!(dispatch.request.chat_history.is_empty());

        assert_eq!(store.len(), 2);
        assert_eq!(store.turns()[0].speaker(), Speaker::Human);
        let placeholder = &store.turns()[1];
        assert!(placeholder.is_pending());
        assert_eq!(placeholder.text(), "Generating answer");
        assert!(exchange.input().is_empty());
        assert!(exchange.is_blocked());
        assert_eq!(exchange.pending().map(PendingExchange::index), Some(1));
    }

    #[test]
    fn test_begin_rejects_blank_and_concurrent_sends() {
        let mut store = MessageStore::default();
        let mut exchange = ExchangeCoordinator::default();
        let now = Utc::now();

        let err = exchange.begin(&mut store, &context(), " \n\t", now);
        assert_eq!(err, Err(Rejection::EmptyInput));
        assert!(store.is_empty());

        exchange.begin(&mut store, &context(), "first", now).unwrap();
        let err = exchange.begin(&mut store, &context(), "second", now);
        assert_eq!(err, Err(Rejection::ExchangePending));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_success_replaces_the_placeholder() {
        let mut store = MessageStore::default();
        let mut exchange = ExchangeCoordinator::default();
        exchange
            .begin(&mut store, &context(), "hello", Utc::now())
            .unwrap();

        let mut answer = reply("hi there");
        answer.references = vec![json!({ "page": 1 })];
        let settlement = exchange.settle(&mut store, 0, Ok(answer));
        assert_eq!(
            settlement,
            Settlement::Resolved {
                index: 1,
                escalation_offered: false
            }
        );
        assert_eq!(store.len(), 2);
        let turn = &store.turns()[1];
        assert!(!turn.is_pending());
        assert_eq!(turn.text(), "hi there");
        assert_eq!(turn.references(), Some(&[json!({ "page": 1 })][..]));
        assert!(turn.escalation().is_none());
        assert!(!exchange.is_blocked());
    }

    #[test]
    fn test_escalation_flag_is_staged_on_the_turn() {
        let mut store = MessageStore::default();
        let mut exchange = ExchangeCoordinator::default();
        exchange
            .begin(&mut store, &context(), "hello", Utc::now())
            .unwrap();

        let mut answer = reply("I don't know");
        answer.create_ticket = true;
        answer.description = "need human help".to_owned();
        let settlement = exchange.settle(&mut store, 0, Ok(answer));
        assert!(matches!(
            settlement,
            Settlement::Resolved {
                escalation_offered: true,
                ..
            }
        ));
        let escalation = store.turns()[1].escalation().unwrap();
        assert!(escalation.offered());
        assert_eq!(escalation.description(), "need human help");
        assert_eq!(escalation.ticket_id(), None);
    }

    #[test]
    fn test_failure_removes_only_the_placeholder() {
        let mut store = MessageStore::default();
        let mut exchange = ExchangeCoordinator::default();
        exchange
            .begin(&mut store, &context(), "hello", Utc::now())
            .unwrap();

        let error = TransportError::new(BackendErrorKind::Status(502), "bad");
        let settlement = exchange.settle(&mut store, 0, Err(error.clone()));
        assert_eq!(settlement, Settlement::RolledBack { index: 1, error });
        assert_eq!(store.len(), 1);
        assert_eq!(store.turns()[0].text(), "hello");
        assert!(!exchange.is_blocked());
    }

    #[test]
    fn test_result_after_reset_is_stale() {
        let mut store = MessageStore::default();
        let mut exchange = ExchangeCoordinator::default();
        exchange
            .begin(&mut store, &context(), "hello", Utc::now())
            .unwrap();

        exchange.cancel();
        store.reset(None);
        assert!(!exchange.is_blocked());

        exchange
            .begin(&mut store, &context(), "again", Utc::now())
            .unwrap();
        let settlement = exchange.settle(&mut store, 0, Ok(reply("late")));
        assert_eq!(settlement, Settlement::Stale { generation: 0 });
        assert_eq!(store.len(), 2);
        assert!(store.turns()[1].is_pending());
        assert!(exchange.is_blocked());

        let settlement = exchange.settle(&mut store, 1, Ok(reply("fresh")));
        assert!(matches!(settlement, Settlement::Resolved { index: 1, .. }));
    }
}
