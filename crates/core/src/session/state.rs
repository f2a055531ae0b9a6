use std::collections::HashMap;
use std::fmt::{self, Debug};

use chrono::Utc;
use docchat_actor::{Actor, Message};
use docchat_model::{ChatReply, TicketReceipt};
use tokio::task::JoinHandle;

use super::{SessionEvent, SessionSnapshot};
use crate::backend_client::BackendClient;
use crate::context::{BindOutcome, ContextBinder, ConversationContext};
use crate::error::{Error, Rejection, TransportError};
use crate::escalation::{EscalationWorkflow, TicketDraft, TicketSettlement};
use crate::exchange::{ExchangeCoordinator, Settlement};
use crate::sink::Sinks;
use crate::store::MessageStore;

pub(super) type EventFn = Box<dyn Fn(&SessionEvent) + Send + Sync>;

pub(crate) struct SessionState {
    client: BackendClient,
    pub(super) store: MessageStore,
    pub(super) exchange: ExchangeCoordinator,
    pub(super) escalation: EscalationWorkflow,
    pub(super) binder: ContextBinder,
    pub(super) sinks: Sinks,
    on_event: Option<EventFn>,
    running_tasks: HashMap<u64, JoinHandle<()>>,
    next_task_id: u64,
}

impl SessionState {
    pub(super) fn new(
        client: BackendClient,
        sinks: Sinks,
        on_event: Option<EventFn>,
    ) -> Self {
        Self {
            client,
            store: Default::default(),
            exchange: Default::default(),
            escalation: Default::default(),
            binder: Default::default(),
            sinks,
            on_event,
            running_tasks: Default::default(),
            next_task_id: 1,
        }
    }

    fn emit(&self, event: SessionEvent) {
        if let Some(on_event) = &self.on_event {
            on_event(&event);
        }
    }

    pub(super) fn bind(&mut self, context: ConversationContext) -> BindOutcome {
        let outcome = self.binder.bind(
            context,
            &mut self.store,
            &mut self.exchange,
            &mut self.escalation,
            Utc::now(),
        );
        if let BindOutcome::Reset { generation } = outcome {
            self.emit(SessionEvent::ConversationReset { generation });
        }
        outcome
    }

    pub(super) fn reload(&mut self) -> u64 {
        let generation = self.binder.reload(
            &mut self.store,
            &mut self.exchange,
            &mut self.escalation,
            Utc::now(),
        );
        self.emit(SessionEvent::ConversationReset { generation });
        generation
    }

    pub(super) fn clear(&mut self) {
        let generation = self.binder.clear(
            &mut self.store,
            &mut self.exchange,
            &mut self.escalation,
        );
        self.exchange.set_input(String::new());
        self.emit(SessionEvent::ConversationReset { generation });
    }

    pub(super) fn send(
        &mut self,
        text: &str,
        actor: &Actor<Self>,
    ) -> Result<(), Error> {
        let dispatch = self.exchange.begin(
            &mut self.store,
            self.binder.context(),
            text,
            Utc::now(),
        )?;

        let generation = dispatch.generation;
        let call = self.client.send_message(&dispatch.request);
        let actor_clone = actor.clone();
        self.spawn_task(
            async move {
                let result = call.await;
                actor_clone
                    .send(ExchangeFinishedMessage { generation, result })
                    .ok();
            },
            actor,
        );
        Ok(())
    }

    fn settle_exchange(
        &mut self,
        generation: u64,
        result: Result<ChatReply, TransportError>,
    ) {
        match self.exchange.settle(&mut self.store, generation, result) {
            Settlement::Resolved {
                index,
                escalation_offered,
            } => {
                self.emit(SessionEvent::ExchangeResolved {
                    index,
                    escalation_offered,
                });
            }
            Settlement::RolledBack { index, error } => {
                warn!("answer at {index} rolled back: {error}");
                let locale = self.binder.context().locale();
                self.sinks.notify(locale.chat_failed());
                self.emit(SessionEvent::ExchangeFailed { error });
            }
            Settlement::Stale { generation } => {
                debug!("discarded a stale answer of generation {generation}");
                self.emit(SessionEvent::StaleDiscarded { generation });
            }
        }
    }

    pub(super) fn open_escalation(
        &mut self,
        index: usize,
    ) -> Result<TicketDraft, Error> {
        let draft = self.escalation.open_for(&self.store, index)?;
        Ok(draft.clone())
    }

    pub(super) fn submit_ticket(
        &mut self,
        actor: &Actor<Self>,
    ) -> Result<(), Error> {
        let submission = self.escalation.begin_submit()?;

        let generation = submission.generation;
        let call = self.client.submit_ticket(&submission.request);
        let actor_clone = actor.clone();
        self.spawn_task(
            async move {
                let result = call.await;
                actor_clone
                    .send(TicketFinishedMessage { generation, result })
                    .ok();
            },
            actor,
        );
        Ok(())
    }

    fn settle_ticket(
        &mut self,
        generation: u64,
        result: Result<TicketReceipt, TransportError>,
    ) {
        let locale = self.binder.context().locale();
        match self.escalation.settle(&mut self.store, generation, result) {
            TicketSettlement::Created { target, ticket_id } => {
                info!("ticket {ticket_id} created for turn {target}");
                self.sinks.notify(locale.ticket_created());
                self.emit(SessionEvent::TicketCreated {
                    index: target,
                    ticket_id,
                });
            }
            TicketSettlement::Failed { target, error } => {
                warn!("ticket for turn {target} failed: {error}");
                self.sinks.notify(locale.ticket_failed());
                self.emit(SessionEvent::TicketFailed { error });
            }
            TicketSettlement::Stale { generation } => {
                debug!("discarded a stale ticket of generation {generation}");
                self.emit(SessionEvent::StaleDiscarded { generation });
            }
        }
    }

    pub(super) fn copy_answer(&self, index: usize) -> Result<String, Error> {
        let Some(turn) = self.store.get(index) else {
            return Err(Rejection::NoSuchTurn.into());
        };
        if turn.is_pending() {
            return Err(Rejection::ExchangePending.into());
        }
        let question = index
            .checked_sub(1)
            .and_then(|i| self.store.get(i))
            .map(|turn| turn.text())
            .unwrap_or_default();
        let text = format!("{question}\n\n{}", turn.text());

        self.sinks.copy(&text);
        self.sinks
            .notify(self.binder.context().locale().answer_copied());
        Ok(text)
    }

    pub(super) fn snapshot(&self) -> SessionSnapshot {
        let context = self.binder.context().clone();
        let input_placeholder = context
            .topic_name
            .is_empty()
            .then(|| context.locale().select_topic());
        SessionSnapshot {
            turns: self.store.turns().to_vec(),
            generation: self.store.generation(),
            sending_blocked: self.exchange.is_blocked(),
            input: self.exchange.input().to_owned(),
            input_placeholder,
            context,
            escalation: self.escalation.state(),
            draft: self.escalation.draft().cloned(),
        }
    }

    fn spawn_task<Fut>(&mut self, fut: Fut, actor: &Actor<Self>)
    where
        Fut: Future<Output = ()> + Send + 'static,
    {
        let task_id = self.next_task_id;
        self.next_task_id += 1;

        let actor = actor.clone();
        let task = tokio::spawn(async move {
            fut.await;
            actor.send(TaskEndedMessage(task_id)).ok();
        });
        self.running_tasks.insert(task_id, task);
    }
}

struct ExchangeFinishedMessage {
    generation: u64,
    result: Result<ChatReply, TransportError>,
}

impl Debug for ExchangeFinishedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExchangeFinishedMessage")
            .field("generation", &self.generation)
            .field("ok", &self.result.is_ok())
            .finish_non_exhaustive()
    }
}

impl Message<SessionState> for ExchangeFinishedMessage {
    fn handle(self, state: &mut SessionState, _actor: &Actor<SessionState>) {
        state.settle_exchange(self.generation, self.result);
    }
}

#[derive(Debug)]
struct TicketFinishedMessage {
    generation: u64,
    result: Result<TicketReceipt, TransportError>,
}

impl Message<SessionState> for TicketFinishedMessage {
    fn handle(self, state: &mut SessionState, _actor: &Actor<SessionState>) {
        state.settle_ticket(self.generation, self.result);
    }
}

#[derive(Debug)]
struct TaskEndedMessage(u64);

impl Message<SessionState> for TaskEndedMessage {
    #[inline]
    fn handle(self, state: &mut SessionState, _actor: &Actor<SessionState>) {
        if state.running_tasks.remove(&self.0).is_none() {
            warn!("task {} ended but was never tracked", self.0);
        }
    }
}
