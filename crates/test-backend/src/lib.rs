//! A scripted in-process backend for testing purpose.

mod preset;

use std::collections::{HashMap, VecDeque};
use std::error::Error as StdError;
use std::fmt::{self, Debug, Display, Formatter};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use docchat_model::{
    BackendError, ChatBackend, ChatReply, ChatRequest, DeleteChatQuery,
    DocumentInfo, DocumentQuery, ErrorKind, TicketReceipt, TicketRequest,
};
use serde_json::{Value, json};
use tokio::sync::oneshot;
use tokio::time::sleep;

pub use preset::*;

#[derive(Debug)]
pub struct Error {
    message: &'static str,
    kind: ErrorKind,
}

impl Error {
    #[inline]
    fn new(message: &'static str, kind: ErrorKind) -> Self {
        Self { message, kind }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.kind)
    }
}

impl StdError for Error {}

impl BackendError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

enum Step<T> {
    Reply(T),
    Fail(ErrorKind),
    Gated(oneshot::Receiver<Result<T, ErrorKind>>),
}

impl<T: Send + 'static> Step<T> {
    async fn resolve(self, delay: Option<Duration>) -> Result<T, Error> {
        if let Some(delay) = delay {
            sleep(delay).await;
        }
        match self {
            Step::Reply(value) => Ok(value),
            Step::Fail(kind) => Err(Error::new("scripted failure", kind)),
            Step::Gated(rx) => match rx.await {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(kind)) => Err(Error::new("scripted failure", kind)),
                Err(_) => Err(Error::new("gate dropped", ErrorKind::Other)),
            },
        }
    }
}

/// Holds back a scripted response until the test decides how it ends.
///
/// Dropping the gate without resolving it fails the request.
pub struct Gate<T> {
    tx: oneshot::Sender<Result<T, ErrorKind>>,
}

impl<T> Gate<T> {
    /// Lets the request succeed with `value`.
    #[inline]
    pub fn release(self, value: T) {
        self.tx.send(Ok(value)).ok();
    }

    /// Lets the request fail with `kind`.
    #[inline]
    pub fn fail(self, kind: ErrorKind) {
        self.tx.send(Err(kind)).ok();
    }
}

impl Gate<ChatReply> {
    /// Lets the request succeed with a preset answer.
    #[inline]
    pub fn release_preset(self, preset: PresetReply) {
        self.release(preset.into());
    }
}

/// A request the backend has received.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordedRequest {
    /// A chat message.
    Chat(ChatRequest),
    /// A ticket submission.
    Ticket(TicketRequest),
    /// A document lookup.
    Document(DocumentQuery),
    /// A passthrough call with its name and body.
    Passthrough(&'static str, Value),
}

#[derive(Default)]
struct Script {
    chat: VecDeque<Step<ChatReply>>,
    tickets: VecDeque<Step<TicketReceipt>>,
    documents: HashMap<String, DocumentInfo>,
    recorded: Vec<RecordedRequest>,
    delay: Option<Duration>,
}

/// A local fake backend for testing purpose.
///
/// Before sending requests, queue up how the backend should answer them.
/// Chat replies and ticket receipts are consumed in order; if the queue is
/// empty when a request arrives, the request fails with
/// [`ErrorKind::Unavailable`]. Every request is recorded and can be
/// inspected with [`ScriptedBackend::recorded`].
///
/// Clones share the same script, so a test can keep one clone around to
/// inspect while the session owns another.
#[derive(Clone, Default)]
pub struct ScriptedBackend {
    script: Arc<Mutex<Script>>,
}

impl ScriptedBackend {
    fn script(&self) -> MutexGuard<'_, Script> {
        // A poisoned lock only means another test thread panicked.
        self.script.lock().unwrap_or_else(|err| err.into_inner())
    }

    /// Queues a successful chat answer.
    #[inline]
    pub fn push_reply(&self, preset: PresetReply) {
        self.script().chat.push_back(Step::Reply(preset.into()));
    }

    /// Queues a failing chat request.
    #[inline]
    pub fn push_chat_failure(&self, kind: ErrorKind) {
        self.script().chat.push_back(Step::Fail(kind));
    }

    /// Queues a chat request that stays pending until the returned gate
    /// is resolved.
    pub fn push_gated_reply(&self) -> Gate<ChatReply> {
        let (tx, rx) = oneshot::channel();
        self.script().chat.push_back(Step::Gated(rx));
        Gate { tx }
    }

    /// Queues a successful ticket submission.
    #[inline]
    pub fn push_ticket<S: Into<String>>(&self, ticket_id: S) {
        self.script().tickets.push_back(Step::Reply(TicketReceipt {
            response: ticket_id.into(),
        }));
    }

    /// Queues a failing ticket submission.
    #[inline]
    pub fn push_ticket_failure(&self, kind: ErrorKind) {
        self.script().tickets.push_back(Step::Fail(kind));
    }

    /// Queues a ticket submission that stays pending until the returned
    /// gate is resolved.
    pub fn push_gated_ticket(&self) -> Gate<TicketReceipt> {
        let (tx, rx) = oneshot::channel();
        self.script().tickets.push_back(Step::Gated(rx));
        Gate { tx }
    }

    /// Registers the metadata returned for a document id.
    #[inline]
    pub fn add_document<S: Into<String>>(&self, id: S, info: DocumentInfo) {
        self.script().documents.insert(id.into(), info);
    }

    /// Delays every response by `duration`.
    #[inline]
    pub fn set_delay(&self, duration: Duration) {
        self.script().delay = Some(duration);
    }

    /// Returns every request received so far.
    pub fn recorded(&self) -> Vec<RecordedRequest> {
        self.script().recorded.clone()
    }

    /// Returns the chat requests received so far.
    pub fn chat_requests(&self) -> Vec<ChatRequest> {
        self.script()
            .recorded
            .iter()
            .filter_map(|req| match req {
                RecordedRequest::Chat(req) => Some(req.clone()),
                _ => None,
            })
            .collect()
    }

    fn passthrough(
        &self,
        name: &'static str,
        body: Value,
    ) -> impl Future<Output = Result<Value, Error>> + Send + 'static {
        let delay = {
            let mut script = self.script();
            script
                .recorded
                .push(RecordedRequest::Passthrough(name, body.clone()));
            script.delay
        };
        Step::Reply(json!({ "ok": true, "echo": body })).resolve(delay)
    }
}

impl Debug for ScriptedBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let script = self.script();
        f.debug_struct("ScriptedBackend")
            .field("queued_chat", &script.chat.len())
            .field("queued_tickets", &script.tickets.len())
            .field("recorded", &script.recorded.len())
            .finish_non_exhaustive()
    }
}

impl ChatBackend for ScriptedBackend {
    type Error = crate::Error;

    fn send_message(
        &self,
        req: &ChatRequest,
    ) -> impl Future<Output = Result<ChatReply, Self::Error>> + Send + 'static
    {
        let mut script = self.script();
        script.recorded.push(RecordedRequest::Chat(req.clone()));
        let step = script
            .chat
            .pop_front()
            .unwrap_or(Step::Fail(ErrorKind::Unavailable));
        step.resolve(script.delay)
    }

    fn submit_ticket(
        &self,
        req: &TicketRequest,
    ) -> impl Future<Output = Result<TicketReceipt, Self::Error>> + Send + 'static
    {
        let mut script = self.script();
        script.recorded.push(RecordedRequest::Ticket(req.clone()));
        let step = script
            .tickets
            .pop_front()
            .unwrap_or(Step::Fail(ErrorKind::Unavailable));
        step.resolve(script.delay)
    }

    fn fetch_document(
        &self,
        query: &DocumentQuery,
    ) -> impl Future<Output = Result<DocumentInfo, Self::Error>> + Send + 'static
    {
        let mut script = self.script();
        script.recorded.push(RecordedRequest::Document(query.clone()));
        let step = match script.documents.get(&query.document_id) {
            Some(info) => Step::Reply(info.clone()),
            None => Step::Fail(ErrorKind::Status(404)),
        };
        step.resolve(script.delay)
    }

    fn list_topic_documents(
        &self,
        topic_id: &str,
    ) -> impl Future<Output = Result<Value, Self::Error>> + Send + 'static {
        let body = json!({ "topic_id": topic_id });
        self.passthrough("list_topic_documents", body)
    }

    fn list_prompts(
        &self,
        body: &Value,
    ) -> impl Future<Output = Result<Value, Self::Error>> + Send + 'static {
        self.passthrough("list_prompts", body.clone())
    }

    fn share_questions(
        &self,
        body: &Value,
    ) -> impl Future<Output = Result<Value, Self::Error>> + Send + 'static {
        self.passthrough("share_questions", body.clone())
    }

    fn delete_chat(
        &self,
        query: &DeleteChatQuery,
    ) -> impl Future<Output = Result<Value, Self::Error>> + Send + 'static {
        self.passthrough(
            "delete_chat",
            json!({ "document_id": query.document_id }),
        )
    }
}
