use std::error::Error;

use serde_json::Value;

use crate::document::DocumentInfo;
use crate::error::ErrorKind;
use crate::reply::{ChatReply, TicketReceipt};
use crate::request::{
    ChatRequest, DeleteChatQuery, DocumentQuery, TicketRequest,
};

/// The error type for a backend.
pub trait BackendError: Error + Send + Sync + 'static {
    /// Returns the kind of this error.
    fn kind(&self) -> ErrorKind;
}

/// A type that represents the document-chat backend.
///
/// Every call is a single request/response pair: the returned future
/// resolves exactly once, with either the complete response or an error.
/// The futures must be fully independent of `self`, so callers can move
/// them onto spawned tasks.
///
/// Once the backend is created, it should behave like a stateless object.
/// It can still have internal state, but callers should not rely on it.
pub trait ChatBackend: Send + Sync {
    /// The error type that may be returned by the backend.
    type Error: BackendError;

    /// Sends a chat message and waits for the answer.
    fn send_message(
        &self,
        req: &ChatRequest,
    ) -> impl Future<Output = Result<ChatReply, Self::Error>> + Send + 'static;

    /// Submits a support ticket.
    fn submit_ticket(
        &self,
        req: &TicketRequest,
    ) -> impl Future<Output = Result<TicketReceipt, Self::Error>> + Send + 'static;

    /// Fetches the metadata of a document or topic.
    fn fetch_document(
        &self,
        query: &DocumentQuery,
    ) -> impl Future<Output = Result<DocumentInfo, Self::Error>> + Send + 'static;

    /// Lists the documents that belong to a topic.
    fn list_topic_documents(
        &self,
        topic_id: &str,
    ) -> impl Future<Output = Result<Value, Self::Error>> + Send + 'static;

    /// Lists the suggested prompts.
    fn list_prompts(
        &self,
        body: &Value,
    ) -> impl Future<Output = Result<Value, Self::Error>> + Send + 'static;

    /// Shares a question and its answer.
    fn share_questions(
        &self,
        body: &Value,
    ) -> impl Future<Output = Result<Value, Self::Error>> + Send + 'static;

    /// Deletes the stored chat of a document.
    fn delete_chat(
        &self,
        query: &DeleteChatQuery,
    ) -> impl Future<Output = Result<Value, Self::Error>> + Send + 'static;
}
