use std::pin::Pin;
use std::sync::Arc;

use docchat_model::{
    BackendError, ChatBackend, ChatReply, ChatRequest, DeleteChatQuery,
    DocumentInfo, DocumentQuery, TicketReceipt, TicketRequest,
};
use serde_json::Value;
use tracing::Instrument;

use crate::error::TransportError;

type BoxedCall<T> =
    Pin<Box<dyn Future<Output = Result<T, TransportError>> + Send>>;

trait BackendObject: Send + Sync + 'static {
    fn send_message(&self, req: &ChatRequest) -> BoxedCall<ChatReply>;

    fn submit_ticket(&self, req: &TicketRequest) -> BoxedCall<TicketReceipt>;

    fn fetch_document(&self, query: &DocumentQuery) -> BoxedCall<DocumentInfo>;

    fn list_topic_documents(&self, topic_id: &str) -> BoxedCall<Value>;

    fn list_prompts(&self, body: &Value) -> BoxedCall<Value>;

    fn share_questions(&self, body: &Value) -> BoxedCall<Value>;

    fn delete_chat(&self, query: &DeleteChatQuery) -> BoxedCall<Value>;
}

struct AnyBackend<B>(B);

/// Converts the backend error and traces the call.
fn erase<T, E, F>(call: &'static str, fut: F) -> BoxedCall<T>
where
    T: Send + 'static,
    E: BackendError,
    F: Future<Output = Result<T, E>> + Send + 'static,
{
    Box::pin(
        async move {
            trace!("sending");
            match fut.await {
                Ok(value) => {
                    trace!("succeeded");
                    Ok(value)
                }
                Err(err) => {
                    warn!("failed: {err}");
                    Err(TransportError::from_backend(&err))
                }
            }
        }
        .instrument(debug_span!("backend", call)),
    )
}

impl<B: ChatBackend + 'static> BackendObject for AnyBackend<B> {
    #[inline]
    fn send_message(&self, req: &ChatRequest) -> BoxedCall<ChatReply> {
        erase("send_message", self.0.send_message(req))
    }

    #[inline]
    fn submit_ticket(&self, req: &TicketRequest) -> BoxedCall<TicketReceipt> {
        erase("submit_ticket", self.0.submit_ticket(req))
    }

    #[inline]
    fn fetch_document(&self, query: &DocumentQuery) -> BoxedCall<DocumentInfo> {
        erase("fetch_document", self.0.fetch_document(query))
    }

    #[inline]
    fn list_topic_documents(&self, topic_id: &str) -> BoxedCall<Value> {
        erase("list_topic_documents", self.0.list_topic_documents(topic_id))
    }

    #[inline]
    fn list_prompts(&self, body: &Value) -> BoxedCall<Value> {
        erase("list_prompts", self.0.list_prompts(body))
    }

    #[inline]
    fn share_questions(&self, body: &Value) -> BoxedCall<Value> {
        erase("share_questions", self.0.share_questions(body))
    }

    #[inline]
    fn delete_chat(&self, query: &DeleteChatQuery) -> BoxedCall<Value> {
        erase("delete_chat", self.0.delete_chat(query))
    }
}

/// A wrapper around a backend that provides a type-erased interface for
/// the other modules, with backend errors already converted into
/// [`TransportError`]s.
#[derive(Clone)]
pub(crate) struct BackendClient {
    backend: Arc<dyn BackendObject>,
}

impl BackendClient {
    #[inline]
    pub fn new<B: ChatBackend + 'static>(backend: B) -> Self {
        Self {
            backend: Arc::new(AnyBackend(backend)),
        }
    }

    #[inline]
    pub fn send_message(&self, req: &ChatRequest) -> BoxedCall<ChatReply> {
        self.backend.send_message(req)
    }

    #[inline]
    pub fn submit_ticket(
        &self,
        req: &TicketRequest,
    ) -> BoxedCall<TicketReceipt> {
        self.backend.submit_ticket(req)
    }

    #[inline]
    pub fn fetch_document(
        &self,
        query: &DocumentQuery,
    ) -> BoxedCall<DocumentInfo> {
        self.backend.fetch_document(query)
    }

    #[inline]
    pub fn list_topic_documents(&self, topic_id: &str) -> BoxedCall<Value> {
        self.backend.list_topic_documents(topic_id)
    }

    #[inline]
    pub fn list_prompts(&self, body: &Value) -> BoxedCall<Value> {
        self.backend.list_prompts(body)
    }

    #[inline]
    pub fn share_questions(&self, body: &Value) -> BoxedCall<Value> {
        self.backend.share_questions(body)
    }

    #[inline]
    pub fn delete_chat(&self, query: &DeleteChatQuery) -> BoxedCall<Value> {
        self.backend.delete_chat(query)
    }
}

#[cfg(test)]
mod tests {
    use docchat_model::ErrorKind as BackendErrorKind;
    use docchat_test_backend::{PresetReply, ScriptedBackend};

    use super::*;

    fn request() -> ChatRequest {
        ChatRequest {
            message: "hola".to_owned(),
            language: "spanish".to_owned(),
            topic: "agro".to_owned(),
            summary: false,
            chat_history: vec![],
            vector_id: None,
        }
    }

    #[tokio::test]
    async fn test_send_message() {
        let backend = ScriptedBackend::default();
        backend.push_reply(PresetReply::answer("hola de vuelta"));
        let client = BackendClient::new(backend.clone());

        let reply = client.send_message(&request()).await.unwrap();
        assert_eq!(reply.message, "hola de vuelta");
        assert_eq!(backend.chat_requests(), vec![request()]);
    }

    #[tokio::test]
    async fn test_error_conversion() {
        let backend = ScriptedBackend::default();
        backend.push_chat_failure(BackendErrorKind::Status(503));
        let client = BackendClient::new(backend);

        let err = client.send_message(&request()).await.unwrap_err();
        assert_eq!(err.kind(), BackendErrorKind::Status(503));
        assert!(!err.message().is_empty());
    }
}
