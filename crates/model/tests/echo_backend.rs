use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::future::ready;
use std::time::Duration;

use docchat_model::{
    BackendError, ChatBackend, ChatReply, ChatRequest, DeleteChatQuery,
    DocumentInfo, DocumentQuery, ErrorKind, HistoryTurn, Talker,
    TicketReceipt, TicketRequest,
};
use serde_json::{Value, json};
use tokio::time::sleep;

#[derive(Debug)]
struct EchoBackendError(ErrorKind);

impl Display for EchoBackendError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl Error for EchoBackendError {}

impl BackendError for EchoBackendError {
    fn kind(&self) -> ErrorKind {
        self.0
    }
}

/// Answers every message by repeating it, after a short delay.
struct EchoBackend;

impl ChatBackend for EchoBackend {
    type Error = EchoBackendError;

    fn send_message(
        &self,
        req: &ChatRequest,
    ) -> impl Future<Output = Result<ChatReply, Self::Error>> + Send + 'static
    {
        let message = format!("You said {}", req.message);
        let turns = req.chat_history.len();
        async move {
            sleep(Duration::from_millis(1)).await;
            Ok(ChatReply {
                message,
                references: vec![json!({ "turns": turns })],
                ..Default::default()
            })
        }
    }

    fn submit_ticket(
        &self,
        req: &TicketRequest,
    ) -> impl Future<Output = Result<TicketReceipt, Self::Error>> + Send + 'static
    {
        let res = if req.email.contains('@') {
            Ok(TicketReceipt {
                response: "T-1".to_owned(),
            })
        } else {
            Err(EchoBackendError(ErrorKind::Status(422)))
        };
        ready(res)
    }

    fn fetch_document(
        &self,
        _query: &DocumentQuery,
    ) -> impl Future<Output = Result<DocumentInfo, Self::Error>> + Send + 'static
    {
        ready(Err(EchoBackendError(ErrorKind::Unavailable)))
    }

    fn list_topic_documents(
        &self,
        _topic_id: &str,
    ) -> impl Future<Output = Result<Value, Self::Error>> + Send + 'static {
        ready(Ok(json!([])))
    }

    fn list_prompts(
        &self,
        body: &Value,
    ) -> impl Future<Output = Result<Value, Self::Error>> + Send + 'static {
        ready(Ok(body.clone()))
    }

    fn share_questions(
        &self,
        body: &Value,
    ) -> impl Future<Output = Result<Value, Self::Error>> + Send + 'static {
        ready(Ok(body.clone()))
    }

    fn delete_chat(
        &self,
        _query: &DeleteChatQuery,
    ) -> impl Future<Output = Result<Value, Self::Error>> + Send + 'static {
        ready(Ok(Value::Null))
    }
}

fn sample_request() -> ChatRequest {
    ChatRequest {
        message: "hola".to_owned(),
        language: "spanish".to_owned(),
        topic: "agro".to_owned(),
        summary: false,
        chat_history: vec![HistoryTurn {
            message: "Chateando con el documento: Manual".to_owned(),
            talker: Talker::System,
            interaction_date: "2026-01-02 03:04:05.006".to_owned(),
        }],
        vector_id: None,
    }
}

#[tokio::test]
async fn test_echo_backend() {
    let backend = EchoBackend;
    let reply = backend.send_message(&sample_request()).await.unwrap();
    assert_eq!(reply.message, "You said hola");
    assert_eq!(reply.references, vec![json!({ "turns": 1 })]);
    assert!(!reply.create_ticket);

    let err = backend
        .submit_ticket(&TicketRequest {
            name: "Ana".to_owned(),
            email: "nope".to_owned(),
            description: "help".to_owned(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Status(422));
}

#[test]
fn test_request_wire_format() {
    let mut req = sample_request();
    let value = serde_json::to_value(&req).unwrap();
    assert_eq!(
        value,
        json!({
            "message": "hola",
            "language": "spanish",
            "topic": "agro",
            "summary": false,
            "chat_history": [{
                "message": "Chateando con el documento: Manual",
                "talker": "SYSTEM",
                "interaction_date": "2026-01-02 03:04:05.006",
            }],
        })
    );

    req.vector_id = Some("vec-9".to_owned());
    let value = serde_json::to_value(&req).unwrap();
    assert_eq!(value["vector_id"], "vec-9");
}

#[test]
fn test_reply_defaults() {
    let reply: ChatReply =
        serde_json::from_value(json!({ "message": "hola de vuelta" }))
            .unwrap();
    assert_eq!(reply.message, "hola de vuelta");
    assert!(reply.references.is_empty());
    assert!(!reply.create_ticket);
    assert!(reply.description.is_empty());

    let reply: ChatReply = serde_json::from_value(json!({
        "message": "no lo sé",
        "references": [],
        "create_ticket": true,
        "description": "need human help",
    }))
    .unwrap();
    assert!(reply.create_ticket);
    assert_eq!(reply.description, "need human help");
}

#[test]
fn test_document_info_wire_names() {
    let info: DocumentInfo = serde_json::from_value(json!({
        "alias": "Manual de riego",
        "status": true,
        "vector_id": "vec-1",
        "S3_directory": "docs/manual de riego.pdf",
    }))
    .unwrap();
    assert_eq!(info.alias, "Manual de riego");
    assert!(info.status);
    assert_eq!(info.vector_id.as_deref(), Some("vec-1"));
    assert_eq!(info.s3_directory.as_deref(), Some("docs/manual de riego.pdf"));
}
