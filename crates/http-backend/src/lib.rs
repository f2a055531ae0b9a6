//! A backend for the document-chat HTTP API.

#[macro_use]
extern crate tracing;

mod config;

use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::sync::Arc;

use docchat_model::{
    BackendError, BindingKind, ChatBackend, ChatReply, ChatRequest,
    DeleteChatQuery, DocumentInfo, DocumentQuery, ErrorKind, TicketReceipt,
    TicketRequest,
};
use mime::Mime;
use reqwest::{Client, Method, RequestBuilder, Response, Url, header};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

pub use config::{Endpoints, HttpBackendConfig, HttpBackendConfigBuilder};

/// Error type for [`HttpBackend`].
#[derive(Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
}

impl Error {
    fn new(message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }

    fn from_reqwest(call: &str, err: reqwest::Error) -> Self {
        let kind = if let Some(status) = err.status() {
            ErrorKind::Status(status.as_u16())
        } else if err.is_decode() {
            ErrorKind::Decode
        } else if err.is_connect() || err.is_timeout() {
            ErrorKind::Unavailable
        } else {
            ErrorKind::Other
        };
        Self::new(format!("{call}: {err}"), kind)
    }

    /// Returns the error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for Error {}

impl BackendError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

/// The document-chat backend over HTTP.
#[derive(Clone, Debug)]
pub struct HttpBackend {
    client: Client,
    config: Arc<HttpBackendConfig>,
}

impl HttpBackend {
    /// Creates a new `HttpBackend` with the given configuration.
    #[inline]
    pub fn new(config: HttpBackendConfig) -> Self {
        Self {
            client: Client::new(),
            config: Arc::new(config),
        }
    }

    fn user_email<'a>(&'a self, query_email: Option<&'a str>) -> &'a str {
        query_email
            .filter(|email| !email.is_empty())
            .unwrap_or(&self.config.user_email)
    }

    /// Every request is JSON, even the ones without a body.
    fn request(&self, method: Method, url: String) -> RequestBuilder {
        self.client
            .request(method, url)
            .header(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
    }

    fn chat_request(&self, req: &ChatRequest) -> RequestBuilder {
        let url = self.config.url(&self.config.endpoints.send_message);
        self.request(Method::POST, url).json(req)
    }

    fn ticket_request(&self, req: &TicketRequest) -> RequestBuilder {
        let url = self.config.url(&self.config.endpoints.create_ticket);
        self.request(Method::POST, url).json(req)
    }

    fn passthrough_request(
        &self,
        endpoint: &str,
        body: &Value,
    ) -> RequestBuilder {
        let url = self.config.url(endpoint);
        self.request(Method::POST, url).json(body)
    }

    /// The document id is a single path segment below the list endpoint.
    fn document_url(&self, document_id: &str) -> String {
        let endpoints = &self.config.endpoints;
        let list = self.config.url(&endpoints.get_topic_document_list);
        match Url::parse(&list) {
            Ok(mut url) => {
                if let Ok(mut segments) = url.path_segments_mut() {
                    segments.pop_if_empty().push(document_id);
                }
                url.into()
            }
            // Sending reports the malformed URL.
            Err(_) => format!("{list}/{document_id}"),
        }
    }

    fn document_request(&self, query: &DocumentQuery) -> RequestBuilder {
        let url = self.document_url(&query.document_id);
        let topic = match query.kind {
            BindingKind::Topic => "true",
            BindingKind::Document => "false",
        };
        let email = self.user_email(query.user_email.as_deref());
        self.request(Method::GET, url)
            .header("user_email", email)
            .header("document_id", &query.document_id)
            .header("topic", topic)
    }

    fn topic_documents_request(&self, topic_id: &str) -> RequestBuilder {
        let endpoints = &self.config.endpoints;
        let url = self.config.url(&endpoints.get_topic_document_list);
        self.request(Method::GET, url).header("topic_id", topic_id)
    }

    fn delete_chat_request(&self, query: &DeleteChatQuery) -> RequestBuilder {
        let url = self.config.url(&self.config.endpoints.delete_chat);
        let email = self.user_email(query.user_email.as_deref());
        self.request(Method::DELETE, url)
            .header("user_email", email)
            .header("document_id", &query.document_id)
            .json(&json!({}))
    }
}

/// Sends the request and decodes a JSON response body.
fn execute<T>(
    call: &'static str,
    builder: RequestBuilder,
) -> impl Future<Output = Result<T, Error>> + Send + 'static
where
    T: DeserializeOwned + Send + 'static,
{
    let resp_fut = builder.send();

    async move {
        debug!("sending {call}");
        let resp = match resp_fut.await.and_then(Response::error_for_status) {
            Ok(resp) => resp,
            Err(err) => return Err(Error::from_reqwest(call, err)),
        };

        let content_type = resp
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok());
        // A missing content type is tolerated, a wrong one is not.
        let is_valid_content_type = content_type
            .map(|v| v.parse().is_ok_and(|m: Mime| is_json(&m)))
            .unwrap_or(true);
        if !is_valid_content_type {
            return Err(Error::new(
                format!("{call}: unexpected content type {content_type:?}"),
                ErrorKind::Decode,
            ));
        }

        resp.json::<T>().await.map_err(|err| {
            Error::new(format!("{call}: {err}"), ErrorKind::Decode)
        })
    }
}

fn is_json(m: &Mime) -> bool {
    m.subtype() == mime::JSON || m.suffix() == Some(mime::JSON)
}

impl ChatBackend for HttpBackend {
    type Error = Error;

    fn send_message(
        &self,
        req: &ChatRequest,
    ) -> impl Future<Output = Result<ChatReply, Self::Error>> + Send + 'static
    {
        execute("send_message", self.chat_request(req))
    }

    fn submit_ticket(
        &self,
        req: &TicketRequest,
    ) -> impl Future<Output = Result<TicketReceipt, Self::Error>> + Send + 'static
    {
        execute("create_ticket", self.ticket_request(req))
    }

    fn fetch_document(
        &self,
        query: &DocumentQuery,
    ) -> impl Future<Output = Result<DocumentInfo, Self::Error>> + Send + 'static
    {
        execute("fetch_document", self.document_request(query))
    }

    fn list_topic_documents(
        &self,
        topic_id: &str,
    ) -> impl Future<Output = Result<Value, Self::Error>> + Send + 'static {
        let builder = self.topic_documents_request(topic_id);
        execute("get_topic_document_list", builder)
    }

    fn list_prompts(
        &self,
        body: &Value,
    ) -> impl Future<Output = Result<Value, Self::Error>> + Send + 'static {
        let endpoint = &self.config.endpoints.get_prompts;
        execute("get_prompts", self.passthrough_request(endpoint, body))
    }

    fn share_questions(
        &self,
        body: &Value,
    ) -> impl Future<Output = Result<Value, Self::Error>> + Send + 'static {
        let endpoint = &self.config.endpoints.share_questions_chat;
        let builder = self.passthrough_request(endpoint, body);
        execute("share_questions_chat", builder)
    }

    fn delete_chat(
        &self,
        query: &DeleteChatQuery,
    ) -> impl Future<Output = Result<Value, Self::Error>> + Send + 'static {
        execute("delete_chat", self.delete_chat_request(query))
    }
}

#[cfg(test)]
mod tests {
    use reqwest::Request;

    use super::*;

    fn backend() -> HttpBackend {
        let config = HttpBackendConfigBuilder::with_base_url("http://host/api")
            .with_user_email("ana@example.com")
            .build();
        HttpBackend::new(config)
    }

    fn header<'a>(req: &'a Request, name: &str) -> Option<&'a str> {
        req.headers().get(name).and_then(|v| v.to_str().ok())
    }

    #[test]
    fn test_document_request_headers() {
        let backend = backend();
        let query = DocumentQuery {
            document_id: "doc-1".to_owned(),
            kind: BindingKind::Topic,
            user_email: None,
        };
        let req = backend.document_request(&query).build().unwrap();
        assert_eq!(req.method(), &Method::GET);
        assert_eq!(
            req.url().as_str(),
            "http://host/api/get_topic_document_list/doc-1"
        );
        assert_eq!(header(&req, "user_email"), Some("ana@example.com"));
        assert_eq!(header(&req, "document_id"), Some("doc-1"));
        assert_eq!(header(&req, "topic"), Some("true"));

        let query = DocumentQuery {
            kind: BindingKind::Document,
            user_email: Some("luis@example.com".to_owned()),
            ..query
        };
        let req = backend.document_request(&query).build().unwrap();
        assert_eq!(header(&req, "user_email"), Some("luis@example.com"));
        assert_eq!(header(&req, "topic"), Some("false"));
    }

    #[test]
    fn test_document_id_is_one_path_segment() {
        let backend = backend();
        let query = DocumentQuery {
            document_id: "manual de riego/v2?draft".to_owned(),
            kind: BindingKind::Document,
            user_email: None,
        };
        let req = backend.document_request(&query).build().unwrap();
        assert_eq!(
            req.url().path(),
            "/api/get_topic_document_list/manual%20de%20riego%2Fv2%3Fdraft"
        );
        assert_eq!(req.url().query(), None);
        assert_eq!(
            header(&req, "document_id"),
            Some("manual de riego/v2?draft")
        );
    }

    #[test]
    fn test_topic_and_delete_request_headers() {
        let backend = backend();
        let req = backend.topic_documents_request("agro").build().unwrap();
        assert_eq!(req.url().path(), "/api/get_topic_document_list");
        assert_eq!(header(&req, "topic_id"), Some("agro"));
        assert_eq!(header(&req, "user_email"), None);

        let query = DeleteChatQuery {
            document_id: "doc-1".to_owned(),
            user_email: None,
        };
        let req = backend.delete_chat_request(&query).build().unwrap();
        assert_eq!(req.method(), &Method::DELETE);
        assert_eq!(header(&req, "user_email"), Some("ana@example.com"));
        assert_eq!(header(&req, "document_id"), Some("doc-1"));
    }

    #[test]
    fn test_chat_request_body() {
        let backend = backend();
        let req = ChatRequest {
            message: "hola".to_owned(),
            language: "spanish".to_owned(),
            topic: "agro".to_owned(),
            summary: false,
            chat_history: vec![],
            vector_id: None,
        };
        let req = backend.chat_request(&req).build().unwrap();
        assert_eq!(req.method(), &Method::POST);
        assert_eq!(req.url().as_str(), "http://host/api/send_message");
        let body = req.body().and_then(|body| body.as_bytes()).unwrap();
        let body: Value = serde_json::from_slice(body).unwrap();
        assert_eq!(body["message"], "hola");
        assert_eq!(body["summary"], false);
    }

    #[test]
    fn test_json_content_types() {
        let parse = |s: &str| s.parse::<Mime>().unwrap();
        assert!(is_json(&parse("application/json")));
        assert!(is_json(&parse("application/json; charset=utf-8")));
        assert!(is_json(&parse("application/problem+json")));
        assert!(!is_json(&parse("text/html")));
    }
}
