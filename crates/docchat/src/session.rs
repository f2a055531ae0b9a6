use docchat_core::{
    ChatSession, ChatSessionBuilder, ConversationContext, Notification,
    SessionEvent,
};
use docchat_http_backend::{HttpBackend, HttpBackendConfig};
use docchat_model::ChatBackend;

/// A session builder.
///
/// See [`ChatSession`].
pub struct SessionBuilder {
    inner: ChatSessionBuilder,
    topic: Option<ConversationContext>,
}

impl SessionBuilder {
    /// Creates a session builder talking to the HTTP backend described by
    /// `config`.
    pub fn with_http_config(config: HttpBackendConfig) -> Self {
        debug!("using http backend: {config:?}");
        Self::with_backend(HttpBackend::new(config))
    }

    /// Creates a session builder with a specified backend.
    pub fn with_backend<B: ChatBackend + 'static>(backend: B) -> Self {
        Self {
            inner: ChatSessionBuilder::with_backend(backend),
            topic: None,
        }
    }

    /// Selects the topic the session starts in. No document is bound yet.
    #[inline]
    pub fn with_topic<I, N, L>(
        mut self,
        topic_id: I,
        topic_name: N,
        language_code: L,
    ) -> Self
    where
        I: Into<String>,
        N: Into<String>,
        L: Into<String>,
    {
        self.topic = Some(ConversationContext {
            topic_id: topic_id.into(),
            topic_name: topic_name.into(),
            language_code: language_code.into(),
            document: None,
        });
        self
    }

    /// Attaches a callback to be invoked for user-visible notifications.
    #[inline]
    pub fn on_notification(
        mut self,
        on_notification: impl Fn(Notification) + Send + Sync + 'static,
    ) -> Self {
        self.inner = self.inner.on_notification(on_notification);
        self
    }

    /// Attaches a callback to be invoked when an answer is copied.
    #[inline]
    pub fn on_clipboard(
        mut self,
        on_clipboard: impl Fn(&str) + Send + Sync + 'static,
    ) -> Self {
        self.inner = self.inner.on_clipboard(on_clipboard);
        self
    }

    /// Attaches a callback to be invoked when the user steps back to the
    /// topic selection.
    #[inline]
    pub fn on_step_back(
        mut self,
        on_step_back: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        self.inner = self.inner.on_navigation(on_step_back);
        self
    }

    /// Attaches a callback to be invoked for every [`SessionEvent`].
    #[inline]
    pub fn on_event(
        mut self,
        on_event: impl Fn(&SessionEvent) + Send + Sync + 'static,
    ) -> Self {
        self.inner = self.inner.on_event(on_event);
        self
    }

    /// Builds a new session.
    pub fn build(self) -> ChatSession {
        let Self { inner, topic } = self;
        match topic {
            Some(topic) => inner.with_context(topic).build(),
            None => inner.build(),
        }
    }
}
