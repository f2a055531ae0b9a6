use docchat_actor::Actor;
use docchat_model::ChatBackend;

use super::state::{EventFn, SessionState};
use super::{ChatSession, SessionEvent};
use crate::backend_client::BackendClient;
use crate::context::ConversationContext;
use crate::sink::{ClipboardSink, NavigationSink, NotificationSink, Sinks};

/// [`ChatSession`] builder.
pub struct ChatSessionBuilder {
    client: BackendClient,
    sinks: Sinks,
    on_event: Option<EventFn>,
    context: Option<ConversationContext>,
}

impl ChatSessionBuilder {
    /// Creates a new builder talking to `backend`.
    #[inline]
    pub fn with_backend<B: ChatBackend + 'static>(backend: B) -> Self {
        Self {
            client: BackendClient::new(backend),
            sinks: Sinks {
                notifications: None,
                navigation: None,
                clipboard: None,
            },
            on_event: None,
            context: None,
        }
    }

    /// Sets where user-visible notifications go.
    #[inline]
    pub fn on_notification(mut self, sink: impl NotificationSink) -> Self {
        self.sinks.notifications = Some(Box::new(sink));
        self
    }

    /// Sets how the session asks the host to navigate back.
    #[inline]
    pub fn on_navigation(mut self, sink: impl NavigationSink) -> Self {
        self.sinks.navigation = Some(Box::new(sink));
        self
    }

    /// Sets where copied answers go.
    #[inline]
    pub fn on_clipboard(mut self, sink: impl ClipboardSink) -> Self {
        self.sinks.clipboard = Some(Box::new(sink));
        self
    }

    /// Attaches a callback to be invoked for every [`SessionEvent`].
    #[inline]
    pub fn on_event(
        mut self,
        on_event: impl Fn(&SessionEvent) + Send + Sync + 'static,
    ) -> Self {
        self.on_event = Some(Box::new(on_event));
        self
    }

    /// Binds the session to `context` right away.
    #[inline]
    pub fn with_context(mut self, context: ConversationContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Builds the session and starts its loop on the current runtime.
    pub fn build(self) -> ChatSession {
        let Self {
            client,
            sinks,
            on_event,
            context,
        } = self;

        let mut state = SessionState::new(client.clone(), sinks, on_event);
        if let Some(context) = context {
            state.bind(context);
        }
        let actor = Actor::spawn(state, Some("chat session"));
        ChatSession { actor, client }
    }
}
