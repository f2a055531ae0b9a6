//! The chat session engine: conversation state, the optimistic
//! send-and-reconcile protocol against the backend, and the escalation of
//! unresolved answers into support tickets.

#![deny(missing_docs)]
#![deny(clippy::missing_safety_doc)]

#[macro_use]
extern crate tracing;

mod backend_client;
pub mod context;
mod error;
pub mod escalation;
pub mod exchange;
mod locale;
mod prompt;
mod session;
pub mod sink;
mod store;
pub mod turn;

pub use context::{BindOutcome, BoundDocument, ConversationContext};
pub use error::{Error, ErrorKind, Rejection, TransportError};
pub use escalation::{
    EscalationState, FieldError, FieldErrors, TicketDraft, TicketField,
};
pub use locale::Locale;
pub use prompt::{HISTORY_WINDOW, compose};
pub use session::{
    ChatSession, ChatSessionBuilder, SessionEvent, SessionSnapshot,
};
pub use sink::{ClipboardSink, NavigationSink, Notification, NotificationSink};
pub use store::MessageStore;
pub use turn::{ChatTurn, Escalation, Speaker};
