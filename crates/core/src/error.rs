use std::fmt::{self, Display};

use docchat_actor::ActorDeadError;
use docchat_model::{BackendError, ErrorKind as BackendErrorKind};

use crate::escalation::FieldErrors;

/// The kind of error that occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The ticket form has invalid fields.
    Validation,
    /// A backend request failed. The session rolled back to its last
    /// consistent state and the user may retry.
    RecoverableTransport,
    /// The operation is not allowed in the current state.
    Precondition,
    /// The session loop has terminated.
    SessionClosed,
}

/// Why an operation was refused without doing anything.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Rejection {
    /// The text to send is empty or whitespace-only.
    EmptyInput,
    /// Another exchange is still waiting for its answer.
    ExchangePending,
    /// The turn doesn't offer an escalation.
    NoEscalationOffer,
    /// The ticket dialog is not open.
    DialogClosed,
    /// A ticket submission is still waiting for its answer.
    SubmissionPending,
    /// There's no turn at the requested index.
    NoSuchTurn,
    /// The document is not ready to chat with.
    DocumentInactive,
}

impl Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Rejection::EmptyInput => "nothing to send",
            Rejection::ExchangePending => "an exchange is already pending",
            Rejection::NoEscalationOffer => "the turn offers no escalation",
            Rejection::DialogClosed => "the ticket dialog is closed",
            Rejection::SubmissionPending => "a ticket submission is pending",
            Rejection::NoSuchTurn => "no such turn",
            Rejection::DocumentInactive => "the document is not active",
        };
        f.write_str(reason)
    }
}

/// A failed backend request.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TransportError {
    kind: BackendErrorKind,
    message: String,
}

impl TransportError {
    /// Creates a transport error.
    #[inline]
    pub fn new(kind: BackendErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub(crate) fn from_backend<E: BackendError>(err: &E) -> Self {
        Self::new(err.kind(), err.to_string())
    }

    /// Returns what went wrong on the backend side.
    #[inline]
    pub fn kind(&self) -> BackendErrorKind {
        self.kind
    }

    /// Returns the error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Errors returned by the chat session.
///
/// Results that arrive for a conversation that was reset are not errors of
/// any call; they are reported as [`crate::SessionEvent::StaleDiscarded`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// The ticket form has invalid fields.
    Validation(FieldErrors),
    /// A backend request failed.
    Transport(TransportError),
    /// The operation was refused.
    Rejected(Rejection),
    /// The session loop has terminated.
    SessionClosed,
}

impl Error {
    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) => ErrorKind::Validation,
            Error::Transport(_) => ErrorKind::RecoverableTransport,
            Error::Rejected(_) => ErrorKind::Precondition,
            Error::SessionClosed => ErrorKind::SessionClosed,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Validation(errors) => {
                write!(f, "invalid ticket fields:")?;
                for (field, error) in errors {
                    write!(f, " {field} ({error})")?;
                }
                Ok(())
            }
            Error::Transport(err) => write!(f, "request failed: {err}"),
            Error::Rejected(rejection) => write!(f, "rejected: {rejection}"),
            Error::SessionClosed => write!(f, "the session has been closed"),
        }
    }
}

impl std::error::Error for Error {}

impl From<Rejection> for Error {
    #[inline]
    fn from(rejection: Rejection) -> Self {
        Error::Rejected(rejection)
    }
}

impl From<TransportError> for Error {
    #[inline]
    fn from(err: TransportError) -> Self {
        Error::Transport(err)
    }
}

impl From<ActorDeadError> for Error {
    #[inline]
    fn from(_: ActorDeadError) -> Self {
        Error::SessionClosed
    }
}
