use std::fmt::{self, Display};

/// The kind of error that occurred while talking to the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The backend could not be reached.
    Unavailable,
    /// The backend answered with a non-success status code.
    Status(u16),
    /// The response body could not be decoded.
    Decode,
    /// Any other errors.
    Other,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Unavailable => write!(f, "backend unavailable"),
            ErrorKind::Status(code) => write!(f, "backend returned {code}"),
            ErrorKind::Decode => write!(f, "malformed backend response"),
            ErrorKind::Other => write!(f, "backend error"),
        }
    }
}
