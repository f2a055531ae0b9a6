use std::error::Error;
use std::fmt;

/// A type of error which can be returned whenever messages are sent to
/// an actor whose loop has terminated.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ActorDeadError;

impl fmt::Debug for ActorDeadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ActorDeadError")
    }
}

impl fmt::Display for ActorDeadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("the actor loop has terminated")
    }
}

impl Error for ActorDeadError {}
