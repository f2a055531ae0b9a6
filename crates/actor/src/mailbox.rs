use std::fmt::{self, Debug};
use std::sync::Arc;

use tokio::sync::{Notify, mpsc, oneshot};

use crate::{Actor, ActorDeadError};

/// Object-safe form of [`Message`], so that the mailbox can queue
/// heterogeneous messages.
pub trait BoxMessage<S>: Send + Debug + 'static {
    /// Handles the boxed message.
    fn handle_box(self: Box<Self>, state: &mut S, actor: &Actor<S>);
}

/// The message that an actor can handle.
///
/// Handlers run to completion inside the actor loop and never overlap
/// with each other. Long-running work should be spawned as a task that
/// reports back with another message.
pub trait Message<S>: BoxMessage<S> {
    /// Handles the message with mutable access to the actor's state.
    fn handle(self, state: &mut S, actor: &Actor<S>);
}

impl<S, M: Message<S>> BoxMessage<S> for M {
    #[inline]
    fn handle_box(self: Box<Self>, state: &mut S, actor: &Actor<S>) {
        (*self).handle(state, actor)
    }
}

pub(crate) type BoxedMessage<S> = Box<dyn BoxMessage<S>>;

type AskFn<S, R> = Box<dyn FnOnce(&mut S, &Actor<S>) -> R + Send>;

/// Runs a closure against the state and sends its value back.
pub(crate) struct Ask<S, R> {
    pub f: AskFn<S, R>,
    pub reply_tx: oneshot::Sender<R>,
}

impl<S, R> Debug for Ask<S, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ask").finish_non_exhaustive()
    }
}

impl<S: 'static, R: Send + 'static> Message<S> for Ask<S, R> {
    fn handle(self, state: &mut S, actor: &Actor<S>) {
        let value = (self.f)(state, actor);
        if self.reply_tx.send(value).is_err() {
            trace!("asker is gone, dropping the reply");
        }
    }
}

pub(crate) struct Mailbox<S> {
    msg_tx: mpsc::UnboundedSender<BoxedMessage<S>>,
    kill: Arc<Notify>,
}

pub(crate) struct MailboxParts<S> {
    pub mailbox: Mailbox<S>,
    pub msg_rx: mpsc::UnboundedReceiver<BoxedMessage<S>>,
    pub kill: Arc<Notify>,
}

impl<S: Send + 'static> Mailbox<S> {
    pub fn new() -> MailboxParts<S> {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        let kill = Arc::new(Notify::new());
        MailboxParts {
            mailbox: Mailbox {
                msg_tx,
                kill: Arc::clone(&kill),
            },
            msg_rx,
            kill,
        }
    }

    #[inline]
    pub fn post(&self, msg: BoxedMessage<S>) -> Result<(), ActorDeadError> {
        self.msg_tx.send(msg).map_err(|_| ActorDeadError)
    }

    #[inline]
    pub fn kill(&self) {
        // `notify_one` stores a permit, so a kill requested before the
        // loop starts waiting is not lost.
        self.kill.notify_one();
    }
}
