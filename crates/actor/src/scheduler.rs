use std::sync::{Arc, Weak};

use tokio::select;
use tokio::sync::{Notify, mpsc};

use crate::Actor;
use crate::mailbox::{BoxedMessage, Mailbox};

pub(crate) async fn run_actor<S: Send + 'static>(
    mailbox: Weak<Mailbox<S>>,
    mut state: S,
    mut msg_rx: mpsc::UnboundedReceiver<BoxedMessage<S>>,
    kill: Arc<Notify>,
) {
    debug!("started");
    loop {
        let msg = select! {
            biased;

            _ = kill.notified() => {
                debug!("kill requested");
                break;
            }
            msg = msg_rx.recv() => {
                let Some(msg) = msg else {
                    break;
                };
                msg
            }
        };

        let Some(mailbox) = mailbox.upgrade() else {
            warn!("every handle has been dropped, discarding {msg:?}");
            break;
        };
        let actor = Actor::from_mailbox(mailbox);

        let span = trace_span!("handle", msg = ?msg);
        span.in_scope(|| msg.handle_box(&mut state, &actor));
    }
    debug!("terminated");
}
