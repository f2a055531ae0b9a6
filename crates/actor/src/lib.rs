//! A lightweight actor runtime.
//!
//! Every actor owns its state exclusively and handles one message at a
//! time, in the order the messages were posted. This gives callers a
//! single-threaded, cooperative view of the state even when the actor is
//! driven from several tasks.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod error;
mod handle;
mod mailbox;
mod scheduler;

pub use error::ActorDeadError;
pub use handle::Actor;
pub use mailbox::{BoxMessage, Message};

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::timeout;

    use super::*;

    #[derive(Default)]
    struct Counter {
        value: u32,
        log: Vec<u32>,
    }

    #[derive(Debug)]
    struct Add(u32);

    impl Message<Counter> for Add {
        fn handle(self, state: &mut Counter, _actor: &Actor<Counter>) {
            state.value += self.0;
            state.log.push(self.0);
        }
    }

    #[derive(Debug)]
    struct AddLater(u32);

    impl Message<Counter> for AddLater {
        fn handle(self, _state: &mut Counter, actor: &Actor<Counter>) {
            let actor = actor.clone();
            let amount = self.0;
            tokio::spawn(async move {
                actor.send(Add(amount)).ok();
            });
        }
    }

    #[tokio::test]
    async fn test_messages_are_handled_in_order() {
        let actor = Actor::spawn(Counter::default(), Some("counter"));
        for i in 1..=5 {
            actor.send(Add(i)).unwrap();
        }
        let (value, log) = actor
            .ask(|state, _| (state.value, state.log.clone()))
            .await
            .unwrap();
        assert_eq!(value, 15);
        assert_eq!(log, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_handler_can_post_back() {
        let actor = Actor::spawn(Counter::default(), None);
        actor.send(AddLater(7)).unwrap();
        timeout(Duration::from_millis(500), async {
            loop {
                if actor.ask(|state, _| state.value).await.unwrap() == 7 {
                    break;
                }
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_killed_actor_rejects_messages() {
        let actor = Actor::spawn(Counter::default(), None);
        actor.try_kill();
        timeout(Duration::from_millis(500), async {
            while actor.send(Add(1)).is_ok() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
        let result = actor.ask(|state, _| state.value).await;
        assert_eq!(result, Err(ActorDeadError));
    }
}
