use docchat_model::ChatRequest;

use crate::context::ConversationContext;
use crate::turn::ChatTurn;

/// Number of prior turns sent along with a question.
pub const HISTORY_WINDOW: usize = 6;

/// Builds the request for `text`.
///
/// `history` is the trailing window of the store taken right before the
/// question is appended.
pub fn compose(
    text: &str,
    context: &ConversationContext,
    history: &[ChatTurn],
) -> ChatRequest {
    ChatRequest {
        message: text.to_owned(),
        language: context.language_code.clone(),
        topic: context.topic_id.clone(),
        summary: false,
        chat_history: history.iter().map(ChatTurn::to_history).collect(),
        vector_id: context.vector_id().map(str::to_owned),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use docchat_model::Talker;

    use super::*;
    use crate::context::BoundDocument;

    #[test]
    fn test_compose_without_document() {
        let context = ConversationContext {
            topic_id: "agro".to_owned(),
            language_code: "spanish".to_owned(),
            ..Default::default()
        };
        let now = Utc::now();
        let history =
            [ChatTurn::human("hola", now), ChatTurn::system("x", now)];

        let req = compose("¿qué tal?", &context, &history);
        assert_eq!(req.message, "¿qué tal?");
        assert_eq!(req.language, "spanish");
        assert_eq!(req.topic, "agro");
        assert!(!req.summary);
        assert_eq!(req.vector_id, None);
        let talkers: Vec<_> =
            req.chat_history.iter().map(|turn| turn.talker).collect();
        assert_eq!(talkers, [Talker::Human, Talker::System]);

        assert_eq!(compose("¿qué tal?", &context, &history), req);
    }

    #[test]
    fn test_compose_forwards_vector_id() {
        let context = ConversationContext {
            document: Some(BoundDocument {
                id: "doc-1".to_owned(),
                alias: "Manual".to_owned(),
                vector_id: Some("vec-1".to_owned()),
            }),
            ..Default::default()
        };
        let req = compose("hola", &context, &[]);
        assert_eq!(req.vector_id.as_deref(), Some("vec-1"));
        assert!(req.chat_history.is_empty());
    }
}
