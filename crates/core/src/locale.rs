//! User-facing texts of the chat view.

use crate::sink::Notification;

/// The language the chat view talks in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Locale {
    /// English.
    English,
    /// Spanish, used for every language code other than `english`.
    #[default]
    Spanish,
}

impl Locale {
    /// Picks the locale for a conversation language code.
    #[inline]
    pub fn from_code(code: &str) -> Self {
        if code == "english" {
            Locale::English
        } else {
            Locale::Spanish
        }
    }

    /// Text shown in an answer placeholder.
    pub fn loading(self) -> &'static str {
        match self {
            Locale::English => "Generating answer",
            Locale::Spanish => "Generando respuesta",
        }
    }

    /// Greeting seeded when a document gets bound.
    pub fn document_greeting(self, alias: &str) -> String {
        match self {
            Locale::English => format!("Chatting with the document: {alias}"),
            Locale::Spanish => format!("Chateando con el documento: {alias}"),
        }
    }

    /// Placeholder of the message input when no topic is selected.
    pub fn select_topic(self) -> &'static str {
        match self {
            Locale::English => "Select a topic",
            Locale::Spanish => "Seleccione un tópico",
        }
    }

    pub(crate) fn chat_failed(self) -> Notification {
        match self {
            Locale::English => Notification::failure(
                "Service not available",
                "Could not get the answer to your question, please try again later.",
            ),
            Locale::Spanish => Notification::failure(
                "Servicio no disponible",
                "No se ha podido obtener la respuesta a tu pregunta, inténtelo de nuevo más tarde.",
            ),
        }
    }

    pub(crate) fn ticket_created(self) -> Notification {
        match self {
            Locale::English => Notification::success(
                "The ticket has been created successfully",
            ),
            Locale::Spanish => {
                Notification::success("El ticket se ha creado con éxito")
            }
        }
    }

    pub(crate) fn ticket_failed(self) -> Notification {
        match self {
            Locale::English => Notification::failure(
                "Ticket has not been created",
                "The ticket could not be generated, please try again later.",
            ),
            Locale::Spanish => Notification::failure(
                "No se ha creado el ticket",
                "No se ha podido generar el ticket, inténtelo de nuevo más tarde.",
            ),
        }
    }

    pub(crate) fn answer_copied(self) -> Notification {
        match self {
            Locale::English => Notification::success(
                "The answer has been copied to the clipboard",
            ),
            Locale::Spanish => Notification::success(
                "La respuesta ha sido copiada al portapapeles",
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anything_but_english_is_spanish() {
        assert_eq!(Locale::from_code("english"), Locale::English);
        assert_eq!(Locale::from_code("English"), Locale::Spanish);
        assert_eq!(Locale::from_code("spanish"), Locale::Spanish);
        assert_eq!(Locale::from_code(""), Locale::Spanish);
    }

    #[test]
    fn test_greeting_names_the_document() {
        assert_eq!(
            Locale::Spanish.document_greeting("Manual"),
            "Chateando con el documento: Manual"
        );
        assert!(!Locale::English.chat_failed().success);
    }
}
