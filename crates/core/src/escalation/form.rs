use std::collections::BTreeMap;
use std::fmt::{self, Display};
use std::sync::LazyLock;

use docchat_model::TicketRequest;
use regex::Regex;

// Mirrors the shape browsers accept for `type=email` inputs. The length
// limits are checked separately since `regex` has no lookahead.
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[a-zA-Z0-9!#$%&'*+/=?^_`{|}~-]+)*@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("email pattern is valid")
});

const MAX_EMAIL_LEN: usize = 254;
const MAX_LOCAL_PART_LEN: usize = 64;

/// A field of the ticket form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TicketField {
    /// Requester name.
    Name,
    /// Requester email.
    Email,
    /// Ticket description.
    Description,
}

impl Display for TicketField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TicketField::Name => f.write_str("name"),
            TicketField::Email => f.write_str("email"),
            TicketField::Description => f.write_str("description"),
        }
    }
}

/// Why a field is invalid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldError {
    /// The field is empty.
    Required,
    /// The field is not a valid email address.
    InvalidEmail,
}

impl Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldError::Required => f.write_str("required"),
            FieldError::InvalidEmail => f.write_str("invalid email"),
        }
    }
}

/// Invalid fields of a ticket form. Empty when the form is valid.
pub type FieldErrors = BTreeMap<TicketField, FieldError>;

/// The content of the ticket dialog.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct TicketDraft {
    name: String,
    email: String,
    description: String,
}

impl TicketDraft {
    /// Creates an empty draft prefilled with `description`.
    #[inline]
    pub fn with_description<S: Into<String>>(description: S) -> Self {
        Self {
            description: description.into(),
            ..Default::default()
        }
    }

    /// Returns the requester name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the requester email.
    #[inline]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns the description.
    #[inline]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Sets the requester name.
    #[inline]
    pub fn set_name<S: Into<String>>(&mut self, name: S) {
        self.name = name.into();
    }

    /// Sets the requester email. Whitespace is dropped as it's typed.
    pub fn set_email(&mut self, email: &str) {
        self.email = email.chars().filter(|c| !c.is_whitespace()).collect();
    }

    /// Sets the description.
    #[inline]
    pub fn set_description<S: Into<String>>(&mut self, description: S) {
        self.description = description.into();
    }

    /// Validates every field.
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.name.trim().is_empty() {
            errors.insert(TicketField::Name, FieldError::Required);
        }
        if self.email.is_empty() {
            errors.insert(TicketField::Email, FieldError::Required);
        } else if !is_valid_email(&self.email) {
            errors.insert(TicketField::Email, FieldError::InvalidEmail);
        }
        if self.description.trim().is_empty() {
            errors.insert(TicketField::Description, FieldError::Required);
        }
        errors
    }

    /// Whether the draft can be submitted.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    pub(crate) fn to_request(&self) -> TicketRequest {
        TicketRequest {
            name: self.name.clone(),
            email: self.email.clone(),
            description: self.description.clone(),
        }
    }
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, _)) = email.split_once('@') else {
        return false;
    };
    email.len() <= MAX_EMAIL_LEN
        && local.len() <= MAX_LOCAL_PART_LEN
        && EMAIL_PATTERN.is_match(email)
}
