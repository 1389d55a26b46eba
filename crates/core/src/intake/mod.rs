//! Public form intake: event registrations and the contact form.

pub mod contact;
pub mod mailer;
pub mod registration;

use thiserror::Error;

use crate::store::StoreError;

pub use contact::{ContactIntake, ContactRequest, ContactSent};
pub use mailer::{Email, LogMailer, MailError, Mailer, ResendMailer};
pub use registration::{Registered, RegistrationIntake, RegistrationRequest};

/// User-facing messages, in the site's language.
pub mod messages {
    pub const MISSING_REGISTRATION_FIELDS: &str = "Naam, e-mail en buurt actie zijn verplicht";
    pub const INVALID_EMAIL: &str = "Ongeldig e-mailadres";
    pub const ALREADY_REGISTERED: &str = "Je bent al ingeschreven voor deze buurt actie";
    pub const REGISTERED: &str = "Je bent succesvol ingeschreven!";
    pub const REGISTRATION_FAILED: &str = "Er ging iets mis bij het inschrijven";
    pub const MISSING_CONTACT_FIELDS: &str = "Naam, e-mail, onderwerp en bericht zijn verplicht";
    pub const SEND_FAILED: &str = "Er ging iets mis bij het verzenden van je bericht";
}

#[derive(Debug, Error)]
pub enum IntakeError {
    /// The submission itself is wrong; the message is shown as is.
    #[error("{0}")]
    Invalid(&'static str),

    #[error("{}", messages::ALREADY_REGISTERED)]
    AlreadyRegistered,

    #[error(transparent)]
    Mail(#[from] MailError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntakeError {
    /// Whether the submitter can fix this by changing the input.
    pub fn is_client_error(&self) -> bool {
        matches!(self, IntakeError::Invalid(_) | IntakeError::AlreadyRegistered)
    }

    /// Message safe to show the submitter. Upstream details stay in the logs.
    pub fn user_message(&self) -> &'static str {
        match self {
            IntakeError::Invalid(message) => *message,
            IntakeError::AlreadyRegistered => messages::ALREADY_REGISTERED,
            IntakeError::Mail(_) => messages::SEND_FAILED,
            IntakeError::Store(_) => messages::REGISTRATION_FAILED,
        }
    }
}

/// Trimmed value of a form field, `None` when absent or blank.
pub(crate) fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
