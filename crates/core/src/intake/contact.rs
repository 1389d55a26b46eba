use std::sync::Arc;

use maud::html;
use serde::{Deserialize, Serialize};

use super::mailer::{Email, Mailer};
use super::{messages, present, IntakeError};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContactRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactSent {
    pub id: String,
}

/// Forwards contact form messages to the site's inbox. Replies go to the
/// sender.
#[derive(Clone)]
pub struct ContactIntake {
    mailer: Arc<dyn Mailer>,
    from: String,
    to: String,
}

impl ContactIntake {
    pub fn new(mailer: Arc<dyn Mailer>, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            mailer,
            from: from.into(),
            to: to.into(),
        }
    }

    pub async fn submit(&self, request: ContactRequest) -> Result<ContactSent, IntakeError> {
        let (Some(name), Some(email), Some(subject), Some(message)) = (
            present(&request.name),
            present(&request.email),
            present(&request.subject),
            present(&request.message),
        ) else {
            return Err(IntakeError::Invalid(messages::MISSING_CONTACT_FIELDS));
        };
        let phone = present(&request.phone);

        let body = html! {
            h2 { "Nieuw bericht via het contactformulier" }
            p { strong { "Naam: " } (name) }
            p { strong { "E-mail: " } (email) }
            @if let Some(phone) = phone {
                p { strong { "Telefoon: " } (phone) }
            }
            p { strong { "Onderwerp: " } (subject) }
            p { strong { "Bericht:" } }
            @for line in message.lines() {
                p { (line) }
            }
        };

        let outgoing = Email {
            from: self.from.clone(),
            to: vec![self.to.clone()],
            reply_to: Some(email.to_string()),
            subject: format!("Contactformulier: {subject}"),
            html: body.into_string(),
        };

        match self.mailer.send(&outgoing).await {
            Ok(id) => {
                tracing::info!(message_id = %id, "contact message sent");
                Ok(ContactSent { id })
            }
            Err(err) => {
                tracing::error!(error = %err, "contact message not sent");
                Err(err.into())
            }
        }
    }
}
