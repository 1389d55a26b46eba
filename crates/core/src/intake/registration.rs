use std::sync::{Arc, LazyLock};

use chrono::Utc;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use super::{messages, present, IntakeError};
use crate::query::{Filter, Params, Query};
use crate::store::ContentStore;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegistrationRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub message: Option<String>,
    pub buurt_actie_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registered {
    pub id: String,
}

/// Signs people up for a community action.
///
/// The duplicate check is a read followed by a separate write. Two
/// concurrent submissions for the same address can both pass the check and
/// both be stored.
#[derive(Clone)]
pub struct RegistrationIntake {
    store: Arc<dyn ContentStore>,
}

impl RegistrationIntake {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    pub async fn submit(&self, request: RegistrationRequest) -> Result<Registered, IntakeError> {
        let (Some(name), Some(email), Some(action_id)) = (
            present(&request.name),
            present(&request.email),
            present(&request.buurt_actie_id),
        ) else {
            return Err(IntakeError::Invalid(messages::MISSING_REGISTRATION_FIELDS));
        };
        if !is_valid_email(email) {
            return Err(IntakeError::Invalid(messages::INVALID_EMAIL));
        }
        let email = email.to_lowercase();

        let mut params = Params::new();
        params.insert("email".into(), Value::String(email.clone()));
        params.insert("actionId".into(), Value::String(action_id.to_string()));
        let existing = self.store.fetch_first(&duplicate_query(), &params).await?;
        if existing.is_some() {
            tracing::info!(action_id, "duplicate registration rejected");
            return Err(IntakeError::AlreadyRegistered);
        }

        let id = Uuid::new_v4().to_string();
        let mut doc = json!({
            "_id": &id,
            "_type": "registration",
            "name": name,
            "email": email,
            "buurtActie": {"_type": "reference", "_ref": action_id},
            "registeredAt": Utc::now(),
        });
        if let Some(phone) = present(&request.phone) {
            doc["phone"] = Value::String(phone.to_string());
        }
        if let Some(message) = present(&request.message) {
            doc["message"] = Value::String(message.to_string());
        }
        self.store.create(doc).await?;
        tracing::info!(registration_id = %id, action_id, "registration stored");
        Ok(Registered { id })
    }
}

fn duplicate_query() -> Query {
    Query::of_type("registration")
        .filter(Filter::eq_param("email", "email").and(Filter::eq_param("buurtActie._ref", "actionId")))
        .limit(1)
}
