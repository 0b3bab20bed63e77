use sea_orm::prelude::DateTimeUtc;
use serde::Serialize;

use crate::domains::registrations;

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationSchema {
    pub id: i32,
    pub tournament_id: String,
    pub name: String,
    pub contact: String,
    pub category: Option<String>,
    pub created_at: DateTimeUtc,
}

impl From<registrations::Model> for RegistrationSchema {
    fn from(registration: registrations::Model) -> Self {
        Self {
            id: registration.id,
            tournament_id: registration.tournament_id,
            name: registration.name,
            contact: registration.contact,
            category: registration.category,
            created_at: registration.created_at.to_utc(),
        }
    }
}

#[derive(Serialize)]
pub struct RegistrationListSchema {
    pub registrations: Vec<RegistrationSchema>,
}

impl From<Vec<registrations::Model>> for RegistrationListSchema {
    fn from(registrations: Vec<registrations::Model>) -> Self {
        Self {
            registrations: registrations
                .into_iter()
                .map(RegistrationSchema::from)
                .collect(),
        }
    }
}
