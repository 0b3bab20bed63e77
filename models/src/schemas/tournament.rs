use sea_orm::prelude::DateTimeUtc;
use serde::Serialize;

use crate::domains::{sea_orm_active_enums::TournamentStatus, tournaments};

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TournamentSchema {
    pub id: String,
    pub title: String,
    pub max_participants: i32,
    pub status: TournamentStatus,
    pub current_round_name: Option<String>,
    pub created_at: DateTimeUtc,
    pub started_at: Option<DateTimeUtc>,
    pub completed_at: Option<DateTimeUtc>,
}

impl From<tournaments::Model> for TournamentSchema {
    fn from(tournament: tournaments::Model) -> Self {
        Self {
            id: tournament.id,
            title: tournament.title,
            max_participants: tournament.max_participants,
            status: tournament.status,
            current_round_name: tournament.current_round_name,
            created_at: tournament.created_at.to_utc(),
            started_at: tournament.started_at.map(|v| v.to_utc()),
            completed_at: tournament.completed_at.map(|v| v.to_utc()),
        }
    }
}
