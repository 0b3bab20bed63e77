use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectionTrait, DbErr, EntityTrait, Set};

use models::domains::{sea_orm_active_enums::TournamentStatus, tournaments};
use models::params::tournament::CreateTournamentParams;

const TOURNAMENT_ID_LENGTH: usize = 24;

pub async fn create_tournament<C: ConnectionTrait>(
    db: &C,
    params: CreateTournamentParams,
) -> Result<tournaments::Model, DbErr> {
    let id = nanoid::nanoid!(TOURNAMENT_ID_LENGTH, &super::ID_ALPHABET);
    let seed = params
        .seed
        .map(|seed| seed as i64)
        .unwrap_or_else(rand::random::<i64>);
    let now = Utc::now().fixed_offset();

    tournaments::ActiveModel {
        id: Set(id),
        title: Set(params.title),
        max_participants: Set(params.max_participants),
        status: Set(TournamentStatus::Draft),
        current_round_name: Set(None),
        seed: Set(seed),
        created_at: Set(now),
        updated_at: Set(now),
        started_at: Set(None),
        completed_at: Set(None),
    }
    .insert(db)
    .await
}

pub async fn get_tournament<C: ConnectionTrait>(
    db: &C,
    id: &str,
) -> Result<Option<tournaments::Model>, DbErr> {
    tournaments::Entity::find_by_id(id.to_owned()).one(db).await
}

/// Marks the bracket as live on its first round.
pub async fn activate<C: ConnectionTrait>(
    db: &C,
    tournament: tournaments::Model,
    first_round_name: String,
) -> Result<tournaments::Model, DbErr> {
    let now = Utc::now().fixed_offset();
    let mut tournament: tournaments::ActiveModel = tournament.into();
    tournament.status = Set(TournamentStatus::Active);
    tournament.current_round_name = Set(Some(first_round_name));
    tournament.started_at = Set(Some(now));
    tournament.updated_at = Set(now);
    tournament.update(db).await
}

pub async fn set_current_round<C: ConnectionTrait>(
    db: &C,
    tournament: tournaments::Model,
    round_name: String,
) -> Result<tournaments::Model, DbErr> {
    let mut tournament: tournaments::ActiveModel = tournament.into();
    tournament.current_round_name = Set(Some(round_name));
    tournament.updated_at = Set(Utc::now().fixed_offset());
    tournament.update(db).await
}

pub async fn set_status<C: ConnectionTrait>(
    db: &C,
    tournament: tournaments::Model,
    status: TournamentStatus,
) -> Result<tournaments::Model, DbErr> {
    let now = Utc::now().fixed_offset();
    let mut tournament: tournaments::ActiveModel = tournament.into();
    tournament.status = Set(status);
    tournament.updated_at = Set(now);
    match status {
        TournamentStatus::Completed => tournament.completed_at = Set(Some(now)),
        TournamentStatus::Active => tournament.completed_at = Set(None),
        _ => {}
    }
    tournament.update(db).await
}
