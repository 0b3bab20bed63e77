use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};

use models::domains::{matches, rounds};

use crate::core::bracket::{Pairing, Stage};

/// Inserts one match per pairing, coded in pairing order. BYE pairings are
/// stored already won by the present player.
pub async fn create_matches<C: ConnectionTrait>(
    db: &C,
    round: &rounds::Model,
    pairings: &[Pairing],
    actor: &str,
) -> Result<Vec<matches::Model>, DbErr> {
    let stage = Stage::of_round(round);
    let now = Utc::now().fixed_offset();
    let mut created = Vec::with_capacity(pairings.len());

    for (index, pairing) in pairings.iter().enumerate() {
        let bye = pairing.is_bye();
        let model = matches::ActiveModel {
            tournament_id: Set(round.tournament_id.clone()),
            round_id: Set(round.id),
            match_code: Set(stage.match_code(index)),
            player1_id: Set(Some(pairing.player1)),
            player2_id: Set(pairing.player2),
            winner_id: Set(bye.then_some(pairing.player1)),
            score: Set(None),
            is_completed: Set(bye),
            scheduled_at: Set(None),
            completed_at: Set(bye.then_some(now)),
            recorded_by: Set(bye.then(|| actor.to_owned())),
            ..Default::default()
        }
        .insert(db)
        .await?;
        created.push(model);
    }

    Ok(created)
}

pub async fn get_match<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<Option<matches::Model>, DbErr> {
    matches::Entity::find_by_id(id).one(db).await
}

/// Matches of a round in ascending match-code order.
pub async fn find_round_matches<C: ConnectionTrait>(
    db: &C,
    round_id: i32,
) -> Result<Vec<matches::Model>, DbErr> {
    matches::Entity::find()
        .filter(matches::Column::RoundId.eq(round_id))
        .order_by_asc(matches::Column::MatchCode)
        .all(db)
        .await
}

pub async fn find_tournament_matches<C: ConnectionTrait>(
    db: &C,
    tournament_id: &str,
) -> Result<Vec<matches::Model>, DbErr> {
    matches::Entity::find()
        .filter(matches::Column::TournamentId.eq(tournament_id))
        .order_by_asc(matches::Column::RoundId)
        .order_by_asc(matches::Column::MatchCode)
        .all(db)
        .await
}

pub async fn count_round_matches<C: ConnectionTrait>(db: &C, round_id: i32) -> Result<u64, DbErr> {
    matches::Entity::find()
        .filter(matches::Column::RoundId.eq(round_id))
        .count(db)
        .await
}

pub async fn complete_match<C: ConnectionTrait>(
    db: &C,
    m: matches::Model,
    winner_id: i32,
    score: Option<String>,
    actor: &str,
) -> Result<matches::Model, DbErr> {
    let mut m: matches::ActiveModel = m.into();
    m.winner_id = Set(Some(winner_id));
    m.score = Set(score);
    m.is_completed = Set(true);
    m.completed_at = Set(Some(Utc::now().fixed_offset()));
    m.recorded_by = Set(Some(actor.to_owned()));
    m.update(db).await
}

/// Clears a recorded result so it can be entered again.
pub async fn clear_result<C: ConnectionTrait>(
    db: &C,
    m: matches::Model,
    actor: &str,
) -> Result<matches::Model, DbErr> {
    let mut m: matches::ActiveModel = m.into();
    m.winner_id = Set(None);
    m.score = Set(None);
    m.is_completed = Set(false);
    m.completed_at = Set(None);
    m.recorded_by = Set(Some(actor.to_owned()));
    m.update(db).await
}
