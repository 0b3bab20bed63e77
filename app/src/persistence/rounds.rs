use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};

use models::domains::{matches, rounds};

use crate::core::bracket::RoundPlan;

pub async fn create_round<C: ConnectionTrait>(
    db: &C,
    tournament_id: &str,
    plan: &RoundPlan,
) -> Result<rounds::Model, DbErr> {
    rounds::ActiveModel {
        tournament_id: Set(tournament_id.to_owned()),
        name: Set(plan.stage.name()),
        kind: Set(plan.stage.kind()),
        order: Set(plan.order),
        max_matches: Set(plan.max_matches()),
        is_completed: Set(false),
        completed_at: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub async fn get_round<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<Option<rounds::Model>, DbErr> {
    rounds::Entity::find_by_id(id).one(db).await
}

/// All rounds of a tournament by ascending `order`.
pub async fn find_rounds<C: ConnectionTrait>(
    db: &C,
    tournament_id: &str,
) -> Result<Vec<rounds::Model>, DbErr> {
    rounds::Entity::find()
        .filter(rounds::Column::TournamentId.eq(tournament_id))
        .order_by_asc(rounds::Column::Order)
        .all(db)
        .await
}

pub async fn count_rounds<C: ConnectionTrait>(db: &C, tournament_id: &str) -> Result<u64, DbErr> {
    rounds::Entity::find()
        .filter(rounds::Column::TournamentId.eq(tournament_id))
        .count(db)
        .await
}

/// Re-derives `is_completed` from the round's matches and persists it when it
/// changed. A round without matches is never complete.
pub async fn refresh_completion<C: ConnectionTrait>(
    db: &C,
    round: rounds::Model,
) -> Result<rounds::Model, DbErr> {
    let total = matches::Entity::find()
        .filter(matches::Column::RoundId.eq(round.id))
        .count(db)
        .await?;
    let open = matches::Entity::find()
        .filter(matches::Column::RoundId.eq(round.id))
        .filter(matches::Column::IsCompleted.eq(false))
        .count(db)
        .await?;
    let completed = total > 0 && open == 0;

    if completed == round.is_completed {
        return Ok(round);
    }

    let mut round: rounds::ActiveModel = round.into();
    round.is_completed = Set(completed);
    round.completed_at = Set(completed.then(|| Utc::now().fixed_offset()));
    round.update(db).await
}
