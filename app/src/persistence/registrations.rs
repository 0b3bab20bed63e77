use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};

use models::domains::registrations;
use models::params::registration::{CorrectRegistrationParams, RegisterParticipantParams};

pub async fn create_registration<C: ConnectionTrait>(
    db: &C,
    tournament_id: &str,
    params: RegisterParticipantParams,
) -> Result<registrations::Model, DbErr> {
    let now = Utc::now().fixed_offset();
    registrations::ActiveModel {
        tournament_id: Set(tournament_id.to_owned()),
        name: Set(params.name),
        contact: Set(params.contact),
        category: Set(params.category),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub async fn get_registration<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<Option<registrations::Model>, DbErr> {
    registrations::Entity::find_by_id(id).one(db).await
}

/// Registrations of a tournament in the order they were taken.
pub async fn find_registrations<C: ConnectionTrait>(
    db: &C,
    tournament_id: &str,
) -> Result<Vec<registrations::Model>, DbErr> {
    registrations::Entity::find()
        .filter(registrations::Column::TournamentId.eq(tournament_id))
        .order_by_asc(registrations::Column::Id)
        .all(db)
        .await
}

pub async fn count_registrations<C: ConnectionTrait>(
    db: &C,
    tournament_id: &str,
) -> Result<u64, DbErr> {
    registrations::Entity::find()
        .filter(registrations::Column::TournamentId.eq(tournament_id))
        .count(db)
        .await
}

pub async fn find_by_contact<C: ConnectionTrait>(
    db: &C,
    tournament_id: &str,
    contact: &str,
) -> Result<Option<registrations::Model>, DbErr> {
    registrations::Entity::find()
        .filter(registrations::Column::TournamentId.eq(tournament_id))
        .filter(registrations::Column::Contact.eq(contact))
        .one(db)
        .await
}

pub async fn update_registration<C: ConnectionTrait>(
    db: &C,
    registration: registrations::Model,
    params: CorrectRegistrationParams,
) -> Result<registrations::Model, DbErr> {
    let mut registration: registrations::ActiveModel = registration.into();
    if let Some(name) = params.name {
        registration.name = Set(name);
    }
    if let Some(contact) = params.contact {
        registration.contact = Set(contact);
    }
    if let Some(category) = params.category {
        registration.category = Set(category);
    }
    registration.updated_at = Set(Utc::now().fixed_offset());
    registration.update(db).await
}

pub async fn delete_registration<C: ConnectionTrait>(db: &C, id: i32) -> Result<u64, DbErr> {
    let result = registrations::Entity::delete_by_id(id).exec(db).await?;
    Ok(result.rows_affected)
}
