use models::domains::{matches, registrations, rounds, tournaments};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(tournaments::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(tournaments::Column::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(tournaments::Column::Title)
                            .string()
                            .string_len(1024)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(tournaments::Column::MaxParticipants)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(tournaments::Column::Status).text().not_null())
                    .col(
                        ColumnDef::new(tournaments::Column::CurrentRoundName)
                            .string()
                            .null(),
                    )
                    .col(ColumnDef::new(tournaments::Column::Seed).big_integer().not_null())
                    .col(
                        ColumnDef::new(tournaments::Column::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(tournaments::Column::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(tournaments::Column::StartedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(tournaments::Column::CompletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(registrations::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(registrations::Column::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(registrations::Column::TournamentId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(registrations::Column::Name).string().not_null())
                    .col(
                        ColumnDef::new(registrations::Column::Contact)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(registrations::Column::Category).string().null())
                    .col(
                        ColumnDef::new(registrations::Column::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(registrations::Column::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-registration-tournament_id")
                            .from(registrations::Entity, registrations::Column::TournamentId)
                            .to(tournaments::Entity, tournaments::Column::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-registration-tournament-contact")
                    .table(registrations::Entity)
                    .col(registrations::Column::TournamentId)
                    .col(registrations::Column::Contact)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(rounds::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(rounds::Column::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(rounds::Column::TournamentId).string().not_null())
                    .col(ColumnDef::new(rounds::Column::Name).string().not_null())
                    .col(ColumnDef::new(rounds::Column::Kind).text().not_null())
                    .col(ColumnDef::new(rounds::Column::Order).integer().not_null())
                    .col(ColumnDef::new(rounds::Column::MaxMatches).integer().not_null())
                    .col(
                        ColumnDef::new(rounds::Column::IsCompleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(rounds::Column::CompletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-round-tournament_id")
                            .from(rounds::Entity, rounds::Column::TournamentId)
                            .to(tournaments::Entity, tournaments::Column::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-round-tournament-order")
                    .table(rounds::Entity)
                    .col(rounds::Column::TournamentId)
                    .col(rounds::Column::Order)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(matches::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(matches::Column::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(matches::Column::TournamentId).string().not_null())
                    .col(ColumnDef::new(matches::Column::RoundId).integer().not_null())
                    .col(ColumnDef::new(matches::Column::MatchCode).string().not_null())
                    .col(ColumnDef::new(matches::Column::Player1Id).integer().null())
                    .col(ColumnDef::new(matches::Column::Player2Id).integer().null())
                    .col(ColumnDef::new(matches::Column::WinnerId).integer().null())
                    .col(ColumnDef::new(matches::Column::Score).string().null())
                    .col(
                        ColumnDef::new(matches::Column::IsCompleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(matches::Column::ScheduledAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(matches::Column::CompletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(matches::Column::RecordedBy).string().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-match-tournament_id")
                            .from(matches::Entity, matches::Column::TournamentId)
                            .to(tournaments::Entity, tournaments::Column::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-match-round_id")
                            .from(matches::Entity, matches::Column::RoundId)
                            .to(rounds::Entity, rounds::Column::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-match-tournament-code")
                    .table(matches::Entity)
                    .col(matches::Column::TournamentId)
                    .col(matches::Column::MatchCode)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(matches::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(rounds::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(registrations::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(tournaments::Entity).to_owned())
            .await?;

        Ok(())
    }
}
