use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "matches")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub tournament_id: String,
    pub round_id: i32,
    pub match_code: String,
    pub player1_id: Option<i32>,
    /// `None` on a generated match means the slot is a BYE.
    pub player2_id: Option<i32>,
    pub winner_id: Option<i32>,
    pub score: Option<String>,
    pub is_completed: bool,
    pub scheduled_at: Option<DateTimeWithTimeZone>,
    pub completed_at: Option<DateTimeWithTimeZone>,
    pub recorded_by: Option<String>,
}

impl Model {
    pub fn is_bye(&self) -> bool {
        self.player1_id.is_some() != self.player2_id.is_some()
    }

    pub fn has_player(&self, registration_id: i32) -> bool {
        self.player1_id == Some(registration_id) || self.player2_id == Some(registration_id)
    }

    /// The non-winner of a completed match. BYE matches have no loser.
    pub fn loser_id(&self) -> Option<i32> {
        let winner = self.winner_id?;
        if self.player1_id == Some(winner) {
            self.player2_id
        } else if self.player2_id == Some(winner) {
            self.player1_id
        } else {
            None
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tournaments::Entity",
        from = "Column::TournamentId",
        to = "super::tournaments::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Tournaments,
    #[sea_orm(
        belongs_to = "super::rounds::Entity",
        from = "Column::RoundId",
        to = "super::rounds::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Rounds,
}

impl Related<super::tournaments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tournaments.def()
    }
}

impl Related<super::rounds::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rounds.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
