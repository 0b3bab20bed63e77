use std::fmt;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum TournamentStatus {
    #[sea_orm(string_value = "DRAFT")]
    Draft,
    #[sea_orm(string_value = "PENDING_PAYMENT")]
    PendingPayment,
    #[sea_orm(string_value = "ACTIVE")]
    Active,
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
    #[sea_orm(string_value = "ARCHIVED")]
    Archived,
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
}

impl TournamentStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            TournamentStatus::Draft => "DRAFT",
            TournamentStatus::PendingPayment => "PENDING_PAYMENT",
            TournamentStatus::Active => "ACTIVE",
            TournamentStatus::Completed => "COMPLETED",
            TournamentStatus::Archived => "ARCHIVED",
            TournamentStatus::Cancelled => "CANCELLED",
        }
    }

    /// Cancelled and archived tournaments never change again.
    pub const fn is_terminal(self) -> bool {
        matches!(self, TournamentStatus::Archived | TournamentStatus::Cancelled)
    }
}

impl fmt::Display for TournamentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Elimination rounds feed the next round by winners; the third-place round
/// sits outside that chain and is fed by the semifinal losers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum RoundKind {
    #[sea_orm(string_value = "elimination")]
    Elimination,
    #[sea_orm(string_value = "third_place")]
    ThirdPlace,
}
