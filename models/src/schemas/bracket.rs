use std::collections::HashMap;

use sea_orm::prelude::DateTimeUtc;
use serde::Serialize;

use crate::domains::{
    matches, registrations, rounds,
    sea_orm_active_enums::{RoundKind, TournamentStatus},
};

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EntrantSchema {
    pub id: i32,
    pub name: String,
}

impl EntrantSchema {
    pub fn lookup(id: Option<i32>, entrants: &HashMap<i32, registrations::Model>) -> Option<Self> {
        let id = id?;
        let name = entrants
            .get(&id)
            .map(|r| r.name.clone())
            .unwrap_or_else(|| "Unknown".into());
        Some(Self { id, name })
    }
}

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RoundSchema {
    pub id: i32,
    pub name: String,
    pub kind: RoundKind,
    pub order: i32,
    pub max_matches: i32,
    pub is_completed: bool,
    pub completed_at: Option<DateTimeUtc>,
}

impl From<rounds::Model> for RoundSchema {
    fn from(round: rounds::Model) -> Self {
        Self {
            id: round.id,
            name: round.name,
            kind: round.kind,
            order: round.order,
            max_matches: round.max_matches,
            is_completed: round.is_completed,
            completed_at: round.completed_at.map(|v| v.to_utc()),
        }
    }
}

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct MatchSchema {
    pub id: i32,
    pub round_id: i32,
    pub match_code: String,
    pub player1: Option<EntrantSchema>,
    pub player2: Option<EntrantSchema>,
    pub winner: Option<EntrantSchema>,
    pub is_bye: bool,
    pub score: Option<String>,
    pub is_completed: bool,
    pub scheduled_at: Option<DateTimeUtc>,
    pub completed_at: Option<DateTimeUtc>,
}

impl MatchSchema {
    pub fn new(m: matches::Model, entrants: &HashMap<i32, registrations::Model>) -> Self {
        Self {
            id: m.id,
            round_id: m.round_id,
            is_bye: m.is_bye(),
            player1: EntrantSchema::lookup(m.player1_id, entrants),
            player2: EntrantSchema::lookup(m.player2_id, entrants),
            winner: EntrantSchema::lookup(m.winner_id, entrants),
            match_code: m.match_code,
            score: m.score,
            is_completed: m.is_completed,
            scheduled_at: m.scheduled_at.map(|v| v.to_utc()),
            completed_at: m.completed_at.map(|v| v.to_utc()),
        }
    }
}

#[derive(Serialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct Podium {
    pub champion: Option<EntrantSchema>,
    pub runner_up: Option<EntrantSchema>,
    pub third_place: Option<EntrantSchema>,
}

/// Read-only projection of a tournament's bracket for display.
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct BracketState {
    pub tournament_id: String,
    pub status: TournamentStatus,
    pub current_round_name: Option<String>,
    pub rounds: Vec<RoundSchema>,
    pub matches: Vec<MatchSchema>,
    pub podium: Podium,
}

impl BracketState {
    pub fn round(&self, name: &str) -> Option<&RoundSchema> {
        self.rounds.iter().find(|r| r.name == name)
    }

    /// Matches of the named round in match-code order.
    pub fn matches_in(&self, round_name: &str) -> Vec<&MatchSchema> {
        match self.round(round_name) {
            Some(round) => self
                .matches
                .iter()
                .filter(|m| m.round_id == round.id)
                .collect(),
            None => Vec::new(),
        }
    }
}
