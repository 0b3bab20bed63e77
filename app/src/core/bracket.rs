//! Bracket shape for single elimination: how many slots a field needs, which
//! rounds that implies, and how entrants are paired into matches.

use std::collections::HashSet;

use models::domains::{rounds, sea_orm_active_enums::RoundKind};

pub const MIN_PARTICIPANTS: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    /// A round holding this many slots, 16 or more.
    RoundOf(u32),
    Quarterfinal,
    Semifinal,
    Final,
    ThirdPlace,
}

impl Stage {
    /// Elimination stage for a round with `slots` entrants.
    pub fn for_slots(slots: u32) -> Stage {
        match slots {
            0..=2 => Stage::Final,
            3..=4 => Stage::Semifinal,
            5..=8 => Stage::Quarterfinal,
            n => Stage::RoundOf(n.next_power_of_two()),
        }
    }

    pub fn of_round(round: &rounds::Model) -> Stage {
        match round.kind {
            RoundKind::ThirdPlace => Stage::ThirdPlace,
            RoundKind::Elimination => Stage::for_slots(round.max_matches.max(1) as u32 * 2),
        }
    }

    pub const fn slots(self) -> u32 {
        match self {
            Stage::RoundOf(n) => n,
            Stage::Quarterfinal => 8,
            Stage::Semifinal => 4,
            Stage::Final | Stage::ThirdPlace => 2,
        }
    }

    pub const fn match_count(self) -> u32 {
        self.slots() / 2
    }

    pub const fn kind(self) -> RoundKind {
        match self {
            Stage::ThirdPlace => RoundKind::ThirdPlace,
            _ => RoundKind::Elimination,
        }
    }

    pub fn name(self) -> String {
        match self {
            Stage::RoundOf(n) => format!("Round of {n}"),
            Stage::Quarterfinal => "Quarterfinal".into(),
            Stage::Semifinal => "Semifinal".into(),
            Stage::Final => "Final".into(),
            Stage::ThirdPlace => "Third-Place Match".into(),
        }
    }

    fn code_prefix(self) -> String {
        match self {
            Stage::RoundOf(n) => format!("R{n}"),
            Stage::Quarterfinal => "QF".into(),
            Stage::Semifinal => "SF".into(),
            Stage::Final => "F".into(),
            Stage::ThirdPlace => "3P".into(),
        }
    }

    /// Display code of the `index`-th (0-based) match, e.g. `R16-M03`.
    ///
    /// The index is zero-padded to the width of the round's match count so
    /// codes sort lexically in bracket order.
    pub fn match_code(self, index: usize) -> String {
        let width = self.match_count().to_string().len().max(2);
        format!("{}-M{:0width$}", self.code_prefix(), index + 1)
    }
}

/// Smallest power of two that seats every participant.
pub fn bracket_size(participants: usize) -> usize {
    participants.max(MIN_PARTICIPANTS).next_power_of_two()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoundPlan {
    pub stage: Stage,
    pub order: i32,
}

impl RoundPlan {
    pub fn max_matches(&self) -> i32 {
        self.stage.match_count() as i32
    }
}

/// Every round of the bracket in `order`, from the first round to the Final.
///
/// The third-place round, when the bracket has a semifinal, is slotted right
/// after it.
pub fn plan_rounds(participants: usize) -> Vec<RoundPlan> {
    let mut plans = Vec::new();
    let mut slots = bracket_size(participants) as u32;
    let mut order = 0;

    while slots >= 2 {
        let stage = Stage::for_slots(slots);
        order += 1;
        plans.push(RoundPlan { stage, order });

        if stage == Stage::Semifinal {
            order += 1;
            plans.push(RoundPlan {
                stage: Stage::ThirdPlace,
                order,
            });
        }

        slots /= 2;
    }

    plans
}

/// Two sides of a match. A missing `player2` is a BYE.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pairing {
    pub player1: i32,
    pub player2: Option<i32>,
}

impl Pairing {
    pub const fn is_bye(&self) -> bool {
        self.player2.is_none()
    }
}

/// Lays seeded entrants into the first round.
///
/// Byes fill the slots the field leaves empty and are spread evenly across
/// the round, at most one per match.
pub fn first_round_pairings(entrants: &[i32]) -> Vec<Pairing> {
    if entrants.len() < MIN_PARTICIPANTS {
        return Vec::new();
    }

    let size = bracket_size(entrants.len());
    let match_count = size / 2;
    let byes = size - entrants.len();
    let bye_slots: HashSet<usize> = (0..byes).map(|i| i * match_count / byes).collect();

    let mut players = entrants.iter().copied();
    (0..match_count)
        .filter_map(|slot| {
            let player1 = players.next()?;
            let player2 = if bye_slots.contains(&slot) {
                None
            } else {
                players.next()
            };
            Some(Pairing { player1, player2 })
        })
        .collect()
}

/// Pairs advancing entrants sequentially: 1st vs 2nd, 3rd vs 4th, ...
pub fn pair_sequential(advancing: &[i32]) -> Vec<Pairing> {
    advancing
        .chunks(2)
        .map(|pair| Pairing {
            player1: pair[0],
            player2: pair.get(1).copied(),
        })
        .collect()
}
