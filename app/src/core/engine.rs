use std::{collections::HashMap, sync::Arc};

use models::{
    domains::{
        matches, registrations, rounds,
        sea_orm_active_enums::{RoundKind, TournamentStatus},
        tournaments,
    },
    params::{
        registration::{CorrectRegistrationParams, RegisterParticipantParams},
        tournament::CreateTournamentParams,
    },
    schemas::bracket::{BracketState, EntrantSchema, MatchSchema, Podium, RoundSchema},
};
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use tracing::{info, warn};
use validator::Validate;

use crate::{
    cache::TournamentLocks,
    core::{
        bracket::{self, MIN_PARTICIPANTS, Stage},
        dtos::{AdvancedRound, GeneratedRound, InitializedBracket},
        seeding::Seeding,
    },
    error::{EngineError, EngineResult},
    persistence,
};

/// Owns bracket progression for every tournament in one database.
///
/// Each mutation takes the tournament's lock and runs as a single transaction:
/// it either applies completely or leaves the stored bracket untouched.
#[derive(Clone)]
pub struct BracketEngine {
    conn: DatabaseConnection,
    locks: TournamentLocks,
    seeding: Arc<dyn Seeding>,
}

impl BracketEngine {
    pub fn new(conn: DatabaseConnection, seeding: Arc<dyn Seeding>) -> Self {
        Self {
            conn,
            locks: TournamentLocks::new(),
            seeding,
        }
    }

    #[tracing::instrument(skip(self, params))]
    pub async fn create_tournament(
        &self,
        params: CreateTournamentParams,
    ) -> EngineResult<tournaments::Model> {
        params.validate()?;
        let tournament = persistence::tournaments::create_tournament(&self.conn, params).await?;
        info!(tournament_id = %tournament.id, "Tournament created");
        Ok(tournament)
    }

    #[tracing::instrument(skip(self, params))]
    pub async fn register_participant(
        &self,
        tournament_id: &str,
        params: RegisterParticipantParams,
    ) -> EngineResult<registrations::Model> {
        params.validate()?;
        let _guard = self.locks.acquire(tournament_id).await;
        let txn = self.conn.begin().await?;

        let tournament = find_tournament(&txn, tournament_id).await?;
        if tournament.status != TournamentStatus::Draft {
            return Err(EngineError::InvalidState {
                status: tournament.status,
            });
        }

        let registered =
            persistence::registrations::count_registrations(&txn, tournament_id).await?;
        if registered >= tournament.max_participants as u64 {
            return Err(EngineError::TournamentFull {
                max: tournament.max_participants,
            });
        }

        if persistence::registrations::find_by_contact(&txn, tournament_id, &params.contact)
            .await?
            .is_some()
        {
            return Err(EngineError::DuplicateRegistration(params.contact));
        }

        let registration =
            persistence::registrations::create_registration(&txn, tournament_id, params).await?;
        txn.commit().await?;

        info!(registration_id = registration.id, "Participant registered");
        Ok(registration)
    }

    /// Removes a registration before the bracket exists.
    #[tracing::instrument(skip(self))]
    pub async fn withdraw_registration(&self, registration_id: i32, actor: &str) -> EngineResult<()> {
        let found = persistence::registrations::get_registration(&self.conn, registration_id)
            .await?
            .ok_or(EngineError::RegistrationNotFound(registration_id))?;

        let _guard = self.locks.acquire(&found.tournament_id).await;
        let txn = self.conn.begin().await?;

        let tournament = find_tournament(&txn, &found.tournament_id).await?;
        if tournament.status != TournamentStatus::Draft {
            return Err(EngineError::InvalidState {
                status: tournament.status,
            });
        }

        if persistence::registrations::delete_registration(&txn, registration_id).await? == 0 {
            return Err(EngineError::RegistrationNotFound(registration_id));
        }
        txn.commit().await?;

        info!(%actor, "Registration withdrawn");
        Ok(())
    }

    /// Administrative correction of participant details. Allowed at any point
    /// since it never changes the bracket's structure.
    #[tracing::instrument(skip(self, params))]
    pub async fn correct_registration(
        &self,
        registration_id: i32,
        params: CorrectRegistrationParams,
        actor: &str,
    ) -> EngineResult<registrations::Model> {
        params.validate()?;
        let found = persistence::registrations::get_registration(&self.conn, registration_id)
            .await?
            .ok_or(EngineError::RegistrationNotFound(registration_id))?;

        let _guard = self.locks.acquire(&found.tournament_id).await;
        let txn = self.conn.begin().await?;

        let registration = persistence::registrations::get_registration(&txn, registration_id)
            .await?
            .ok_or(EngineError::RegistrationNotFound(registration_id))?;

        if let Some(contact) = &params.contact {
            let holder = persistence::registrations::find_by_contact(
                &txn,
                &registration.tournament_id,
                contact,
            )
            .await?;
            if holder.is_some_and(|holder| holder.id != registration.id) {
                return Err(EngineError::DuplicateRegistration(contact.clone()));
            }
        }

        let registration =
            persistence::registrations::update_registration(&txn, registration, params).await?;
        txn.commit().await?;

        info!(%actor, "Registration corrected");
        Ok(registration)
    }

    pub async fn list_registrations(
        &self,
        tournament_id: &str,
    ) -> EngineResult<Vec<registrations::Model>> {
        find_tournament(&self.conn, tournament_id).await?;
        Ok(persistence::registrations::find_registrations(&self.conn, tournament_id).await?)
    }

    /// Lays out every round of the bracket and populates the first one.
    #[tracing::instrument(skip(self))]
    pub async fn initialize(
        &self,
        tournament_id: &str,
        actor: &str,
    ) -> EngineResult<InitializedBracket> {
        let _guard = self.locks.acquire(tournament_id).await;
        let txn = self.conn.begin().await?;

        let tournament = find_tournament(&txn, tournament_id).await?;
        if tournament.status != TournamentStatus::Draft {
            warn!(status = %tournament.status, "Initialization rejected");
            return Err(EngineError::InvalidState {
                status: tournament.status,
            });
        }
        if persistence::rounds::count_rounds(&txn, tournament_id).await? > 0 {
            return Err(EngineError::InconsistentBracket(
                "draft tournament already has rounds".into(),
            ));
        }

        let entrants = persistence::registrations::find_registrations(&txn, tournament_id).await?;
        if entrants.len() < MIN_PARTICIPANTS {
            return Err(EngineError::InsufficientParticipants {
                count: entrants.len(),
            });
        }

        let mut rounds = Vec::new();
        for plan in bracket::plan_rounds(entrants.len()) {
            rounds.push(persistence::rounds::create_round(&txn, tournament_id, &plan).await?);
        }

        let seeded = self.seeding.arrange(
            entrants.iter().map(|entrant| entrant.id).collect(),
            tournament.seed as u64,
        );
        let pairings = bracket::first_round_pairings(&seeded);

        let first = rounds.remove(0);
        let matches =
            persistence::matches::create_matches(&txn, &first, &pairings, actor).await?;
        let first = persistence::rounds::refresh_completion(&txn, first).await?;
        let first_name = first.name.clone();
        rounds.insert(0, first);

        let tournament = persistence::tournaments::activate(&txn, tournament, first_name).await?;
        txn.commit().await?;

        info!(
            %actor,
            participants = entrants.len(),
            rounds = rounds.len(),
            byes = pairings.iter().filter(|p| p.is_bye()).count(),
            "Bracket initialized"
        );

        Ok(InitializedBracket {
            tournament,
            rounds,
            matches,
        })
    }

    #[tracing::instrument(skip(self, score))]
    pub async fn record_result(
        &self,
        match_id: i32,
        winner_id: i32,
        score: Option<String>,
        actor: &str,
    ) -> EngineResult<matches::Model> {
        let found = persistence::matches::get_match(&self.conn, match_id)
            .await?
            .ok_or(EngineError::MatchNotFound(match_id))?;

        let _guard = self.locks.acquire(&found.tournament_id).await;
        let txn = self.conn.begin().await?;

        let m = persistence::matches::get_match(&txn, match_id)
            .await?
            .ok_or(EngineError::MatchNotFound(match_id))?;
        let tournament = find_tournament(&txn, &m.tournament_id).await?;

        if tournament.status != TournamentStatus::Active {
            return Err(EngineError::InvalidState {
                status: tournament.status,
            });
        }
        if m.is_completed {
            return Err(EngineError::AlreadyCompleted(m.match_code));
        }
        if !m.has_player(winner_id) {
            warn!(match_code = %m.match_code, winner_id, "Winner is not in the match");
            return Err(EngineError::InvalidWinner {
                winner: winner_id,
                match_code: m.match_code,
            });
        }

        let m = persistence::matches::complete_match(&txn, m, winner_id, score, actor).await?;

        let round = find_round(&txn, m.round_id).await?;
        let round = persistence::rounds::refresh_completion(&txn, round).await?;
        if round.is_completed {
            info!(round = %round.name, "Round complete");
        }

        let tournament = evaluate_completion(&txn, tournament).await?;
        txn.commit().await?;

        info!(%actor, match_code = %m.match_code, winner_id, "Result recorded");
        if tournament.status == TournamentStatus::Completed {
            info!(tournament_id = %tournament.id, "Tournament completed");
        }

        Ok(m)
    }

    /// Generates the next round from the winners of the current one. Out of
    /// the semifinal this also pairs the two losers for third place.
    #[tracing::instrument(skip(self))]
    pub async fn advance_round(&self, tournament_id: &str, actor: &str) -> EngineResult<AdvancedRound> {
        let _guard = self.locks.acquire(tournament_id).await;
        let txn = self.conn.begin().await?;

        let tournament = find_tournament(&txn, tournament_id).await?;
        if tournament.status != TournamentStatus::Active {
            return Err(EngineError::InvalidState {
                status: tournament.status,
            });
        }

        let rounds = persistence::rounds::find_rounds(&txn, tournament_id).await?;
        let current_name = tournament.current_round_name.clone().ok_or_else(|| {
            EngineError::InconsistentBracket("active tournament without a current round".into())
        })?;
        let current = rounds
            .iter()
            .find(|r| r.kind == RoundKind::Elimination && r.name == current_name)
            .ok_or_else(|| {
                EngineError::InconsistentBracket(format!("current round {current_name} is missing"))
            })?;
        let current_matches = persistence::matches::find_round_matches(&txn, current.id).await?;

        let finished =
            !current_matches.is_empty() && current_matches.iter().all(|m| m.is_completed);
        if !finished {
            let advanced_into = rounds
                .iter()
                .any(|r| r.kind == RoundKind::Elimination && r.order < current.order);
            let untouched =
                !current_matches.is_empty() && current_matches.iter().all(|m| !m.is_completed);
            if advanced_into && untouched {
                warn!(round = %current.name, "Round was already generated");
                return Err(EngineError::AlreadyAdvanced(current.name.clone()));
            }
            return Err(EngineError::RoundNotComplete(current.name.clone()));
        }

        let next = rounds
            .iter()
            .filter(|r| r.kind == RoundKind::Elimination && r.order > current.order)
            .min_by_key(|r| r.order)
            .ok_or_else(|| EngineError::NoNextRound(current.name.clone()))?;
        if persistence::matches::count_round_matches(&txn, next.id).await? > 0 {
            return Err(EngineError::AlreadyAdvanced(next.name.clone()));
        }

        let third_place = match Stage::of_round(current) {
            Stage::Semifinal => rounds.iter().find(|r| r.kind == RoundKind::ThirdPlace),
            _ => None,
        };
        if let Some(third_place) = third_place {
            if persistence::matches::count_round_matches(&txn, third_place.id).await? > 0 {
                return Err(EngineError::AlreadyAdvanced(third_place.name.clone()));
            }
        }

        let winners = current_matches
            .iter()
            .map(|m| {
                m.winner_id.ok_or_else(|| {
                    EngineError::InconsistentBracket(format!(
                        "{} is completed without a winner",
                        m.match_code
                    ))
                })
            })
            .collect::<EngineResult<Vec<i32>>>()?;
        let pairings = bracket::pair_sequential(&winners);
        if pairings.len() != next.max_matches as usize {
            return Err(EngineError::InconsistentBracket(format!(
                "{} expects {} matches, {} winners advance",
                next.name,
                next.max_matches,
                winners.len()
            )));
        }

        let next_matches =
            persistence::matches::create_matches(&txn, next, &pairings, actor).await?;
        let generated = GeneratedRound {
            round: next.clone(),
            matches: next_matches,
        };

        let third_place = match third_place {
            Some(round) => {
                let losers: Vec<i32> = current_matches.iter().filter_map(|m| m.loser_id()).collect();
                let pairings = bracket::pair_sequential(&losers);
                let matches =
                    persistence::matches::create_matches(&txn, round, &pairings, actor).await?;
                let round = persistence::rounds::refresh_completion(&txn, round.clone()).await?;
                Some(GeneratedRound { round, matches })
            }
            None => None,
        };

        persistence::tournaments::set_current_round(&txn, tournament, next.name.clone()).await?;
        txn.commit().await?;

        info!(%actor, from = %current.name, to = %next.name, "Round advanced");

        Ok(AdvancedRound {
            next: generated,
            third_place,
        })
    }

    /// Marks the tournament COMPLETED once its Final, and third-place match if
    /// it has one, are decided. Returns whether the tournament is completed.
    #[tracing::instrument(skip(self))]
    pub async fn check_tournament_completion(&self, tournament_id: &str) -> EngineResult<bool> {
        let _guard = self.locks.acquire(tournament_id).await;
        let txn = self.conn.begin().await?;

        let tournament = find_tournament(&txn, tournament_id).await?;
        let tournament = evaluate_completion(&txn, tournament).await?;
        txn.commit().await?;

        Ok(tournament.status == TournamentStatus::Completed)
    }

    pub async fn get_bracket_state(&self, tournament_id: &str) -> EngineResult<BracketState> {
        let tournament = find_tournament(&self.conn, tournament_id).await?;
        let rounds = persistence::rounds::find_rounds(&self.conn, tournament_id).await?;
        let matches = persistence::matches::find_tournament_matches(&self.conn, tournament_id).await?;
        let entrants: HashMap<i32, registrations::Model> =
            persistence::registrations::find_registrations(&self.conn, tournament_id)
                .await?
                .into_iter()
                .map(|r| (r.id, r))
                .collect();

        let podium = podium(&rounds, &matches, &entrants);

        Ok(BracketState {
            tournament_id: tournament.id,
            status: tournament.status,
            current_round_name: tournament.current_round_name,
            rounds: rounds.into_iter().map(RoundSchema::from).collect(),
            matches: matches
                .into_iter()
                .map(|m| MatchSchema::new(m, &entrants))
                .collect(),
            podium,
        })
    }

    #[tracing::instrument(skip(self))]
    pub async fn cancel_tournament(
        &self,
        tournament_id: &str,
        actor: &str,
    ) -> EngineResult<tournaments::Model> {
        self.transition(tournament_id, actor, TournamentStatus::Cancelled, |status| {
            !status.is_terminal() && status != TournamentStatus::Completed
        })
        .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn archive_tournament(
        &self,
        tournament_id: &str,
        actor: &str,
    ) -> EngineResult<tournaments::Model> {
        self.transition(tournament_id, actor, TournamentStatus::Archived, |status| {
            status == TournamentStatus::Completed
        })
        .await
    }

    async fn transition(
        &self,
        tournament_id: &str,
        actor: &str,
        to: TournamentStatus,
        allowed_from: impl Fn(TournamentStatus) -> bool,
    ) -> EngineResult<tournaments::Model> {
        let _guard = self.locks.acquire(tournament_id).await;
        let txn = self.conn.begin().await?;

        let tournament = find_tournament(&txn, tournament_id).await?;
        if !allowed_from(tournament.status) {
            return Err(EngineError::InvalidState {
                status: tournament.status,
            });
        }

        let from = tournament.status;
        let tournament = persistence::tournaments::set_status(&txn, tournament, to).await?;
        txn.commit().await?;

        info!(%actor, %from, %to, "Tournament status changed");
        Ok(tournament)
    }

    /// Compensating correction: takes back a recorded result whose winner has
    /// not been carried into a generated round yet. Reopens the round, and the
    /// tournament when it had already completed.
    #[tracing::instrument(skip(self))]
    pub async fn reopen_match(&self, match_id: i32, actor: &str) -> EngineResult<matches::Model> {
        let found = persistence::matches::get_match(&self.conn, match_id)
            .await?
            .ok_or(EngineError::MatchNotFound(match_id))?;

        let _guard = self.locks.acquire(&found.tournament_id).await;
        let txn = self.conn.begin().await?;

        let m = persistence::matches::get_match(&txn, match_id)
            .await?
            .ok_or(EngineError::MatchNotFound(match_id))?;
        let tournament = find_tournament(&txn, &m.tournament_id).await?;

        if !matches!(
            tournament.status,
            TournamentStatus::Active | TournamentStatus::Completed
        ) {
            return Err(EngineError::InvalidState {
                status: tournament.status,
            });
        }
        if !m.is_completed {
            return Ok(m);
        }
        if m.is_bye() {
            return Err(EngineError::AlreadyCompleted(m.match_code));
        }

        let round = find_round(&txn, m.round_id).await?;
        let consumed = round.kind == RoundKind::Elimination
            && tournament.current_round_name.as_deref() != Some(round.name.as_str());
        if consumed {
            return Err(EngineError::AlreadyAdvanced(round.name));
        }

        let m = persistence::matches::clear_result(&txn, m, actor).await?;
        persistence::rounds::refresh_completion(&txn, round).await?;
        if tournament.status == TournamentStatus::Completed {
            persistence::tournaments::set_status(&txn, tournament, TournamentStatus::Active)
                .await?;
        }
        txn.commit().await?;

        warn!(%actor, match_code = %m.match_code, "Match reopened");
        Ok(m)
    }
}

async fn find_tournament<C: ConnectionTrait>(
    db: &C,
    tournament_id: &str,
) -> EngineResult<tournaments::Model> {
    persistence::tournaments::get_tournament(db, tournament_id)
        .await?
        .ok_or_else(|| EngineError::TournamentNotFound(tournament_id.to_owned()))
}

async fn find_round<C: ConnectionTrait>(db: &C, round_id: i32) -> EngineResult<rounds::Model> {
    persistence::rounds::get_round(db, round_id)
        .await?
        .ok_or_else(|| EngineError::InconsistentBracket(format!("round {round_id} is missing")))
}

/// COMPLETED iff the Final is complete and the third-place round, when there
/// is one, is complete too.
async fn evaluate_completion<C: ConnectionTrait>(
    db: &C,
    tournament: tournaments::Model,
) -> EngineResult<tournaments::Model> {
    if tournament.status != TournamentStatus::Active {
        return Ok(tournament);
    }

    let rounds = persistence::rounds::find_rounds(db, &tournament.id).await?;
    let final_done = rounds
        .iter()
        .find(|r| Stage::of_round(r) == Stage::Final)
        .is_some_and(|r| r.is_completed);
    let third_place_done = rounds
        .iter()
        .find(|r| r.kind == RoundKind::ThirdPlace)
        .is_none_or(|r| r.is_completed);

    if final_done && third_place_done {
        Ok(persistence::tournaments::set_status(db, tournament, TournamentStatus::Completed).await?)
    } else {
        Ok(tournament)
    }
}

fn podium(
    rounds: &[rounds::Model],
    matches: &[matches::Model],
    entrants: &HashMap<i32, registrations::Model>,
) -> Podium {
    let decided = |stage: Stage| {
        rounds
            .iter()
            .find(|r| Stage::of_round(r) == stage)
            .and_then(|round| {
                matches
                    .iter()
                    .find(|m| m.round_id == round.id && m.is_completed)
            })
    };

    let final_match = decided(Stage::Final);
    let third_place = decided(Stage::ThirdPlace);

    Podium {
        champion: EntrantSchema::lookup(final_match.and_then(|m| m.winner_id), entrants),
        runner_up: EntrantSchema::lookup(final_match.and_then(|m| m.loser_id()), entrants),
        third_place: EntrantSchema::lookup(third_place.and_then(|m| m.winner_id), entrants),
    }
}
