use std::sync::Arc;

use app::core::{BracketEngine, RegistrationOrder, Seeding};
use models::params::{registration::RegisterParticipantParams, tournament::CreateTournamentParams};
use models::schemas::bracket::BracketState;
use sea_orm::DatabaseConnection;
use utils::testing::setup_test_db;

mod bracket;

const ACTOR: &str = "organizer@example.com";

async fn engine_with(seeding: Arc<dyn Seeding>) -> BracketEngine {
    let conn = setup_test_db("sqlite::memory:")
        .await
        .expect("Set up db failed!");
    BracketEngine::new(conn, seeding)
}

/// Registration-order engine plus a handle on its database, for tests that
/// tamper with rows behind the engine's back.
async fn engine_and_db() -> (BracketEngine, DatabaseConnection) {
    let conn = setup_test_db("sqlite::memory:")
        .await
        .expect("Set up db failed!");
    (
        BracketEngine::new(conn.clone(), Arc::new(RegistrationOrder)),
        conn,
    )
}

/// Engine that seeds in registration order, so pairings are predictable.
async fn engine() -> BracketEngine {
    engine_with(Arc::new(RegistrationOrder)).await
}

fn entrant(i: usize) -> RegisterParticipantParams {
    RegisterParticipantParams {
        name: format!("Player {i}"),
        contact: format!("player{i}@example.com"),
        category: Some("open".into()),
    }
}

async fn create_tournament(engine: &BracketEngine, max_participants: i32) -> String {
    engine
        .create_tournament(CreateTournamentParams {
            title: "Spring Open".into(),
            max_participants,
            seed: Some(7),
        })
        .await
        .expect("Create tournament failed!")
        .id
}

/// Draft tournament with `n` registrations.
async fn tournament_with(engine: &BracketEngine, n: usize) -> String {
    let id = create_tournament(engine, 64).await;
    for i in 1..=n {
        engine
            .register_participant(&id, entrant(i))
            .await
            .expect("Register participant failed!");
    }
    id
}

async fn state(engine: &BracketEngine, id: &str) -> BracketState {
    engine
        .get_bracket_state(id)
        .await
        .expect("Bracket state failed!")
}

/// Records player 1 as the winner of every open match in `round`.
async fn finish_round(engine: &BracketEngine, id: &str, round: &str) {
    let open: Vec<(i32, i32)> = state(engine, id)
        .await
        .matches_in(round)
        .into_iter()
        .filter(|m| !m.is_completed)
        .map(|m| (m.id, m.player1.as_ref().expect("player 1 is seated").id))
        .collect();

    for (match_id, winner) in open {
        engine
            .record_result(match_id, winner, Some("2-0".into()), ACTOR)
            .await
            .expect("Record result failed!");
    }
}

/// Plays the bracket to the end, player 1 always winning.
async fn play_out(engine: &BracketEngine, id: &str) {
    loop {
        let current = state(engine, id)
            .await
            .current_round_name
            .expect("active tournament has a current round");
        finish_round(engine, id, &current).await;
        finish_round(engine, id, "Third-Place Match").await;

        if current == "Final" {
            break;
        }
        engine
            .advance_round(id, ACTOR)
            .await
            .expect("Advance round failed!");
    }
}
