use std::sync::Arc;

use app::core::Shuffled;
use app::error::EngineError;
use models::domains::{
    matches,
    sea_orm_active_enums::{RoundKind, TournamentStatus},
};
use models::schemas::bracket::BracketState;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};

use super::*;

fn assert_match_invariants(state: &BracketState) {
    for m in &state.matches {
        if m.is_completed {
            let winner = m.winner.as_ref().expect("completed match has a winner");
            assert!(
                m.player1.as_ref() == Some(winner) || m.player2.as_ref() == Some(winner),
                "{} winner is not one of its players",
                m.match_code
            );
        }
    }
    for round in &state.rounds {
        let matches = state.matches_in(&round.name);
        let all_done = !matches.is_empty() && matches.iter().all(|m| m.is_completed);
        assert_eq!(round.is_completed, all_done, "{} completion flag", round.name);
    }
}

#[tokio::test]
async fn sixteen_registrations_build_full_bracket() {
    let engine = engine().await;
    let id = tournament_with(&engine, 16).await;

    let created = engine.initialize(&id, ACTOR).await.unwrap();
    assert_eq!(created.tournament.status, TournamentStatus::Active);
    assert_eq!(created.matches.len(), 8);

    let state = state(&engine, &id).await;
    assert_eq!(state.status, TournamentStatus::Active);
    assert_eq!(state.current_round_name.as_deref(), Some("Round of 16"));

    let shape: Vec<(&str, i32)> = state
        .rounds
        .iter()
        .map(|r| (r.name.as_str(), r.max_matches))
        .collect();
    assert_eq!(
        shape,
        vec![
            ("Round of 16", 8),
            ("Quarterfinal", 4),
            ("Semifinal", 2),
            ("Third-Place Match", 1),
            ("Final", 1),
        ]
    );
    assert_eq!(state.matches_in("Round of 16").len(), 8);
    assert!(state.matches_in("Quarterfinal").is_empty());
    assert!(state.matches.iter().all(|m| !m.is_bye && !m.is_completed));

    let third_place = state.round("Third-Place Match").unwrap();
    assert_eq!(third_place.kind, RoundKind::ThirdPlace);
    assert!(state.round("Semifinal").unwrap().order < third_place.order);
    assert!(third_place.order < state.round("Final").unwrap().order);
}

#[tokio::test]
async fn five_registrations_get_byes() {
    let engine = engine().await;
    let id = tournament_with(&engine, 5).await;

    engine.initialize(&id, ACTOR).await.unwrap();

    let state = state(&engine, &id).await;
    assert_eq!(state.current_round_name.as_deref(), Some("Quarterfinal"));

    let quarterfinal = state.matches_in("Quarterfinal");
    assert_eq!(quarterfinal.len(), 4);

    let byes: Vec<_> = quarterfinal.iter().filter(|m| m.is_bye).collect();
    assert_eq!(byes.len(), 3);
    for bye in byes {
        assert!(bye.is_completed);
        assert!(bye.player2.is_none());
        assert_eq!(bye.winner, bye.player1);
    }

    assert!(!state.round("Quarterfinal").unwrap().is_completed);
    assert_match_invariants(&state);
}

#[tokio::test]
async fn every_field_size_gets_power_of_two_bracket() {
    let engine = engine().await;

    for n in [2usize, 3, 4, 6, 9, 13, 17] {
        let id = tournament_with(&engine, n).await;
        engine.initialize(&id, ACTOR).await.unwrap();

        let state = state(&engine, &id).await;
        let first = &state.rounds[0];
        let slots = first.max_matches as usize * 2;
        assert_eq!(slots, n.next_power_of_two(), "n = {n}");

        let elimination: Vec<_> = state
            .rounds
            .iter()
            .filter(|r| r.kind == RoundKind::Elimination)
            .collect();
        for pair in elimination.windows(2) {
            assert_eq!(pair[1].max_matches * 2, pair[0].max_matches, "n = {n}");
        }

        let seated = state
            .matches_in(&first.name)
            .iter()
            .map(|m| 1 + usize::from(m.player2.is_some()))
            .sum::<usize>();
        assert_eq!(seated, n);
    }
}

#[tokio::test]
async fn winners_advance_in_match_code_order() {
    let engine = engine().await;
    let id = tournament_with(&engine, 16).await;
    engine.initialize(&id, ACTOR).await.unwrap();

    let first_round = state(&engine, &id).await;
    let mut expected_winners = Vec::new();
    for (i, m) in first_round.matches_in("Round of 16").into_iter().enumerate() {
        let winner = if i % 2 == 0 {
            m.player1.clone().unwrap()
        } else {
            m.player2.clone().unwrap()
        };
        engine
            .record_result(m.id, winner.id, Some("3-1".into()), ACTOR)
            .await
            .unwrap();
        expected_winners.push(winner.id);
    }

    assert!(state(&engine, &id).await.round("Round of 16").unwrap().is_completed);

    let advanced = engine.advance_round(&id, ACTOR).await.unwrap();
    assert_eq!(advanced.next.round.name, "Quarterfinal");
    assert_eq!(advanced.next.matches.len(), 4);
    assert!(advanced.third_place.is_none());

    let pairs: Vec<(Option<i32>, Option<i32>)> = advanced
        .next
        .matches
        .iter()
        .map(|m| (m.player1_id, m.player2_id))
        .collect();
    let expected: Vec<(Option<i32>, Option<i32>)> = expected_winners
        .chunks(2)
        .map(|pair| (Some(pair[0]), Some(pair[1])))
        .collect();
    assert_eq!(pairs, expected);

    let codes: Vec<&str> = advanced
        .next
        .matches
        .iter()
        .map(|m| m.match_code.as_str())
        .collect();
    assert_eq!(codes, vec!["QF-M01", "QF-M02", "QF-M03", "QF-M04"]);

    let state = state(&engine, &id).await;
    assert_eq!(state.current_round_name.as_deref(), Some("Quarterfinal"));
    assert_match_invariants(&state);
}

#[tokio::test]
async fn semifinal_feeds_final_and_third_place() {
    let engine = engine().await;
    let id = tournament_with(&engine, 4).await;
    engine.initialize(&id, ACTOR).await.unwrap();

    let semis = state(&engine, &id).await;
    let semis = semis.matches_in("Semifinal");
    assert_eq!(semis.len(), 2);

    let (first, second) = (semis[0], semis[1]);
    let first_winner = first.player1.clone().unwrap();
    let first_loser = first.player2.clone().unwrap();
    let second_winner = second.player2.clone().unwrap();
    let second_loser = second.player1.clone().unwrap();

    engine
        .record_result(first.id, first_winner.id, None, ACTOR)
        .await
        .unwrap();
    engine
        .record_result(second.id, second_winner.id, None, ACTOR)
        .await
        .unwrap();

    let advanced = engine.advance_round(&id, ACTOR).await.unwrap();
    assert_eq!(advanced.next.round.name, "Final");
    assert_eq!(advanced.next.matches.len(), 1);
    let final_match = &advanced.next.matches[0];
    assert_eq!(final_match.player1_id, Some(first_winner.id));
    assert_eq!(final_match.player2_id, Some(second_winner.id));

    let third_place = advanced.third_place.expect("third-place match generated");
    assert_eq!(third_place.matches.len(), 1);
    assert_eq!(third_place.matches[0].player1_id, Some(first_loser.id));
    assert_eq!(third_place.matches[0].player2_id, Some(second_loser.id));
    assert_eq!(third_place.matches[0].match_code, "3P-M01");

    assert_eq!(
        state(&engine, &id).await.current_round_name.as_deref(),
        Some("Final")
    );
}

#[tokio::test]
async fn invalid_winner_leaves_match_untouched() {
    let engine = engine().await;
    let id = tournament_with(&engine, 4).await;
    engine.initialize(&id, ACTOR).await.unwrap();

    let before = state(&engine, &id).await;
    let semis = before.matches_in("Semifinal");
    let target = semis[0];
    let outsider = semis[1].player1.clone().unwrap();

    let err = engine
        .record_result(target.id, outsider.id, Some("2-0".into()), ACTOR)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidWinner { .. }), "{err:?}");

    let after = state(&engine, &id).await;
    let unchanged = after.matches.iter().find(|m| m.id == target.id).unwrap();
    assert!(!unchanged.is_completed);
    assert!(unchanged.winner.is_none());
    assert!(unchanged.score.is_none());
}

#[tokio::test]
async fn unknown_match_and_repeated_result_are_rejected() {
    let engine = engine().await;
    let id = tournament_with(&engine, 2).await;
    engine.initialize(&id, ACTOR).await.unwrap();

    let err = engine.record_result(9999, 1, None, ACTOR).await.unwrap_err();
    assert!(matches!(err, EngineError::MatchNotFound(9999)));

    let final_match = state(&engine, &id).await.matches[0].clone();
    let winner = final_match.player1.unwrap().id;
    engine
        .record_result(final_match.id, winner, None, ACTOR)
        .await
        .unwrap();

    let err = engine
        .record_result(final_match.id, winner, None, ACTOR)
        .await
        .unwrap_err();
    assert!(
        matches!(err, EngineError::InvalidState { .. } | EngineError::AlreadyCompleted(_)),
        "{err:?}"
    );
}

#[tokio::test]
async fn bye_matches_cannot_be_played() {
    let engine = engine().await;
    let id = tournament_with(&engine, 3).await;
    engine.initialize(&id, ACTOR).await.unwrap();

    let state = state(&engine, &id).await;
    let bye = state.matches.iter().find(|m| m.is_bye).unwrap();
    let err = engine
        .record_result(bye.id, bye.player1.as_ref().unwrap().id, None, ACTOR)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::AlreadyCompleted(_)), "{err:?}");
}

#[tokio::test]
async fn advancing_an_unfinished_round_fails() {
    let engine = engine().await;
    let id = tournament_with(&engine, 8).await;
    engine.initialize(&id, ACTOR).await.unwrap();

    let err = engine.advance_round(&id, ACTOR).await.unwrap_err();
    assert!(matches!(err, EngineError::RoundNotComplete(ref r) if r == "Quarterfinal"));

    let quarterfinal = state(&engine, &id).await;
    let first = quarterfinal.matches_in("Quarterfinal")[0];
    engine
        .record_result(first.id, first.player1.as_ref().unwrap().id, None, ACTOR)
        .await
        .unwrap();

    let err = engine.advance_round(&id, ACTOR).await.unwrap_err();
    assert!(matches!(err, EngineError::RoundNotComplete(_)));
    assert!(state(&engine, &id).await.matches_in("Semifinal").is_empty());
}

#[tokio::test]
async fn second_advance_is_rejected_without_new_rows() {
    let engine = engine().await;
    let id = tournament_with(&engine, 8).await;
    engine.initialize(&id, ACTOR).await.unwrap();
    finish_round(&engine, &id, "Quarterfinal").await;

    engine.advance_round(&id, ACTOR).await.unwrap();
    let before = state(&engine, &id).await;

    let err = engine.advance_round(&id, ACTOR).await.unwrap_err();
    assert!(matches!(err, EngineError::AlreadyAdvanced(ref r) if r == "Semifinal"), "{err:?}");

    let after = state(&engine, &id).await;
    assert_eq!(after.matches.len(), before.matches.len());
    assert_eq!(after.rounds.len(), before.rounds.len());
    assert_eq!(after.current_round_name, before.current_round_name);
}

#[tokio::test]
async fn double_advance_out_of_semifinal_creates_nothing() {
    let engine = engine().await;
    let id = tournament_with(&engine, 4).await;
    engine.initialize(&id, ACTOR).await.unwrap();
    finish_round(&engine, &id, "Semifinal").await;

    engine.advance_round(&id, ACTOR).await.unwrap();
    let err = engine.advance_round(&id, ACTOR).await.unwrap_err();
    assert!(matches!(err, EngineError::AlreadyAdvanced(_)), "{err:?}");

    let state = state(&engine, &id).await;
    assert_eq!(state.matches_in("Final").len(), 1);
    assert_eq!(state.matches_in("Third-Place Match").len(), 1);
}

#[tokio::test]
async fn failed_advance_leaves_no_partial_round() {
    let (engine, db) = engine_and_db().await;
    let id = tournament_with(&engine, 8).await;
    engine.initialize(&id, ACTOR).await.unwrap();
    finish_round(&engine, &id, "Quarterfinal").await;

    // Occupy the second semifinal's code so generation fails after SF-M01
    // has been written.
    let before = state(&engine, &id).await;
    let blocker = matches::ActiveModel {
        tournament_id: Set(id.clone()),
        round_id: Set(before.round("Final").unwrap().id),
        match_code: Set("SF-M02".into()),
        is_completed: Set(false),
        ..Default::default()
    }
    .insert(&db)
    .await
    .unwrap();

    let err = engine.advance_round(&id, ACTOR).await.unwrap_err();
    assert!(matches!(err, EngineError::PersistenceFailure(_)), "{err:?}");

    let after = state(&engine, &id).await;
    assert!(after.matches_in("Semifinal").is_empty());
    assert_eq!(after.current_round_name.as_deref(), Some("Quarterfinal"));
    assert_eq!(after.matches.len(), before.matches.len() + 1);
    assert_eq!(after.status, TournamentStatus::Active);

    matches::Entity::delete_by_id(blocker.id)
        .exec(&db)
        .await
        .unwrap();
    let advanced = engine.advance_round(&id, ACTOR).await.unwrap();
    assert_eq!(advanced.next.matches.len(), 2);
    assert_eq!(
        state(&engine, &id).await.current_round_name.as_deref(),
        Some("Semifinal")
    );
}

#[tokio::test]
async fn completes_only_after_final_and_third_place() {
    let engine = engine().await;
    let id = tournament_with(&engine, 4).await;
    engine.initialize(&id, ACTOR).await.unwrap();
    finish_round(&engine, &id, "Semifinal").await;
    engine.advance_round(&id, ACTOR).await.unwrap();

    finish_round(&engine, &id, "Final").await;
    let state_after_final = state(&engine, &id).await;
    assert_eq!(state_after_final.status, TournamentStatus::Active);
    assert!(state_after_final.round("Final").unwrap().is_completed);
    assert!(!engine.check_tournament_completion(&id).await.unwrap());

    let err = engine.advance_round(&id, ACTOR).await.unwrap_err();
    assert!(matches!(err, EngineError::NoNextRound(_)), "{err:?}");

    finish_round(&engine, &id, "Third-Place Match").await;
    let done = state(&engine, &id).await;
    assert_eq!(done.status, TournamentStatus::Completed);
    assert!(engine.check_tournament_completion(&id).await.unwrap());

    let final_match = done.matches_in("Final")[0];
    assert_eq!(done.podium.champion, final_match.winner);
    assert_eq!(done.podium.runner_up, final_match.player2);
    assert_eq!(
        done.podium.third_place,
        done.matches_in("Third-Place Match")[0].winner
    );
}

#[tokio::test]
async fn two_player_tournament_completes_on_final() {
    let engine = engine().await;
    let id = tournament_with(&engine, 2).await;
    let created = engine.initialize(&id, ACTOR).await.unwrap();
    assert_eq!(created.rounds.len(), 1);
    assert_eq!(
        created.tournament.current_round_name.as_deref(),
        Some("Final")
    );

    finish_round(&engine, &id, "Final").await;
    let state = state(&engine, &id).await;
    assert_eq!(state.status, TournamentStatus::Completed);
    assert!(state.podium.champion.is_some());
    assert!(state.podium.third_place.is_none());
}

#[tokio::test]
async fn three_players_resolve_third_place_by_bye() {
    let engine = engine().await;
    let id = tournament_with(&engine, 3).await;
    engine.initialize(&id, ACTOR).await.unwrap();
    finish_round(&engine, &id, "Semifinal").await;

    let advanced = engine.advance_round(&id, ACTOR).await.unwrap();
    let third_place = advanced.third_place.unwrap();
    assert_eq!(third_place.matches.len(), 1);
    assert!(third_place.matches[0].is_bye());
    assert!(third_place.round.is_completed);

    finish_round(&engine, &id, "Final").await;
    assert_eq!(state(&engine, &id).await.status, TournamentStatus::Completed);
}

#[tokio::test]
async fn full_runs_keep_invariants() {
    let engine = engine().await;

    for n in [2usize, 3, 5, 7, 8, 12, 16, 21] {
        let id = tournament_with(&engine, n).await;
        engine.initialize(&id, ACTOR).await.unwrap();
        play_out(&engine, &id).await;

        let state = state(&engine, &id).await;
        assert_eq!(state.status, TournamentStatus::Completed, "n = {n}");
        assert!(state.rounds.iter().all(|r| r.is_completed), "n = {n}");
        assert!(state.podium.champion.is_some(), "n = {n}");
        assert_match_invariants(&state);
    }
}

#[tokio::test]
async fn concurrent_results_complete_the_round_once() {
    let engine = engine().await;
    let id = tournament_with(&engine, 16).await;
    engine.initialize(&id, ACTOR).await.unwrap();

    let state_before = state(&engine, &id).await;
    let mut tasks = tokio::task::JoinSet::new();
    for m in state_before.matches_in("Round of 16") {
        let engine = engine.clone();
        let (match_id, winner) = (m.id, m.player1.as_ref().unwrap().id);
        tasks.spawn(async move { engine.record_result(match_id, winner, None, ACTOR).await });
    }
    while let Some(result) = tasks.join_next().await {
        result.unwrap().unwrap();
    }

    let state = state(&engine, &id).await;
    assert!(state.round("Round of 16").unwrap().is_completed);
    assert_match_invariants(&state);
    assert_eq!(engine.advance_round(&id, ACTOR).await.unwrap().next.matches.len(), 4);
}

#[tokio::test]
async fn shuffled_seeding_is_reproducible() {
    let mut draws = Vec::new();
    for _ in 0..2 {
        let engine = engine_with(Arc::new(Shuffled)).await;
        let id = tournament_with(&engine, 12).await;
        let created = engine.initialize(&id, ACTOR).await.unwrap();
        let pairs: Vec<(Option<i32>, Option<i32>)> = created
            .matches
            .iter()
            .map(|m| (m.player1_id, m.player2_id))
            .collect();
        draws.push(pairs);
    }
    assert_eq!(draws[0], draws[1]);
}
