use assert_matches::assert_matches;
use flinch::config::{field, RawConfig};
use flinch::engine::{ScriptedTargets, NO_SELECTION};
use flinch::{EngineError, InvalidState, OutcomeKind, Phase, ReactionTest, SessionConfig};

fn form(rows: &str, cols: &str, limit: &str, rounds: &str) -> RawConfig {
    let mut raw = RawConfig::from(&SessionConfig::default());
    raw.set(field::ROWS, rows);
    raw.set(field::COLS, cols);
    raw.set(field::TIME_LIMIT, limit);
    raw.set(field::ROUNDS, rounds);
    raw
}

#[test]
fn two_round_session_end_to_end() {
    let mut test = ReactionTest::with_targets(SessionConfig::default(), ScriptedTargets::new([2, 0]));
    test.configure(&form("1", "5", "2", "2")).unwrap();

    let status = test.current_summary();
    assert_eq!(status.status_line(), "Round 1 of 2 · Success: 0");
    assert_eq!(test.engine().target(), Some(2));

    let first = test.submit_outcome(2, 0.5).unwrap();
    assert_eq!(first.kind, OutcomeKind::Correct);
    assert_eq!(first.success_count, 1);
    assert!(!first.session_complete);
    assert_eq!(first.result, "✅ Correct! Reaction time: 0.500 seconds");

    test.arm_next_round().unwrap();
    let second = test.submit_outcome(NO_SELECTION, 2.1).unwrap();
    assert_eq!(second.kind, OutcomeKind::Timeout);
    assert_eq!(second.success_count, 1);
    assert!(second.session_complete);

    let summary = test.final_summary().unwrap();
    assert_eq!(summary.success_count, 1);
    assert_eq!(summary.rounds_to_win, 2);
    assert_eq!(summary.score_line(), "You got 1 out of 2 correct.");
    assert_eq!(
        summary.history_text(),
        "✅ Correct! Reaction time: 0.500 seconds\n⏰ Timeout! Reaction time: 2.100 seconds"
    );
    assert_eq!(summary.mean_correct_secs, Some(0.5));
}

#[test]
fn summary_after_reset_is_fresh() {
    let mut test = ReactionTest::with_targets(
        SessionConfig::new(1, 3, 1.0, 3, 0, 0).unwrap(),
        ScriptedTargets::new([1]),
    );
    test.start_session();
    test.submit_outcome(1, 0.2).unwrap();
    test.arm_next_round().unwrap();

    test.start_session();
    let summary = test.current_summary();
    assert_eq!(summary.round_index, 0);
    assert_eq!(summary.success_count, 0);
    assert_eq!(summary.last_result, "");
    assert_eq!(test.engine().phase(), Phase::Armed);
}

#[test]
fn history_length_matches_rounds_to_win() {
    for rounds in 1..=6u32 {
        let mut test = ReactionTest::with_targets(
            SessionConfig::new(2, 3, 1.0, rounds, 0, 0).unwrap(),
            ScriptedTargets::new([0, 5, 3]),
        );
        test.start_session();
        for i in 0..rounds {
            if i > 0 {
                test.arm_next_round().unwrap();
            }
            test.submit_outcome(i as i64 % 4, 0.3).unwrap();
        }
        let summary = test.final_summary().unwrap();
        assert_eq!(summary.history.len(), rounds as usize);
        assert!(summary.success_count <= rounds);
        assert_matches!(
            test.submit_outcome(0, 0.1),
            Err(EngineError::InvalidState(InvalidState::SessionComplete))
        );
    }
}

#[test]
fn second_submission_for_a_round_is_refused() {
    let mut test = ReactionTest::with_targets(
        SessionConfig::new(1, 4, 1.0, 3, 0, 0).unwrap(),
        ScriptedTargets::new([3]),
    );
    let token = test.start_session();
    test.begin_round().unwrap();
    test.submit_outcome_for(token, 3, 0.4).unwrap();

    assert_matches!(
        test.submit_outcome(3, 0.4),
        Err(EngineError::InvalidState(InvalidState::RoundNotArmed))
    );
    assert_matches!(
        test.submit_outcome_for(token, NO_SELECTION, 1.0),
        Err(EngineError::InvalidState(InvalidState::StaleRound { got, .. })) if got == token
    );
    assert_eq!(test.current_summary().round_index, 1);
}

#[test]
fn late_timeout_after_next_round_armed_is_stale() {
    let mut test = ReactionTest::with_targets(
        SessionConfig::new(1, 2, 1.0, 2, 0, 0).unwrap(),
        ScriptedTargets::new([0, 1]),
    );
    let first = test.start_session();
    test.submit_outcome_for(first, 0, 0.3).unwrap();
    let second = test.arm_next_round().unwrap();
    assert_ne!(first, second);

    assert_matches!(
        test.submit_outcome_for(first, NO_SELECTION, 1.0),
        Err(EngineError::InvalidState(InvalidState::StaleRound { expected: Some(t), .. })) if t == second
    );
    let report = test.submit_outcome_for(second, 1, 0.7).unwrap();
    assert!(report.session_complete);
    assert_eq!(report.success_count, 2);
}

#[test]
fn rejected_settings_leave_session_running() {
    let mut test = ReactionTest::with_targets(
        SessionConfig::new(1, 5, 2.0, 2, 0, 0).unwrap(),
        ScriptedTargets::new([4]),
    );
    test.start_session();
    test.submit_outcome(4, 0.9).unwrap();

    let err = test.configure(&form("1", "1", "2", "2")).unwrap_err();
    assert_eq!(err.field, field::COLS);
    let err = test.configure(&form("2", "2", "0", "2")).unwrap_err();
    assert_eq!(err.field, field::TIME_LIMIT);
    let err = test.configure(&form("2", "2", "1", "0")).unwrap_err();
    assert_eq!(err.field, field::ROUNDS);

    assert_eq!(test.config().cols(), 5);
    assert_eq!(test.current_summary().success_count, 1);
}

#[test]
fn out_of_range_selection_is_wrong() {
    let mut test = ReactionTest::with_targets(
        SessionConfig::new(1, 2, 1.0, 1, 0, 0).unwrap(),
        ScriptedTargets::new([1]),
    );
    test.start_session();
    let report = test.submit_outcome(7, 0.1).unwrap();
    assert_eq!(report.kind, OutcomeKind::Wrong);
    assert!(report.result.starts_with("❌ Wrong!"));
}
