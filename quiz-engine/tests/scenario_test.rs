//! Scenario tests for the adaptive transition engine
//!
//! Walks whole sessions through the default policy table and checks the
//! scores, stage flags and completion reasons at each milestone.

use quiz_engine::{
    AdaptiveConfig, AdaptiveSession, AnswerOutcome, CompletionReason, Phase, QuizError, Stage,
    StageConfig, StagePolicyTable, TransitionEngine,
};

/// Submit a correctness pattern, naming questions `<prefix>-<n>`
fn play(
    engine: &TransitionEngine,
    session: &mut AdaptiveSession,
    prefix: &str,
    pattern: &[bool],
) -> Vec<AnswerOutcome> {
    pattern
        .iter()
        .enumerate()
        .map(|(i, &correct)| {
            engine
                .submit_answer(session, correct, &format!("{}-{}", prefix, i))
                .expect("answer should be accepted")
        })
        .collect()
}

const T: bool = true;
const F: bool = false;

/// Scenario A: 4/5 on Easy passes without recovery
#[test]
fn test_scenario_a_easy_passes_first_time() {
    let engine = TransitionEngine::default();
    let mut session = engine.start_session("scenario-a");

    let outcomes = play(&engine, &mut session, "easy", &[T, T, T, T, F]);

    let last = outcomes.last().unwrap();
    assert_eq!(last.stage_passed, Some(Stage::Easy));
    assert!(outcomes.iter().all(|o| !o.entered_recovery));

    let easy = session.status(Stage::Easy);
    assert!(easy.passed);
    assert!(!easy.in_recovery);
    assert_eq!(easy.recovery_round, 0);
    assert_eq!(easy.score, 12.0);

    assert_eq!(session.current_stage(), Stage::Medium);
    let medium = session.status(Stage::Medium);
    assert_eq!(medium.questions_asked, 0);
    assert_eq!(medium.correct_answers, 0);
    assert_eq!(session.total_score(), 12.0);
}

/// Scenario B: 3/5 on Easy, then 2/3 in recovery passes with 13 points
#[test]
fn test_scenario_b_easy_passes_through_recovery() {
    let engine = TransitionEngine::default();
    let mut session = engine.start_session("scenario-b");

    let initial = play(&engine, &mut session, "easy", &[T, F, T, F, T]);
    assert!(initial.last().unwrap().entered_recovery);
    assert_eq!(session.current_phase(), Phase::Recovery);

    let recovery = play(&engine, &mut session, "easy-rec", &[T, F, T]);
    assert!(recovery.iter().all(|o| o.phase == Phase::Recovery));
    assert_eq!(recovery[0].points_earned, 2.0);
    assert_eq!(recovery.last().unwrap().stage_passed, Some(Stage::Easy));

    let easy = session.status(Stage::Easy);
    assert!(easy.passed);
    assert_eq!(easy.recovery_round, 1);
    assert_eq!(easy.score, 13.0);
    assert_eq!(session.current_stage(), Stage::Medium);
    assert_eq!(session.current_phase(), Phase::Initial);
}

/// Scenario C: failing Hard recovery ends the session with Hard not passed
#[test]
fn test_scenario_c_hard_recovery_failure_completes() {
    let engine = TransitionEngine::default();
    let mut session = engine.start_session("scenario-c");

    play(&engine, &mut session, "easy", &[T; 5]);
    play(&engine, &mut session, "medium", &[T; 5]);
    let hard = play(&engine, &mut session, "hard", &[T, T, F, F, F]);
    assert!(hard.last().unwrap().entered_recovery);

    let recovery = play(&engine, &mut session, "hard-rec", &[F, T, F]);
    let result = recovery.last().unwrap().completion().unwrap().clone();

    assert!(session.is_complete());
    assert_eq!(
        result.reason,
        CompletionReason::RecoveryFailed { stage: Stage::Hard }
    );
    assert!(result.passed(Stage::Easy));
    assert!(result.passed(Stage::Medium));
    assert!(!result.passed(Stage::Hard));
    // 5×3 + 5×7 + 2×10 + 1×6
    assert_eq!(result.total_score, 76.0);
    assert_eq!(session.total_score(), 76.0);
    assert_eq!(result.total_questions_asked, 18);
}

/// Scenario D: all three stages passed, mixing first-pass and recovery
#[test]
fn test_scenario_d_all_stages_passed() {
    let engine = TransitionEngine::default();
    let mut session = engine.start_session("scenario-d");

    play(&engine, &mut session, "easy", &[T; 5]);
    play(&engine, &mut session, "medium", &[T, T, T, F, F]);
    play(&engine, &mut session, "medium-rec", &[T, T, T]);
    let hard = play(&engine, &mut session, "hard", &[T, F, T, F, T]);

    let result = hard.last().unwrap().completion().unwrap();
    assert_eq!(result.reason, CompletionReason::AllStagesPassed);
    assert!(result.all_passed());
    assert!(session.is_complete());
    assert!(session.total_questions_asked() <= 25);
    assert_eq!(session.total_questions_asked(), 18);
    // 15 + (21 + 12) + 30
    assert_eq!(result.total_score, 78.0);
    assert_eq!(
        session.passed_stages(),
        vec![Stage::Easy, Stage::Medium, Stage::Hard]
    );
}

/// Recovery everywhere: the longest passing route stays under the cap
#[test]
fn test_all_stages_through_recovery_fits_under_cap() {
    let engine = TransitionEngine::default();
    let mut session = engine.start_session("all-recovery");

    for stage in ["easy", "medium"] {
        play(&engine, &mut session, stage, &[T, T, T, F, F]);
        play(&engine, &mut session, &format!("{}-rec", stage), &[T, T, F]);
    }
    play(&engine, &mut session, "hard", &[T, T, F, F, F]);
    let last = play(&engine, &mut session, "hard-rec", &[T, F, T]);

    let result = last.last().unwrap().completion().unwrap();
    assert_eq!(result.reason, CompletionReason::AllStagesPassed);
    assert_eq!(result.total_questions_asked, 24);
    // (9 + 4) + (21 + 8) + (20 + 12)
    assert_eq!(result.total_score, 74.0);
    assert!((result.final_percentage - 74.0).abs() < 1e-9);
}

/// A perfect run scores exactly the first-pass maximum
#[test]
fn test_perfect_run_scores_one_hundred_percent() {
    let engine = TransitionEngine::default();
    let mut session = engine.start_session("perfect");
    let outcomes = play(&engine, &mut session, "q", &[T; 15]);

    let result = outcomes.last().unwrap().completion().unwrap();
    assert_eq!(result.total_score, 100.0);
    assert_eq!(result.final_percentage, 100.0);
    assert_eq!(outcomes[4].next_stage, Some(Stage::Medium));
    assert_eq!(outcomes[9].next_stage, Some(Stage::Hard));
    assert_eq!(outcomes[14].next_stage, None);
}

/// Failed recovery keeps the points earned along the way
#[test]
fn test_failed_stage_keeps_earned_points() {
    let engine = TransitionEngine::default();
    let mut session = engine.start_session("keep-points");

    play(&engine, &mut session, "easy", &[T, T, T, F, F]);
    play(&engine, &mut session, "easy-rec", &[T, F, F]);

    assert!(session.is_complete());
    assert!(!session.status(Stage::Easy).passed);
    assert_eq!(session.status(Stage::Easy).score, 11.0);
    assert_eq!(session.total_score(), 11.0);
}

/// Custom table: a tiny cap completes the session mid-phase
#[test]
fn test_low_cap_with_custom_table() {
    let stage = StageConfig {
        initial_questions: 2,
        passing_threshold: 0.5,
        recovery_questions: 2,
        recovery_threshold: 0.5,
        base_points: 10.0,
        recovery_points: 5.0,
    };
    let config = AdaptiveConfig {
        max_questions: 3,
        stage_configs: Stage::ALL.iter().map(|&s| (s, stage)).collect(),
    };
    let engine = TransitionEngine::new(StagePolicyTable::new(config).unwrap());
    let mut session = engine.start_session("low-cap");

    let outcomes = play(&engine, &mut session, "q", &[T, T, T]);
    assert_eq!(outcomes[1].next_stage, Some(Stage::Medium));
    let result = outcomes[2].completion().unwrap();
    assert_eq!(result.reason, CompletionReason::QuestionCapReached);
    assert!(result.passed(Stage::Easy));
    assert!(!result.passed(Stage::Medium));
    assert_eq!(result.total_score, 30.0);

    let before = session.clone();
    let err = engine.submit_answer(&mut session, true, "q-late").unwrap_err();
    assert!(matches!(err, QuizError::InvalidTransition { .. }));
    assert_eq!(session, before);
}

/// The cap wins even when it lands inside a recovery block
#[test]
fn test_cap_reached_during_recovery() {
    let mut config = AdaptiveConfig::default();
    config.max_questions = 7;
    let engine = TransitionEngine::new(StagePolicyTable::new(config).unwrap());
    let mut session = engine.start_session("cap-in-recovery");

    let outcomes = play(&engine, &mut session, "q", &[F, F, F, F, F, T, T]);
    let result = outcomes.last().unwrap().completion().unwrap();
    assert_eq!(result.reason, CompletionReason::QuestionCapReached);
    assert_eq!(session.total_questions_asked(), 7);
    assert!(session.status(Stage::Easy).in_recovery);
    assert!(!session.status(Stage::Easy).passed);
}
