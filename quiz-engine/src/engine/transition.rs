//! Transition Engine: deterministic decision function for stage routing
//!
//! Consumes one answer outcome and the session state, and produces the next
//! state, the points earned, and the next step. No I/O happens here; the
//! question lookup is left to the caller.

use crate::engine::outcome::{AnswerOutcome, CompletionResult, NextStep};
use crate::engine::scoring::{final_percentage, meets_threshold, points_for};
use crate::error::{QuizError, QuizResult};
use crate::policy::{Phase, Stage, StageConfig, StagePolicyTable};
use crate::report::SessionSummary;
use crate::request::build_request;
use crate::session::{AdaptiveSession, CompletionReason};
use chrono::Utc;
use tracing::{debug, info, warn};

/// How the active phase ended, if it did
enum PhaseResult {
    Continue,
    Passed,
    EnterRecovery,
    Failed,
}

/// The Transition Engine: owns the policy table, borrows sessions
#[derive(Debug, Clone)]
pub struct TransitionEngine {
    policy: StagePolicyTable,
}

impl TransitionEngine {
    pub fn new(policy: StagePolicyTable) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &StagePolicyTable {
        &self.policy
    }

    /// Create a zeroed session positioned at the first stage
    pub fn start_session(&self, session_id: impl Into<String>) -> AdaptiveSession {
        let session = AdaptiveSession::new(session_id);
        info!(session = %session.session_id(), "Adaptive session started");
        session
    }

    /// Process one answer and advance the session.
    ///
    /// Preconditions: the session is not complete and `question_id` has not
    /// been used in it. Violations fail with [`QuizError::InvalidTransition`]
    /// or [`QuizError::DuplicateQuestion`] and leave the session untouched.
    ///
    /// Per call:
    /// 1. Record the question and count it against the active stage.
    /// 2. Award points at the active phase's rate if correct.
    /// 3. Close the phase when its block is used up: pass, enter the single
    ///    recovery round, or fail the session.
    /// 4. Force completion when the global cap is reached.
    pub fn submit_answer(
        &self,
        session: &mut AdaptiveSession,
        is_correct: bool,
        question_id: &str,
    ) -> QuizResult<AnswerOutcome> {
        if session.is_complete {
            warn!(session = %session.session_id, "Answer submitted to a complete session");
            return Err(QuizError::InvalidTransition {
                session_id: session.session_id.clone(),
            });
        }
        if session.has_used(question_id) {
            warn!(
                session = %session.session_id,
                question = question_id,
                "Duplicate question submitted"
            );
            return Err(QuizError::DuplicateQuestion {
                session_id: session.session_id.clone(),
                question_id: question_id.to_string(),
            });
        }

        let now = Utc::now();
        let stage = session.current_stage;
        let config = *self.policy.config_for(stage);
        let phase = session.current_phase();

        session.used_question_ids.push(question_id.to_string());
        session.total_questions_asked += 1;

        let points = points_for(&config, phase, is_correct);
        let status = session.status_mut(stage);
        status.questions_asked += 1;
        if phase.is_recovery() {
            status.recovery_asked += 1;
        }
        if is_correct {
            status.correct_answers += 1;
            if phase.is_recovery() {
                status.recovery_correct += 1;
            }
        }
        status.score += points;
        session.total_score += points;

        debug!(
            session = %session.session_id,
            stage = %stage,
            phase = %phase,
            correct = is_correct,
            points,
            asked = session.total_questions_asked,
            "Answer recorded"
        );

        let mut stage_passed = None;
        let mut entered_recovery = false;
        let mut next_stage = None;

        match self.close_phase(session, stage, phase, &config) {
            PhaseResult::Continue => {}
            PhaseResult::Passed => {
                stage_passed = Some(stage);
                next_stage = self.pass_stage(session, stage, now);
            }
            PhaseResult::EnterRecovery => {
                entered_recovery = true;
                let status = session.status_mut(stage);
                status.in_recovery = true;
                status.recovery_round = 1;
                info!(
                    session = %session.session_id,
                    stage = %stage,
                    correct = session.status(stage).initial_correct(),
                    of = config.initial_questions,
                    "Initial phase failed, entering recovery"
                );
            }
            PhaseResult::Failed => {
                session.status_mut(stage).in_recovery = false;
                self.complete(session, CompletionReason::RecoveryFailed { stage }, now);
            }
        }

        if !session.is_complete && session.total_questions_asked >= self.policy.max_questions() {
            self.complete(session, CompletionReason::QuestionCapReached, now);
        }

        session.version += 1;
        session.last_activity = now;

        let next = match session.completion {
            Some(reason) => NextStep::Complete(self.completion_result(session, reason)),
            None => NextStep::Ask(build_request(session)?),
        };

        Ok(AnswerOutcome {
            question_id: question_id.to_string(),
            is_correct,
            stage,
            phase,
            points_earned: points,
            stage_passed,
            entered_recovery,
            next_stage,
            next,
        })
    }

    /// End an unfinished session early, e.g. after the question pool ran dry
    pub fn close(&self, session: &mut AdaptiveSession) -> QuizResult<CompletionResult> {
        if session.is_complete {
            return Err(QuizError::InvalidTransition {
                session_id: session.session_id.clone(),
            });
        }
        let now = Utc::now();
        self.complete(session, CompletionReason::Closed, now);
        session.version += 1;
        session.last_activity = now;
        Ok(self.completion_result(session, CompletionReason::Closed))
    }

    /// Stored result of a finished session, `None` while it is running
    pub fn result(&self, session: &AdaptiveSession) -> Option<CompletionResult> {
        session
            .completion
            .map(|reason| self.completion_result(session, reason))
    }

    /// Reporting view of the session
    pub fn summary(&self, session: &AdaptiveSession) -> SessionSummary {
        SessionSummary::new(session, final_percentage(session.total_score, &self.policy))
    }

    /// Decide whether the answer just recorded closes the active phase
    fn close_phase(
        &self,
        session: &AdaptiveSession,
        stage: Stage,
        phase: Phase,
        config: &StageConfig,
    ) -> PhaseResult {
        let status = session.status(stage);
        match phase {
            Phase::Initial => {
                if status.questions_asked < config.initial_questions {
                    return PhaseResult::Continue;
                }
                if meets_threshold(
                    status.correct_answers,
                    config.initial_questions,
                    config.passing_threshold,
                ) {
                    PhaseResult::Passed
                } else {
                    PhaseResult::EnterRecovery
                }
            }
            Phase::Recovery => {
                if status.recovery_asked < config.recovery_questions {
                    return PhaseResult::Continue;
                }
                if meets_threshold(
                    status.recovery_correct,
                    config.recovery_questions,
                    config.recovery_threshold,
                ) {
                    PhaseResult::Passed
                } else {
                    PhaseResult::Failed
                }
            }
        }
    }

    /// Mark `stage` passed and move on; returns the new stage if any
    fn pass_stage(
        &self,
        session: &mut AdaptiveSession,
        stage: Stage,
        now: chrono::DateTime<Utc>,
    ) -> Option<Stage> {
        let status = session.status_mut(stage);
        status.passed = true;
        status.in_recovery = false;
        info!(
            session = %session.session_id,
            stage = %stage,
            score = session.status(stage).score,
            "Stage passed"
        );

        match stage.next() {
            Some(next) => {
                session.current_stage = next;
                session.status_mut(next).reset_counters();
                Some(next)
            }
            None => {
                self.complete(session, CompletionReason::AllStagesPassed, now);
                None
            }
        }
    }

    fn complete(
        &self,
        session: &mut AdaptiveSession,
        reason: CompletionReason,
        now: chrono::DateTime<Utc>,
    ) {
        session.is_complete = true;
        session.completion = Some(reason);
        session.completed_at = Some(now);
        info!(
            session = %session.session_id,
            reason = %reason,
            total_score = session.total_score,
            asked = session.total_questions_asked,
            "Adaptive session complete"
        );
    }

    fn completion_result(
        &self,
        session: &AdaptiveSession,
        reason: CompletionReason,
    ) -> CompletionResult {
        CompletionResult::from_session(
            session,
            reason,
            final_percentage(session.total_score, &self.policy),
        )
    }
}

impl Default for TransitionEngine {
    fn default() -> Self {
        Self::new(StagePolicyTable::default())
    }
}
