//! Values returned by the transition engine

use crate::policy::{Phase, Stage};
use crate::request::QuestionRequest;
use crate::session::{AdaptiveSession, CompletionReason};
use serde::{Deserialize, Serialize};

/// What the caller should do after an answer was processed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum NextStep {
    /// Ask another question drawn according to the request
    Ask(QuestionRequest),
    /// The session is finished
    Complete(CompletionResult),
}

/// Permanent record of a finished session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionResult {
    pub session_id: String,
    pub reason: CompletionReason,
    pub total_score: f64,
    /// Score as a percentage of the first-pass maximum
    pub final_percentage: f64,
    pub total_questions_asked: u32,
    /// `passed` flag of every stage, in progression order
    pub stages: Vec<StagePassed>,
}

impl CompletionResult {
    /// Whether every stage was passed
    pub fn all_passed(&self) -> bool {
        self.stages.iter().all(|s| s.passed)
    }

    pub fn passed(&self, stage: Stage) -> bool {
        self.stages
            .iter()
            .any(|s| s.stage == stage && s.passed)
    }

    pub(crate) fn from_session(
        session: &AdaptiveSession,
        reason: CompletionReason,
        final_percentage: f64,
    ) -> Self {
        Self {
            session_id: session.session_id().to_string(),
            reason,
            total_score: session.total_score(),
            final_percentage,
            total_questions_asked: session.total_questions_asked(),
            stages: session
                .stage_statuses()
                .iter()
                .map(|s| StagePassed {
                    stage: s.stage,
                    passed: s.passed,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagePassed {
    pub stage: Stage,
    pub passed: bool,
}

/// Result of a single `submit_answer` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerOutcome {
    pub question_id: String,
    pub is_correct: bool,
    /// Stage the answer was given in
    pub stage: Stage,
    /// Phase the answer was scored in
    pub phase: Phase,
    pub points_earned: f64,
    /// Set when this answer completed a stage successfully
    pub stage_passed: Option<Stage>,
    /// Set when this answer failed the initial phase
    pub entered_recovery: bool,
    /// Set when the session moved to a harder stage
    pub next_stage: Option<Stage>,
    pub next: NextStep,
}

impl AnswerOutcome {
    pub fn is_complete(&self) -> bool {
        matches!(self.next, NextStep::Complete(_))
    }

    /// Request for the next question, if the session continues
    pub fn request(&self) -> Option<&QuestionRequest> {
        match &self.next {
            NextStep::Ask(request) => Some(request),
            NextStep::Complete(_) => None,
        }
    }

    /// Final result, if this answer finished the session
    pub fn completion(&self) -> Option<&CompletionResult> {
        match &self.next {
            NextStep::Ask(_) => None,
            NextStep::Complete(result) => Some(result),
        }
    }
}
