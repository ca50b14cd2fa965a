//! Session State: per-attempt progress across stages

use crate::policy::{Phase, Stage};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// Progress within a single stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageStatus {
    /// Stage this status belongs to
    pub stage: Stage,
    /// Questions answered in this stage, both phases
    pub questions_asked: u32,
    /// Correct answers in this stage, both phases
    pub correct_answers: u32,
    /// Whether the recovery phase is running
    pub in_recovery: bool,
    /// Recovery attempts started (0 or 1)
    pub recovery_round: u32,
    /// Questions answered since recovery started
    #[serde(default)]
    pub recovery_asked: u32,
    /// Correct answers since recovery started
    #[serde(default)]
    pub recovery_correct: u32,
    /// Terminal: once true, never reverts
    pub passed: bool,
    /// Points accumulated in this stage
    pub score: f64,
}

impl StageStatus {
    /// Zeroed status for a stage
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            questions_asked: 0,
            correct_answers: 0,
            in_recovery: false,
            recovery_round: 0,
            recovery_asked: 0,
            recovery_correct: 0,
            passed: false,
            score: 0.0,
        }
    }

    /// Phase the next answer in this stage will be scored in
    pub fn phase(&self) -> Phase {
        if self.in_recovery {
            Phase::Recovery
        } else {
            Phase::Initial
        }
    }

    /// Answers given before recovery started
    pub fn initial_asked(&self) -> u32 {
        self.questions_asked.saturating_sub(self.recovery_asked)
    }

    /// Correct answers given before recovery started
    pub fn initial_correct(&self) -> u32 {
        self.correct_answers.saturating_sub(self.recovery_correct)
    }

    /// Whether this stage has been touched at all
    pub fn is_pristine(&self) -> bool {
        *self == Self::new(self.stage)
    }

    pub(crate) fn reset_counters(&mut self) {
        self.questions_asked = 0;
        self.correct_answers = 0;
        self.recovery_asked = 0;
        self.recovery_correct = 0;
    }
}

/// One [`StageStatus`] per [`Stage`], indexed by the enum.
///
/// Serialized as an object keyed by stage name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageStatuses {
    easy: StageStatus,
    medium: StageStatus,
    hard: StageStatus,
}

impl StageStatuses {
    pub fn new() -> Self {
        Self {
            easy: StageStatus::new(Stage::Easy),
            medium: StageStatus::new(Stage::Medium),
            hard: StageStatus::new(Stage::Hard),
        }
    }

    /// Statuses in progression order
    pub fn iter(&self) -> impl Iterator<Item = &StageStatus> {
        [&self.easy, &self.medium, &self.hard].into_iter()
    }
}

impl Default for StageStatuses {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<Stage> for StageStatuses {
    type Output = StageStatus;

    fn index(&self, stage: Stage) -> &StageStatus {
        match stage {
            Stage::Easy => &self.easy,
            Stage::Medium => &self.medium,
            Stage::Hard => &self.hard,
        }
    }
}

impl IndexMut<Stage> for StageStatuses {
    fn index_mut(&mut self, stage: Stage) -> &mut StageStatus {
        match stage {
            Stage::Easy => &mut self.easy,
            Stage::Medium => &mut self.medium,
            Stage::Hard => &mut self.hard,
        }
    }
}

/// Why a session stopped accepting answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CompletionReason {
    /// The last stage was passed
    AllStagesPassed,
    /// A stage failed its single recovery phase
    RecoveryFailed { stage: Stage },
    /// The global question cap was reached
    QuestionCapReached,
    /// The caller ended the session early
    Closed,
}

impl CompletionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AllStagesPassed => "all_stages_passed",
            Self::RecoveryFailed { .. } => "recovery_failed",
            Self::QuestionCapReached => "question_cap_reached",
            Self::Closed => "closed",
        }
    }
}

impl std::fmt::Display for CompletionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RecoveryFailed { stage } => write!(f, "recovery failed at {}", stage),
            other => write!(f, "{}", other.as_str()),
        }
    }
}

/// State of one adaptive quiz attempt.
///
/// Created zeroed at [`Stage::Easy`] and mutated only by the transition
/// engine. Once `is_complete` is set the value is frozen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveSession {
    pub(crate) session_id: String,
    pub(crate) current_stage: Stage,
    pub(crate) stage_statuses: StageStatuses,
    pub(crate) total_questions_asked: u32,
    /// Presentation order; never holds duplicates
    pub(crate) used_question_ids: Vec<String>,
    pub(crate) is_complete: bool,
    pub(crate) total_score: f64,
    #[serde(default)]
    pub(crate) completion: Option<CompletionReason>,
    /// Bumped on every successful mutation
    #[serde(default)]
    pub(crate) version: u64,
    pub(crate) started_at: DateTime<Utc>,
    pub(crate) last_activity: DateTime<Utc>,
    #[serde(default)]
    pub(crate) completed_at: Option<DateTime<Utc>>,
}

impl AdaptiveSession {
    /// Fresh session: every stage zeroed, current stage Easy
    pub fn new(session_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            session_id: session_id.into(),
            current_stage: Stage::Easy,
            stage_statuses: StageStatuses::new(),
            total_questions_asked: 0,
            used_question_ids: Vec::new(),
            is_complete: false,
            total_score: 0.0,
            completion: None,
            version: 0,
            started_at: now,
            last_activity: now,
            completed_at: None,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn current_stage(&self) -> Stage {
        self.current_stage
    }

    /// Phase the next answer will be scored in
    pub fn current_phase(&self) -> Phase {
        self.status(self.current_stage).phase()
    }

    pub fn status(&self, stage: Stage) -> &StageStatus {
        &self.stage_statuses[stage]
    }

    pub fn stage_statuses(&self) -> &StageStatuses {
        &self.stage_statuses
    }

    pub fn total_questions_asked(&self) -> u32 {
        self.total_questions_asked
    }

    /// Question ids in the order they were answered
    pub fn used_question_ids(&self) -> &[String] {
        &self.used_question_ids
    }

    pub fn has_used(&self, question_id: &str) -> bool {
        self.used_question_ids.iter().any(|id| id == question_id)
    }

    pub fn is_complete(&self) -> bool {
        self.is_complete
    }

    pub fn total_score(&self) -> f64 {
        self.total_score
    }

    pub fn completion(&self) -> Option<CompletionReason> {
        self.completion
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn last_activity(&self) -> DateTime<Utc> {
        self.last_activity
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Stages whose `passed` flag is set, in progression order
    pub fn passed_stages(&self) -> Vec<Stage> {
        self.stage_statuses
            .iter()
            .filter(|s| s.passed)
            .map(|s| s.stage)
            .collect()
    }

    pub(crate) fn status_mut(&mut self, stage: Stage) -> &mut StageStatus {
        &mut self.stage_statuses[stage]
    }

    /// One-line summary for logging
    pub fn summary_line(&self) -> String {
        format!(
            "session={} stage={} phase={} asked={} score={} complete={}",
            self.session_id,
            self.current_stage,
            self.current_phase(),
            self.total_questions_asked,
            self.total_score,
            self.is_complete,
        )
    }
}
