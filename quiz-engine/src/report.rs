//! Session summary for display and reporting

use crate::policy::{Phase, Stage};
use crate::session::{AdaptiveSession, CompletionReason, StageStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot of a session's progress, running or finished
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub current_stage: Stage,
    pub current_phase: Phase,
    pub total_questions_asked: u32,
    pub total_score: f64,
    pub final_percentage: f64,
    pub is_complete: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion: Option<CompletionReason>,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub stages: Vec<StageStatus>,
}

impl SessionSummary {
    pub fn new(session: &AdaptiveSession, final_percentage: f64) -> Self {
        Self {
            session_id: session.session_id().to_string(),
            current_stage: session.current_stage(),
            current_phase: session.current_phase(),
            total_questions_asked: session.total_questions_asked(),
            total_score: session.total_score(),
            final_percentage,
            is_complete: session.is_complete(),
            completion: session.completion(),
            started_at: session.started_at(),
            completed_at: session.completed_at(),
            stages: session.stage_statuses().iter().cloned().collect(),
        }
    }

    /// Human-readable multi-line report
    pub fn render(&self) -> String {
        let mut out = format!(
            "Session {}: {} questions, score {:.1} ({:.1}%)\n",
            self.session_id, self.total_questions_asked, self.total_score, self.final_percentage
        );
        for stage in &self.stages {
            let state = if stage.passed {
                "passed"
            } else if stage.in_recovery {
                "in recovery"
            } else if stage.questions_asked > 0 {
                "in progress"
            } else {
                "not reached"
            };
            out.push_str(&format!(
                "  {:<6} {}/{} correct, score {:.1}, {}\n",
                stage.stage.as_str(),
                stage.correct_answers,
                stage.questions_asked,
                stage.score,
                state
            ));
        }
        match self.completion {
            Some(reason) => out.push_str(&format!("  complete: {}\n", reason)),
            None => out.push_str(&format!(
                "  next: {} ({})\n",
                self.current_stage, self.current_phase
            )),
        }
        out
    }
}
