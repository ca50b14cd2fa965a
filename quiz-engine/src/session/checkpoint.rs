//! Session checkpoints
//!
//! A checkpoint is the full [`AdaptiveSession`] as JSON, written after every
//! transition by whatever store owns persistence. Loading re-checks every
//! session invariant against the policy table so a tampered or truncated
//! document never re-enters the engine.

use crate::error::{QuizError, QuizResult};
use crate::policy::{Stage, StagePolicyTable};
use crate::session::state::{AdaptiveSession, CompletionReason};
use std::collections::HashSet;
use std::path::Path;

const SCORE_TOLERANCE: f64 = 1e-6;

impl AdaptiveSession {
    /// Serialize the session as a pretty-printed JSON checkpoint
    pub fn to_checkpoint(&self) -> QuizResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| QuizError::Serialization {
            message: e.to_string(),
        })
    }

    /// Parse a JSON checkpoint and validate it against `policy`
    pub fn from_checkpoint(json: &str, policy: &StagePolicyTable) -> QuizResult<Self> {
        let session: AdaptiveSession =
            serde_json::from_str(json).map_err(|e| QuizError::Serialization {
                message: e.to_string(),
            })?;
        session.validate(policy)?;
        Ok(session)
    }

    /// Check every session invariant against `policy`
    pub fn validate(&self, policy: &StagePolicyTable) -> QuizResult<()> {
        let asked_sum: u32 = self
            .stage_statuses
            .iter()
            .map(|s| s.questions_asked)
            .sum();
        if asked_sum != self.total_questions_asked {
            return Err(QuizError::corrupt(format!(
                "total_questions_asked {} does not match stage sum {}",
                self.total_questions_asked, asked_sum
            )));
        }
        if self.total_questions_asked > policy.max_questions() {
            return Err(QuizError::corrupt(format!(
                "total_questions_asked {} exceeds cap {}",
                self.total_questions_asked,
                policy.max_questions()
            )));
        }

        if !self.is_complete && self.total_questions_asked >= policy.max_questions() {
            return Err(QuizError::corrupt(format!(
                "running session already at cap {}",
                policy.max_questions()
            )));
        }

        let mut seen = HashSet::new();
        for id in &self.used_question_ids {
            if !seen.insert(id.as_str()) {
                return Err(QuizError::corrupt(format!("question {} used twice", id)));
            }
        }
        if self.used_question_ids.len() != self.total_questions_asked as usize {
            return Err(QuizError::corrupt(format!(
                "{} used question ids for {} answers",
                self.used_question_ids.len(),
                self.total_questions_asked
            )));
        }

        for status in self.stage_statuses.iter() {
            self.validate_stage(status.stage, policy)?;
        }

        let score_sum: f64 = self.stage_statuses.iter().map(|s| s.score).sum();
        if !self.total_score.is_finite() || (score_sum - self.total_score).abs() > SCORE_TOLERANCE
        {
            return Err(QuizError::corrupt(format!(
                "total_score {} does not match stage sum {}",
                self.total_score, score_sum
            )));
        }

        match (self.is_complete, self.completion) {
            (false, Some(reason)) => Err(QuizError::corrupt(format!(
                "incomplete session carries completion reason {}",
                reason
            ))),
            (true, None) => Err(QuizError::corrupt("complete session has no reason")),
            (false, None) if self.status(self.current_stage).passed => Err(QuizError::corrupt(
                format!("current stage {} is passed", self.current_stage),
            )),
            (true, Some(CompletionReason::RecoveryFailed { stage }))
                if stage != self.current_stage =>
            {
                Err(QuizError::corrupt(format!(
                    "recovery failed at {} but current stage is {}",
                    stage, self.current_stage
                )))
            }
            _ => Ok(()),
        }
    }

    fn validate_stage(&self, stage: Stage, policy: &StagePolicyTable) -> QuizResult<()> {
        let status = self.status(stage);
        let config = policy.config_for(stage);
        let fail = |what: String| Err(QuizError::corrupt(format!("stage {}: {}", stage, what)));

        if status.stage != stage {
            return fail(format!("stored under the wrong key ({})", status.stage));
        }
        if status.correct_answers > status.questions_asked
            || status.recovery_correct > status.recovery_asked
            || status.recovery_asked > status.questions_asked
        {
            return fail("correct/asked counters are inconsistent".into());
        }
        if status.initial_asked() > config.initial_questions
            || status.recovery_asked > config.recovery_questions
        {
            return fail("more answers than the policy allows".into());
        }
        if status.recovery_round > 1 {
            return fail(format!("recovery_round {} > 1", status.recovery_round));
        }
        if status.recovery_round == 0 && (status.recovery_asked > 0 || status.in_recovery) {
            return fail("recovery answers without a recovery round".into());
        }
        if status.in_recovery && (stage != self.current_stage || status.passed) {
            return fail("in recovery but not the active stage".into());
        }
        if !status.score.is_finite() || status.score < 0.0 {
            return fail(format!("invalid score {}", status.score));
        }

        if stage < self.current_stage && !status.passed {
            return fail("earlier stage not passed".into());
        }
        if stage > self.current_stage && !status.is_pristine() {
            return fail("later stage already has progress".into());
        }

        // A running stage never sits on a finished block
        if stage == self.current_stage && !self.is_complete && !status.passed {
            if !status.in_recovery && status.initial_asked() >= config.initial_questions {
                return fail("initial block used up without a decision".into());
            }
            if status.in_recovery && status.recovery_asked >= config.recovery_questions {
                return fail("recovery block used up without a decision".into());
            }
        }
        Ok(())
    }
}

/// Write a session checkpoint to `path`
pub fn save_checkpoint(session: &AdaptiveSession, path: &Path) -> QuizResult<()> {
    let json = session.to_checkpoint()?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Load and validate a session checkpoint from `path`
pub fn load_checkpoint(path: &Path, policy: &StagePolicyTable) -> QuizResult<AdaptiveSession> {
    let json = std::fs::read_to_string(path)?;
    AdaptiveSession::from_checkpoint(&json, policy)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> StagePolicyTable {
        StagePolicyTable::default()
    }

    /// Session with `asked` answers recorded on Easy and nothing decided
    fn easy_session(id: &str, asked: u32, correct: u32, points: f64) -> AdaptiveSession {
        let mut session = AdaptiveSession::new(id);
        let easy = session.status_mut(Stage::Easy);
        easy.questions_asked = asked;
        easy.correct_answers = correct;
        easy.score = points;
        session.total_questions_asked = asked;
        session.total_score = points;
        session.used_question_ids = (0..asked).map(|i| format!("q{}", i)).collect();
        session
    }

    #[test]
    fn test_fresh_session_checkpoint_roundtrip() {
        let session = AdaptiveSession::new("cp-1");
        let json = session.to_checkpoint().unwrap();
        let restored = AdaptiveSession::from_checkpoint(&json, &policy()).unwrap();
        assert_eq!(restored, session);
    }

    #[test]
    fn test_checkpoint_rejects_total_mismatch() {
        let mut session = AdaptiveSession::new("cp-2");
        session.total_questions_asked = 2;
        let json = session.to_checkpoint().unwrap();
        let err = AdaptiveSession::from_checkpoint(&json, &policy()).unwrap_err();
        assert_eq!(err.code(), "CORRUPT_CHECKPOINT");
    }

    #[test]
    fn test_checkpoint_rejects_duplicate_ids() {
        let mut session = AdaptiveSession::new("cp-3");
        session.status_mut(Stage::Easy).questions_asked = 2;
        session.total_questions_asked = 2;
        session.used_question_ids = vec!["q1".into(), "q1".into()];
        let err = session.validate(&policy()).unwrap_err();
        assert!(err.to_string().contains("used twice"));
    }

    #[test]
    fn test_checkpoint_rejects_recovery_outside_current_stage() {
        let mut session = AdaptiveSession::new("cp-4");
        let hard = session.status_mut(Stage::Hard);
        hard.in_recovery = true;
        hard.recovery_round = 1;
        assert!(session.validate(&policy()).is_err());
    }

    #[test]
    fn test_checkpoint_rejects_unpassed_earlier_stage() {
        let mut session = AdaptiveSession::new("cp-5");
        session.current_stage = Stage::Medium;
        let err = session.validate(&policy()).unwrap_err();
        assert!(err.to_string().contains("earlier stage not passed"));
    }

    #[test]
    fn test_checkpoint_rejects_complete_without_reason() {
        let mut session = AdaptiveSession::new("cp-6");
        session.is_complete = true;
        assert!(session.validate(&policy()).is_err());
    }

    #[test]
    fn test_checkpoint_rejects_running_session_at_cap() {
        let engine = crate::engine::TransitionEngine::default();
        let mut session = engine.start_session("cp-cap");
        for i in 0..5 {
            engine
                .submit_answer(&mut session, true, &format!("q{}", i))
                .unwrap();
        }
        let json = session.to_checkpoint().unwrap();
        assert!(AdaptiveSession::from_checkpoint(&json, &policy()).is_ok());

        let mut config = crate::policy::AdaptiveConfig::default();
        config.max_questions = 5;
        let tight = StagePolicyTable::new(config).unwrap();
        let err = AdaptiveSession::from_checkpoint(&json, &tight).unwrap_err();
        assert_eq!(err.code(), "CORRUPT_CHECKPOINT");
        assert!(err.to_string().contains("already at cap"));
    }

    #[test]
    fn test_checkpoint_rejects_undecided_initial_block() {
        let session = easy_session("cp-initial", 5, 2, 6.0);
        let err = session.validate(&policy()).unwrap_err();
        assert!(err.to_string().contains("initial block used up"));

        let partial = easy_session("cp-initial-ok", 4, 2, 6.0);
        assert!(partial.validate(&policy()).is_ok());
    }

    #[test]
    fn test_checkpoint_rejects_undecided_recovery_block() {
        let mut session = easy_session("cp-recovery", 8, 3, 8.0);
        let easy = session.status_mut(Stage::Easy);
        easy.in_recovery = true;
        easy.recovery_round = 1;
        easy.recovery_asked = 3;
        easy.recovery_correct = 1;
        let err = session.validate(&policy()).unwrap_err();
        assert!(err.to_string().contains("recovery block used up"));

        let easy = session.status_mut(Stage::Easy);
        easy.questions_asked = 7;
        easy.recovery_asked = 2;
        session.total_questions_asked = 7;
        session.used_question_ids.pop();
        assert!(session.validate(&policy()).is_ok());
    }

    #[test]
    fn test_checkpoint_rejects_garbage() {
        let err = AdaptiveSession::from_checkpoint("{not json", &policy()).unwrap_err();
        assert_eq!(err.code(), "SERIALIZATION_ERROR");
    }

    #[test]
    fn test_checkpoint_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let session = AdaptiveSession::new("cp-file");

        save_checkpoint(&session, &path).unwrap();
        let restored = load_checkpoint(&path, &policy()).unwrap();
        assert_eq!(restored, session);
    }
}
