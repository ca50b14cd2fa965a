//! Question Request Builder
//!
//! Turns the session's position (stage + phase) into a description of which
//! pool the next question must come from. The lookup itself belongs to a
//! [`QuestionRepository`](crate::repository::QuestionRepository).

use crate::error::{QuizError, QuizResult};
use crate::policy::Stage;
use crate::session::AdaptiveSession;
use serde::{Deserialize, Serialize};

/// Which question pool to draw from next
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRequest {
    pub session_id: String,
    pub stage: Stage,
    /// Every question already presented in this session
    pub exclude_ids: Vec<String>,
    pub is_recovery: bool,
}

impl QuestionRequest {
    /// Whether `question_id` must not be returned for this request
    pub fn excludes(&self, question_id: &str) -> bool {
        self.exclude_ids.iter().any(|id| id == question_id)
    }
}

/// Build the request for the session's next question.
///
/// Fails with [`QuizError::InvalidTransition`] once the session is complete.
pub fn build_request(session: &AdaptiveSession) -> QuizResult<QuestionRequest> {
    if session.is_complete() {
        return Err(QuizError::InvalidTransition {
            session_id: session.session_id().to_string(),
        });
    }

    Ok(QuestionRequest {
        session_id: session.session_id().to_string(),
        stage: session.current_stage(),
        exclude_ids: session.used_question_ids().to_vec(),
        is_recovery: session.current_phase().is_recovery(),
    })
}
