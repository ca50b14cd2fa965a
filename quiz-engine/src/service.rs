//! Quiz service: the surface exposed to transport handlers
//!
//! Pairs the [`TransitionEngine`] with a [`QuestionRepository`]: starting a
//! session yields the first question, submitting an answer yields either the
//! next question or the final result.
//!
//! Callers serialize submissions per session (one in-flight
//! `submit_answer` per session id); the service holds no per-session state.

use crate::engine::{AnswerOutcome, CompletionResult, NextStep, TransitionEngine};
use crate::error::{QuizError, QuizResult};
use crate::report::SessionSummary;
use crate::repository::QuestionRepository;
use crate::request::{build_request, QuestionRequest};
use crate::session::AdaptiveSession;
use serde::Serialize;
use tracing::warn;

/// A freshly started session and the question to ask first
#[derive(Debug, Clone, Serialize)]
pub struct StartedSession {
    pub session: AdaptiveSession,
    pub first_question_id: String,
}

/// Result of submitting an answer through the service
#[derive(Debug, Clone, Serialize)]
pub struct Submission {
    pub outcome: AnswerOutcome,
    /// Question to ask next; `None` once the session is complete
    pub next_question_id: Option<String>,
}

impl Submission {
    pub fn completion(&self) -> Option<&CompletionResult> {
        self.outcome.completion()
    }
}

pub struct QuizService<R: QuestionRepository> {
    engine: TransitionEngine,
    repository: R,
}

impl<R: QuestionRepository> QuizService<R> {
    pub fn new(engine: TransitionEngine, repository: R) -> Self {
        Self { engine, repository }
    }

    pub fn engine(&self) -> &TransitionEngine {
        &self.engine
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Create a zeroed session and resolve its first question
    pub async fn start_session(&self, session_id: impl Into<String>) -> QuizResult<StartedSession> {
        let session = self.engine.start_session(session_id);
        let first_question_id = self.next_question(&session).await?;
        Ok(StartedSession {
            session,
            first_question_id,
        })
    }

    /// Record an answer and resolve the next question.
    ///
    /// The answer is committed to `session` before the lookup. If the
    /// repository then fails (typically [`QuizError::ExhaustedQuestionPool`])
    /// the error is returned unchanged with the answer kept; the caller can
    /// end the attempt with [`QuizService::close_session`].
    pub async fn submit_answer(
        &self,
        session: &mut AdaptiveSession,
        is_correct: bool,
        question_id: &str,
    ) -> QuizResult<Submission> {
        let outcome = self.engine.submit_answer(session, is_correct, question_id)?;
        let next_question_id = match &outcome.next {
            NextStep::Ask(request) => Some(self.select(request).await?),
            NextStep::Complete(_) => None,
        };
        Ok(Submission {
            outcome,
            next_question_id,
        })
    }

    /// Resolve the question to ask next without changing the session
    pub async fn next_question(&self, session: &AdaptiveSession) -> QuizResult<String> {
        let request = build_request(session)?;
        self.select(&request).await
    }

    /// End an unfinished session early
    pub fn close_session(&self, session: &mut AdaptiveSession) -> QuizResult<CompletionResult> {
        self.engine.close(session)
    }

    pub fn summary(&self, session: &AdaptiveSession) -> SessionSummary {
        self.engine.summary(session)
    }

    async fn select(&self, request: &QuestionRequest) -> QuizResult<String> {
        let question_id = self.repository.select_question(request).await.map_err(|e| {
            warn!(
                session = %request.session_id,
                stage = %request.stage,
                recovery = request.is_recovery,
                error = %e,
                "Question lookup failed"
            );
            e
        })?;

        // A repository handing back an excluded id would break the
        // no-reuse invariant on the next submission.
        if request.excludes(&question_id) {
            return Err(QuizError::DuplicateQuestion {
                session_id: request.session_id.clone(),
                question_id,
            });
        }
        Ok(question_id)
    }
}
