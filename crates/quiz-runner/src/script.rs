//! Answer scripts: replay a fixed sequence of answers through the service.

use quiz_engine::{
    AdaptiveSession, QuestionRepository, QuizError, QuizResult, QuizService, SessionSummary,
    Stage,
};
use serde::Serialize;
use tracing::{info, warn};

/// Parse an answer pattern such as `"11010"`, `"yyn"` or `"T F T"`.
///
/// `1`/`y`/`t`/`c` mark a correct answer, `0`/`n`/`f`/`x` an incorrect one.
/// Whitespace, commas and dashes are ignored.
pub fn parse_answers(pattern: &str) -> Result<Vec<bool>, String> {
    pattern
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',' && *c != '-')
        .map(|c| match c.to_ascii_lowercase() {
            '1' | 'y' | 't' | 'c' => Ok(true),
            '0' | 'n' | 'f' | 'x' => Ok(false),
            other => Err(format!("unrecognized answer '{}'", other)),
        })
        .collect()
}

/// Why a replay stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The session completed
    Completed,
    /// The script ran out of answers first
    ScriptExhausted,
    /// The question pool ran dry and the session was closed
    PoolExhausted,
}

/// One scripted answer as the engine saw it
#[derive(Debug, Clone, Serialize)]
pub struct AnsweredQuestion {
    pub question_id: String,
    pub stage: Stage,
    pub is_correct: bool,
    pub points_earned: f64,
    pub is_recovery: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub stopped: StopReason,
    pub answered: Vec<AnsweredQuestion>,
    /// Question waiting for an answer when the script ran out
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_question_id: Option<String>,
    pub summary: SessionSummary,
}

/// Feed `answers` into `session`, starting from `next_question`.
///
/// Pool exhaustion closes the session instead of failing the replay.
pub async fn replay<R: QuestionRepository>(
    service: &QuizService<R>,
    session: &mut AdaptiveSession,
    next_question: String,
    answers: &[bool],
) -> QuizResult<ReplayReport> {
    let mut answered = Vec::with_capacity(answers.len());
    let mut pending = Some(next_question);
    let mut stopped = StopReason::ScriptExhausted;

    for &is_correct in answers {
        let Some(question_id) = pending.take() else {
            break;
        };

        let stage = session.current_stage();
        let is_recovery = session.current_phase().is_recovery();
        let score_before = session.total_score();

        match service.submit_answer(session, is_correct, &question_id).await {
            Ok(submission) => {
                answered.push(AnsweredQuestion {
                    question_id: question_id.clone(),
                    stage,
                    is_correct,
                    points_earned: submission.outcome.points_earned,
                    is_recovery,
                });
                if let Some(result) = submission.completion() {
                    info!(reason = %result.reason, score = result.total_score, "Session finished");
                    stopped = StopReason::Completed;
                    break;
                }
                pending = submission.next_question_id;
            }
            Err(QuizError::ExhaustedQuestionPool {
                stage: next_stage,
                is_recovery: next_recovery,
            }) => {
                // The answer itself was committed before the lookup failed
                warn!(
                    stage = %next_stage,
                    recovery = next_recovery,
                    "Question pool exhausted, closing session"
                );
                answered.push(AnsweredQuestion {
                    question_id: question_id.clone(),
                    stage,
                    is_correct,
                    points_earned: session.total_score() - score_before,
                    is_recovery,
                });
                service.close_session(session)?;
                stopped = StopReason::PoolExhausted;
                break;
            }
            Err(e) => return Err(e),
        }
    }

    if session.is_complete() && stopped == StopReason::ScriptExhausted {
        stopped = StopReason::Completed;
    }

    Ok(ReplayReport {
        stopped,
        answered,
        pending_question_id: if session.is_complete() { None } else { pending },
        summary: service.summary(session),
    })
}
