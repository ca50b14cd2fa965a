//! Error taxonomy for the adaptive quiz engine
//!
//! Two layers:
//! - [`ConfigError`]: problems with the stage policy table. Raised while the
//!   table is loaded and validated, never while a session is being scored.
//! - [`QuizError`]: everything a caller can hit while driving a session.
//!
//! Every engine error path leaves the session untouched.

use crate::policy::Stage;
use thiserror::Error;

/// Result type alias for engine and service operations
pub type QuizResult<T> = Result<T, QuizError>;

/// Errors raised while loading or validating a stage policy table
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A stage of the enumeration has no entry in the table
    #[error("Stage policy table has no entry for stage '{stage}'")]
    MissingStage { stage: Stage },

    /// A stage name that is not part of the enumeration
    #[error("Unknown stage '{name}' (expected easy, medium or hard)")]
    UnknownStage { name: String },

    /// A stage entry holds a value outside its legal range
    #[error("Invalid value for {stage}.{field}: {reason}")]
    InvalidValue {
        stage: Stage,
        field: &'static str,
        reason: String,
    },

    /// The global question cap must allow at least one question
    #[error("max_questions must be greater than zero")]
    InvalidMaxQuestions,

    /// The policy file could not be parsed
    #[error("Failed to parse policy table: {message}")]
    Parse { message: String },

    /// The policy table could not be rendered
    #[error("Failed to serialize policy table: {message}")]
    Serialize { message: String },

    /// The policy file could not be read
    #[error("Failed to read policy table: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors surfaced while driving an adaptive session
#[derive(Error, Debug)]
pub enum QuizError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The session is already complete; no further transitions are allowed
    #[error("Session {session_id} is already complete")]
    InvalidTransition { session_id: String },

    /// The question was already presented in this session
    #[error("Question {question_id} was already used in session {session_id}")]
    DuplicateQuestion {
        session_id: String,
        question_id: String,
    },

    /// The question repository has no unused eligible question left
    #[error("No unused question left for stage {stage} (recovery: {is_recovery})")]
    ExhaustedQuestionPool { stage: Stage, is_recovery: bool },

    /// A persisted checkpoint violates a session invariant
    #[error("Corrupt session checkpoint: {reason}")]
    CorruptCheckpoint { reason: String },

    /// A checkpoint could not be encoded or decoded
    #[error("Checkpoint serialization failed: {message}")]
    Serialization { message: String },

    /// A checkpoint file could not be read or written
    #[error("Checkpoint I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

impl QuizError {
    /// Machine-readable error code, stable across releases
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG_ERROR",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::DuplicateQuestion { .. } => "DUPLICATE_QUESTION",
            Self::ExhaustedQuestionPool { .. } => "EXHAUSTED_QUESTION_POOL",
            Self::CorruptCheckpoint { .. } => "CORRUPT_CHECKPOINT",
            Self::Serialization { .. } => "SERIALIZATION_ERROR",
            Self::Io(_) => "IO_ERROR",
        }
    }

    /// Whether the error was caused by the request rather than the system.
    ///
    /// Transport layers map caller errors to 4xx and the rest to 5xx.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidTransition { .. } | Self::DuplicateQuestion { .. }
        )
    }

    pub(crate) fn corrupt(reason: impl Into<String>) -> Self {
        Self::CorruptCheckpoint {
            reason: reason.into(),
        }
    }
}
