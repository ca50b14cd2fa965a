//! Adaptive Quiz Engine
//!
//! Adjusts question difficulty per quiz attempt based on rolling performance,
//! enforces a global question budget, and keeps a running score.
//!
//! # Components
//!
//! - [`policy`]: immutable stage policy table (thresholds and points per stage)
//! - [`session`]: mutable per-attempt state and its JSON checkpoint form
//! - [`engine`]: the transition state machine and scorer
//! - [`request`]: builds the description of the next question to draw
//! - [`repository`]: seam to the external question store
//! - [`service`]: start/submit surface consumed by transport handlers
//!
//! # Usage
//!
//! ```
//! use quiz_engine::{StagePolicyTable, TransitionEngine};
//!
//! let engine = TransitionEngine::new(StagePolicyTable::default());
//! let mut session = engine.start_session("attempt-1");
//! let outcome = engine.submit_answer(&mut session, true, "q-1").unwrap();
//! assert_eq!(outcome.points_earned, 3.0);
//! ```

#![allow(clippy::uninlined_format_args)]

pub mod engine;
pub mod error;
pub mod policy;
pub mod report;
pub mod repository;
pub mod request;
pub mod service;
pub mod session;

pub use error::{ConfigError, QuizError, QuizResult};

pub use policy::{AdaptiveConfig, Phase, Stage, StageConfig, StagePolicyTable};

pub use session::{
    load_checkpoint, save_checkpoint, AdaptiveSession, CompletionReason, StageStatus,
    StageStatuses,
};

pub use engine::{
    final_percentage, AnswerOutcome, CompletionResult, NextStep, StagePassed, TransitionEngine,
};

pub use request::{build_request, QuestionRequest};

pub use repository::{InMemoryQuestionRepository, QuestionRepository};

pub use report::SessionSummary;

pub use service::{QuizService, StartedSession, Submission};
