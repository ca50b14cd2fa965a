//! Transition Engine: Deterministic State Machine for Stage Routing
//!
//! Routes a quiz attempt through the difficulty stages based on rolling
//! performance. A pure state machine: no I/O, no clock-dependent decisions.
//!
//! # Stage Ladder
//!
//! ```text
//! Easy ── initial block (5) ──┬─ ratio ≥ pass ──────────────▶ Medium
//!                             └─ ratio < pass ─▶ recovery (3)
//!                                                 ├─ ratio ≥ recovery pass ─▶ Medium
//!                                                 └─ otherwise ─▶ session ends
//! Medium ── same shape ─────────────────────────────────────▶ Hard
//! Hard ── same shape ───────────────────────────────────────▶ session complete
//!
//! Global cap: the answer that reaches max_questions ends the session,
//! even mid-phase.
//! ```

pub mod outcome;
pub mod scoring;
pub mod transition;

pub use outcome::{AnswerOutcome, CompletionResult, NextStep, StagePassed};
pub use scoring::{final_percentage, meets_threshold, points_for};
pub use transition::TransitionEngine;
