//! Stage Policy Table
//!
//! Immutable rules describing how each difficulty stage is passed:
//! initial block size and threshold, the single recovery block, and the
//! points awarded per correct answer in each phase.

pub mod stage;
pub mod table;

pub use stage::{Phase, Stage};
pub use table::{AdaptiveConfig, StageConfig, StagePolicyTable};
