//! Session State
//!
//! The mutable per-attempt record tracking progress across stages, plus its
//! durable checkpoint form.

pub mod checkpoint;
pub mod state;

pub use checkpoint::{load_checkpoint, save_checkpoint};
pub use state::{AdaptiveSession, CompletionReason, StageStatus, StageStatuses};
