//! Command-line driver for the adaptive quiz engine
//!
//! Replays scripted answer patterns against an in-memory question pool,
//! persists sessions as JSON checkpoints and prints session summaries.

#![allow(clippy::uninlined_format_args)]

pub mod commands;
pub mod config;
pub mod script;

pub use config::{PoolConfig, RunnerConfig};
pub use script::{parse_answers, replay, AnsweredQuestion, ReplayReport, StopReason};
