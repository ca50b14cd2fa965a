//! Scorer: per-answer points and threshold checks
//!
//! Points are awarded per correct answer at the rate of the phase the
//! answer was given in. They are never rescaled afterwards: a stage that
//! fails recovery keeps every point it earned.

use crate::policy::{Phase, StageConfig, StagePolicyTable};

/// Precision thresholds are written at (0.67 means "two out of three")
const RATIO_DECIMALS: f64 = 100.0;
const RATIO_EPSILON: f64 = 1e-9;

/// Points for a single answer
pub fn points_for(config: &StageConfig, phase: Phase, is_correct: bool) -> f64 {
    if !is_correct {
        return 0.0;
    }
    match phase {
        Phase::Initial => config.base_points,
        Phase::Recovery => config.recovery_points,
    }
}

/// Inclusive threshold check on a correct/asked ratio.
///
/// Passes when either the raw ratio or the ratio rounded to hundredths
/// reaches the threshold: 2/3 meets 0.67 through rounding, 1/3 meets 0.333
/// directly, 1/3 never meets 0.67.
pub fn meets_threshold(correct: u32, asked: u32, threshold: f64) -> bool {
    if asked == 0 {
        return threshold <= 0.0;
    }
    let ratio = f64::from(correct) / f64::from(asked);
    let rounded = (ratio * RATIO_DECIMALS).round() / RATIO_DECIMALS;
    ratio + RATIO_EPSILON >= threshold || rounded + RATIO_EPSILON >= threshold
}

/// Score as a percentage of the first-pass maximum, capped at 100
pub fn final_percentage(total_score: f64, policy: &StagePolicyTable) -> f64 {
    let max_score = policy.max_score();
    if max_score <= 0.0 {
        return 0.0;
    }
    (total_score / max_score * 100.0).min(100.0)
}
