//! Denormalized-metric recomputation over an audit's active evaluations.
//!
//! Runs after every evaluation mutation so the aggregate's `progress` and
//! `total_score` stay consistent without a join at read time. The
//! computation is a pure function of the current evaluation set, so re-running
//! it is always safe.

use super::domain::Evaluation;

/// Rounds to two decimals, the precision every reported percentage and mean
/// score carries.
pub(crate) fn round_two(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Figures derived from one pass over the evaluation set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSnapshot {
    pub total: u32,
    pub completed: u32,
    /// Completion percentage, 0.0 when the audit has no evaluations yet.
    pub progress: f64,
    /// Mean score over completed evaluations, 0.0 when none are completed.
    pub total_score: f64,
}

/// Measures completion and mean score for the given evaluations.
pub fn measure(evaluations: &[Evaluation]) -> ProgressSnapshot {
    let total = evaluations.len() as u32;
    let completed_scores: Vec<f64> = evaluations
        .iter()
        .filter(|evaluation| evaluation.is_completed)
        .map(|evaluation| evaluation.score)
        .collect();
    let completed = completed_scores.len() as u32;

    let progress = if total == 0 {
        0.0
    } else {
        round_two(f64::from(completed) / f64::from(total) * 100.0)
    };
    let total_score = if completed == 0 {
        0.0
    } else {
        round_two(completed_scores.iter().sum::<f64>() / f64::from(completed))
    };

    ProgressSnapshot {
        total,
        completed,
        progress,
        total_score,
    }
}
