//! Summary statistics for batch distribution runs

use serde::{Deserialize, Serialize};

/// Per-slot percentages and spread of a distribution result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionStats {
    pub counts: Vec<u32>,
    pub total: u32,
    /// `count / total * 100` per slot
    pub percentages: Vec<f64>,
    /// Percentage minus the uniform expectation, per slot
    pub deviations: Vec<f64>,
    /// Uniform expectation in percent (`100 / num_slots`)
    pub expected_percentage: f64,
    /// Uniform expectation in balls per slot (`total / num_slots`)
    pub expected_count: f64,
    /// Standard deviation of counts around `expected_count`
    pub std_dev: f64,
}

impl DistributionStats {
    pub fn from_counts(counts: &[u32]) -> Self {
        let total: u32 = counts.iter().sum();
        let slots = counts.len().max(1) as f64;
        let expected_percentage = 100.0 / slots;
        let expected_count = total as f64 / slots;

        let percentages: Vec<f64> = counts
            .iter()
            .map(|&c| {
                if total == 0 {
                    0.0
                } else {
                    c as f64 / total as f64 * 100.0
                }
            })
            .collect();
        let deviations = percentages.iter().map(|p| p - expected_percentage).collect();

        let variance = counts
            .iter()
            .map(|&c| (c as f64 - expected_count).powi(2))
            .sum::<f64>()
            / slots;

        Self {
            counts: counts.to_vec(),
            total,
            percentages,
            deviations,
            expected_percentage,
            expected_count,
            std_dev: variance.sqrt(),
        }
    }

    pub fn num_slots(&self) -> usize {
        self.counts.len()
    }

    /// Largest absolute deviation from uniform, in percentage points
    pub fn max_deviation(&self) -> f64 {
        self.deviations.iter().fold(0.0, |m, d| m.max(d.abs()))
    }

    /// Whether every slot is within `points` percentage points of uniform
    pub fn within_tolerance(&self, points: f64) -> bool {
        self.max_deviation() <= points
    }
}
