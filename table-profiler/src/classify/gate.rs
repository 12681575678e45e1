//! Categorical gate: distinct-value count against an inclusive threshold.

use serde::{Deserialize, Serialize};

/// Outcome of the categorical gate for one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateDecision {
    /// Distinct non-null values in the column.
    pub distinct: u64,
    pub threshold: u64,
}

impl GateDecision {
    pub fn new(distinct: u64, threshold: u64) -> Self {
        Self {
            distinct,
            threshold,
        }
    }

    /// Whether the column is categorical. A count equal to the threshold passes.
    pub fn is_categorical(&self) -> bool {
        self.distinct <= self.threshold
    }
}
