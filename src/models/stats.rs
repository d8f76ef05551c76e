//! Hit statistics.
//!
//! Per-result judgement counts accumulated during a play session.

use crate::models::hit_result::HitResult;
use serde::{Deserialize, Serialize};

/// Accumulated hit statistics for a play session.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitStats {
    counts: [u32; HitResult::COUNT],
}

impl HitStats {
    /// Creates empty hit statistics.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, result: HitResult) {
        self.counts[result.index()] += 1;
    }

    pub fn count(&self, result: HitResult) -> u32 {
        self.counts[result.index()]
    }

    /// Number of judgements that were scorable.
    pub fn scorable(&self) -> u32 {
        self.iter()
            .filter(|(r, _)| r.is_scorable())
            .map(|(_, n)| n)
            .sum()
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    /// Non-zero counts in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (HitResult, u32)> + '_ {
        HitResult::ALL
            .into_iter()
            .map(|r| (r, self.count(r)))
            .filter(|&(_, n)| n > 0)
    }
}
