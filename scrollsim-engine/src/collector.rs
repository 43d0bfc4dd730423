//! Run-level histograms folded from per-trial outcomes.
use std::collections::HashMap;

use crate::attempt::AttemptOutcome;

/// Accumulates outcomes for one run (or one batch of a parallel run).
///
/// Destroyed trials only bump `destroyed_count`; survivor histograms see
/// completed trials exclusively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationCollector {
    destroyed_count: u64,
    success_count_histogram: Vec<u64>,
    ability_histogram: HashMap<u64, u64>,
}

impl AggregationCollector {
    /// Empty collector with buckets for `0..=slot_count` successes.
    #[must_use]
    pub fn new(slot_count: u32) -> Self {
        let buckets = usize::try_from(slot_count).map_or(usize::MAX, |n| n.saturating_add(1));
        Self {
            destroyed_count: 0,
            success_count_histogram: vec![0; buckets],
            ability_histogram: HashMap::new(),
        }
    }

    pub fn record(&mut self, outcome: AttemptOutcome) {
        match outcome {
            AttemptOutcome::Destroyed => {
                self.destroyed_count = self.destroyed_count.saturating_add(1);
            }
            AttemptOutcome::Completed {
                success_count,
                total_ability,
            } => {
                let last = self.success_count_histogram.len().saturating_sub(1);
                let bucket = usize::try_from(success_count).map_or(last, |n| n.min(last));
                if let Some(slot) = self.success_count_histogram.get_mut(bucket) {
                    *slot = slot.saturating_add(1);
                }
                let frequency = self.ability_histogram.entry(total_ability).or_insert(0);
                *frequency = frequency.saturating_add(1);
            }
        }
    }

    /// Fold another collector built for the same slot count into this one.
    pub fn merge(&mut self, other: Self) {
        self.destroyed_count = self.destroyed_count.saturating_add(other.destroyed_count);
        if self.success_count_histogram.len() < other.success_count_histogram.len() {
            self.success_count_histogram
                .resize(other.success_count_histogram.len(), 0);
        }
        for (mine, theirs) in self
            .success_count_histogram
            .iter_mut()
            .zip(other.success_count_histogram)
        {
            *mine = mine.saturating_add(theirs);
        }
        for (ability, frequency) in other.ability_histogram {
            let entry = self.ability_histogram.entry(ability).or_insert(0);
            *entry = entry.saturating_add(frequency);
        }
    }

    #[must_use]
    pub const fn destroyed_count(&self) -> u64 {
        self.destroyed_count
    }

    /// Survivor counts indexed by number of successful applications.
    #[must_use]
    pub fn success_count_histogram(&self) -> &[u64] {
        &self.success_count_histogram
    }

    /// Survivor counts keyed by total ability; iteration order is unspecified.
    #[must_use]
    pub const fn ability_histogram(&self) -> &HashMap<u64, u64> {
        &self.ability_histogram
    }

    #[must_use]
    pub fn survivor_count(&self) -> u64 {
        self.success_count_histogram.iter().sum()
    }

    #[must_use]
    pub fn trials_recorded(&self) -> u64 {
        self.destroyed_count.saturating_add(self.survivor_count())
    }
}
