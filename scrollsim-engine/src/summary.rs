//! Reportable statistics derived from a finished run.
use serde::{Deserialize, Serialize};

use crate::collector::AggregationCollector;
use crate::config::SimulationConfig;
use crate::numbers::{count_to_f64, percentage, ratio};

/// Survivors that finished with exactly `success_count` successful applications.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SuccessBucket {
    pub success_count: u32,
    pub count: u64,
    /// Share of all trials, in percent.
    pub percentage: f64,
}

/// Survivors that finished with exactly `ability` total ability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityPoint {
    pub ability: u64,
    pub frequency: u64,
}

/// Complete summary of a run, handed to reports.
///
/// Rates are fractions of `trial_count`; destroyed trials count toward the
/// denominator of every rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSummary {
    pub trial_count: u64,
    pub slot_count: u32,
    pub threshold_ability: u64,
    pub destroyed_count: u64,
    pub destruction_rate: f64,
    pub survivor_count: u64,
    pub qualified_count: u64,
    pub qualified_rate: f64,
    pub average_ability_of_survivors: f64,
    pub success_count_distribution: Vec<SuccessBucket>,
    /// Ascending by ability.
    pub ability_distribution: Vec<AbilityPoint>,
}

impl ResultSummary {
    /// Reduce a finished collector and the config that produced it.
    #[must_use]
    pub fn from_run(collector: &AggregationCollector, config: &SimulationConfig) -> Self {
        let trial_count = config.trial_count();
        let destroyed_count = collector.destroyed_count();
        let survivor_count = trial_count.saturating_sub(destroyed_count);

        let mut ability_distribution: Vec<AbilityPoint> = collector
            .ability_histogram()
            .iter()
            .map(|(&ability, &frequency)| AbilityPoint { ability, frequency })
            .collect();
        ability_distribution.sort_unstable_by_key(|point| point.ability);

        let ability_total: f64 = ability_distribution
            .iter()
            .map(|point| count_to_f64(point.ability) * count_to_f64(point.frequency))
            .sum();
        let average_ability_of_survivors = if survivor_count > 0 {
            ability_total / count_to_f64(survivor_count)
        } else {
            0.0
        };

        let success_count_distribution = (0..=config.slot_count())
            .map(|success_count| {
                let count = usize::try_from(success_count)
                    .ok()
                    .and_then(|index| collector.success_count_histogram().get(index))
                    .copied()
                    .unwrap_or(0);
                SuccessBucket {
                    success_count,
                    count,
                    percentage: percentage(count, trial_count),
                }
            })
            .collect();

        let threshold_ability = config.threshold_ability();
        let qualified_count = qualified_in(&ability_distribution, threshold_ability);

        Self {
            trial_count,
            slot_count: config.slot_count(),
            threshold_ability,
            destroyed_count,
            destruction_rate: ratio(destroyed_count, trial_count),
            survivor_count,
            qualified_count,
            qualified_rate: ratio(qualified_count, trial_count),
            average_ability_of_survivors,
            success_count_distribution,
            ability_distribution,
        }
    }

    /// Survivors whose ability reaches `threshold`.
    #[must_use]
    pub fn qualified_count_at(&self, threshold: u64) -> u64 {
        qualified_in(&self.ability_distribution, threshold)
    }

    #[must_use]
    pub fn destruction_percentage(&self) -> f64 {
        self.destruction_rate * 100.0
    }

    #[must_use]
    pub fn qualified_percentage(&self) -> f64 {
        self.qualified_rate * 100.0
    }
}

fn qualified_in(distribution: &[AbilityPoint], threshold: u64) -> u64 {
    distribution
        .iter()
        .filter(|point| point.ability >= threshold)
        .map(|point| point.frequency)
        .sum()
}
