//! Immutable run configuration and its validation.
use serde::Serialize;
use thiserror::Error;

use crate::attempt::DrawPolicy;
use crate::scroll::ScrollDefinition;

/// Errors raised when a plan violates configuration invariants.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("scroll usage total {total} exceeds slot count {limit}")]
    OverAllocatedSlots { total: u64, limit: u32 },
}

/// One entry of the ordered scroll sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrollUsage {
    pub scroll: ScrollDefinition,
    pub usage_count: u32,
}

/// A validated operation plan. Scrolls are applied in `scroll_sequence` order,
/// which decides how much progress an item has made before a destruction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationConfig {
    slot_count: u32,
    scroll_sequence: Vec<ScrollUsage>,
    trial_count: u64,
    threshold_ability: u64,
    draw_policy: DrawPolicy,
}

impl SimulationConfig {
    /// Start building a plan for an item with `slot_count` slots simulated `trial_count` times.
    #[must_use]
    pub fn builder(slot_count: u32, trial_count: u64) -> SimulationConfigBuilder {
        SimulationConfigBuilder::new(slot_count, trial_count)
    }

    #[must_use]
    pub const fn slot_count(&self) -> u32 {
        self.slot_count
    }

    #[must_use]
    pub fn scroll_sequence(&self) -> &[ScrollUsage] {
        &self.scroll_sequence
    }

    #[must_use]
    pub const fn trial_count(&self) -> u64 {
        self.trial_count
    }

    #[must_use]
    pub const fn threshold_ability(&self) -> u64 {
        self.threshold_ability
    }

    #[must_use]
    pub const fn draw_policy(&self) -> DrawPolicy {
        self.draw_policy
    }

    /// Total scroll applications across the sequence.
    #[must_use]
    pub fn total_usage(&self) -> u64 {
        total_usage(&self.scroll_sequence)
    }
}

fn total_usage(sequence: &[ScrollUsage]) -> u64 {
    sequence
        .iter()
        .map(|usage| u64::from(usage.usage_count))
        .sum()
}

/// Builder for [`SimulationConfig`]; validation happens in [`SimulationConfigBuilder::build`].
#[derive(Debug, Clone)]
pub struct SimulationConfigBuilder {
    slot_count: u32,
    trial_count: u64,
    threshold_ability: u64,
    draw_policy: DrawPolicy,
    scroll_sequence: Vec<ScrollUsage>,
}

impl SimulationConfigBuilder {
    /// Zero slot or trial counts are raised to one.
    #[must_use]
    pub fn new(slot_count: u32, trial_count: u64) -> Self {
        Self {
            slot_count: slot_count.max(1),
            trial_count: trial_count.max(1),
            threshold_ability: 0,
            draw_policy: DrawPolicy::default(),
            scroll_sequence: Vec::new(),
        }
    }

    #[must_use]
    pub const fn threshold_ability(mut self, threshold: u64) -> Self {
        self.threshold_ability = threshold;
        self
    }

    #[must_use]
    pub const fn draw_policy(mut self, policy: DrawPolicy) -> Self {
        self.draw_policy = policy;
        self
    }

    /// Append a scroll to the end of the sequence.
    #[must_use]
    pub fn scroll(mut self, scroll: ScrollDefinition, usage_count: u32) -> Self {
        self.scroll_sequence.push(ScrollUsage {
            scroll,
            usage_count,
        });
        self
    }

    /// Validate the plan.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::OverAllocatedSlots`] when the scrolls use more
    /// applications than the item has slots.
    pub fn build(self) -> Result<SimulationConfig, ConfigError> {
        let total = total_usage(&self.scroll_sequence);
        if total > u64::from(self.slot_count) {
            return Err(ConfigError::OverAllocatedSlots {
                total,
                limit: self.slot_count,
            });
        }
        Ok(SimulationConfig {
            slot_count: self.slot_count,
            scroll_sequence: self.scroll_sequence,
            trial_count: self.trial_count,
            threshold_ability: self.threshold_ability,
            draw_policy: self.draw_policy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sure_thing() -> ScrollDefinition {
        ScrollDefinition::new("100%", 1.0, false, 1)
    }

    #[test]
    fn rejects_over_allocated_plan_with_total_and_limit() {
        let err = SimulationConfig::builder(5, 1000)
            .scroll(sure_thing(), 4)
            .scroll(ScrollDefinition::new("30%", 0.3, true, 5), 2)
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::OverAllocatedSlots { total: 6, limit: 5 });
        let message = err.to_string();
        assert!(message.contains('6') && message.contains('5'), "{message}");
    }

    #[test]
    fn accepts_exactly_full_plan_and_preserves_order() {
        let config = SimulationConfig::builder(5, 1000)
            .threshold_ability(30)
            .scroll(ScrollDefinition::new("10%", 0.1, false, 5), 2)
            .scroll(sure_thing(), 3)
            .build()
            .unwrap();
        assert_eq!(config.total_usage(), 5);
        assert_eq!(config.threshold_ability(), 30);
        let names: Vec<&str> = config
            .scroll_sequence()
            .iter()
            .map(|usage| usage.scroll.name())
            .collect();
        assert_eq!(names, ["10%", "100%"]);
        assert_eq!(config.draw_policy(), DrawPolicy::TwoDraw);
    }

    #[test]
    fn zero_counts_are_raised_to_one() {
        let config = SimulationConfig::builder(0, 0).build().unwrap();
        assert_eq!(config.slot_count(), 1);
        assert_eq!(config.trial_count(), 1);
        assert!(config.scroll_sequence().is_empty());
    }

    #[test]
    fn zero_usage_entries_do_not_count_against_slots() {
        let config = SimulationConfig::builder(1, 10)
            .scroll(sure_thing(), 0)
            .scroll(sure_thing(), 1)
            .build()
            .unwrap();
        assert_eq!(config.total_usage(), 1);
    }
}
