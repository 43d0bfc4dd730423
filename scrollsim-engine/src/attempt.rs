//! Single-item simulation through the configured scroll sequence.
//!
//! An item starts active and stays active through successes and absorbed
//! failures. It ends either completed, after the last application, or
//! destroyed, at the first destroying failure. Nothing accrued before a
//! destruction is reported.
use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;
use crate::rng::RandomSource;

/// Chance that a failed application of a destroying scroll destroys the item.
pub const DESTROY_ON_FAILURE_CHANCE: f64 = 0.5;

/// How destruction on failure is rolled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawPolicy {
    /// One draw for success, a second independent draw for destruction.
    #[default]
    TwoDraw,
    /// One draw per application, partitioned into success, absorbed failure and destruction.
    SingleDraw,
}

/// Result of one trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AttemptOutcome {
    Completed {
        success_count: u32,
        total_ability: u64,
    },
    Destroyed,
}

impl AttemptOutcome {
    #[must_use]
    pub const fn is_destroyed(&self) -> bool {
        matches!(self, Self::Destroyed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Application {
    Success,
    Absorbed,
    Destroyed,
}

/// Simulate one item's pass through `config`'s scroll sequence.
pub fn simulate_attempt<R>(config: &SimulationConfig, source: &mut R) -> AttemptOutcome
where
    R: RandomSource + ?Sized,
{
    let mut success_count: u32 = 0;
    let mut total_ability: u64 = 0;

    for usage in config.scroll_sequence() {
        let scroll = &usage.scroll;
        for _ in 0..usage.usage_count {
            match apply_scroll(
                scroll.success_rate(),
                scroll.can_destroy_on_failure(),
                config.draw_policy(),
                source,
            ) {
                Application::Success => {
                    success_count = success_count.saturating_add(1);
                    total_ability =
                        total_ability.saturating_add(u64::from(scroll.ability_value_on_success()));
                }
                Application::Absorbed => {}
                Application::Destroyed => return AttemptOutcome::Destroyed,
            }
        }
    }

    AttemptOutcome::Completed {
        success_count: success_count.min(config.slot_count()),
        total_ability,
    }
}

fn apply_scroll<R>(
    success_rate: f64,
    can_destroy: bool,
    policy: DrawPolicy,
    source: &mut R,
) -> Application
where
    R: RandomSource + ?Sized,
{
    let roll = source.next_unit();
    if roll < success_rate {
        return Application::Success;
    }
    if !can_destroy {
        return Application::Absorbed;
    }
    let destroyed = match policy {
        DrawPolicy::TwoDraw => source.next_unit() < DESTROY_ON_FAILURE_CHANCE,
        DrawPolicy::SingleDraw => {
            roll >= success_rate + (1.0 - success_rate) * DESTROY_ON_FAILURE_CHANCE
        }
    };
    if destroyed {
        Application::Destroyed
    } else {
        Application::Absorbed
    }
}
