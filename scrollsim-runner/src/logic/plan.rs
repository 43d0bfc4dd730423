//! Assembles a validated [`SimulationConfig`] from CLI flags or a JSON plan file.
use anyhow::{Context, Result, bail, ensure};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use scrollsim_engine::{DrawPolicy, ScrollCatalog, ScrollDefinition, SimulationConfig};

use crate::common::split_csv;

pub const DEFAULT_TRIALS: u64 = 100_000;
pub const MIN_TRIALS: u64 = 1_000;
pub const MAX_TRIALS: u64 = 1_000_000;
pub const DEFAULT_SLOTS: u32 = 10;
/// Upper bound for plan-file slot counts; the CLI flag only offers 5, 7 and 10.
pub const MAX_SLOTS: u32 = 64;
pub const DEFAULT_THRESHOLD: u64 = 30;
pub const MAX_THRESHOLD: u64 = 100;

/// Everything the command line contributes to a plan.
#[derive(Debug, Clone, Default)]
pub struct PlanRequest {
    pub trials: Option<u64>,
    pub slots: Option<u32>,
    pub threshold: Option<u64>,
    pub usages: Vec<String>,
    pub plan_file: Option<PathBuf>,
    pub draw_policy: DrawPolicy,
}

/// On-disk plan with custom scroll definitions, applied in listed order.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlanFile {
    pub slots: u32,
    #[serde(default)]
    pub trials: Option<u64>,
    #[serde(default)]
    pub threshold: Option<u64>,
    #[serde(default)]
    pub scrolls: Vec<PlanScroll>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlanScroll {
    pub name: String,
    pub success_rate: f64,
    #[serde(default)]
    pub can_destroy_on_failure: bool,
    #[serde(default)]
    pub ability_value_on_success: u32,
    pub count: u32,
}

impl PlanFile {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    fn sequence(&self) -> Vec<(ScrollDefinition, u32)> {
        self.scrolls
            .iter()
            .map(|entry| {
                let scroll = ScrollDefinition::new(
                    entry.name.clone(),
                    entry.success_rate,
                    entry.can_destroy_on_failure,
                    entry.ability_value_on_success,
                );
                (scroll, entry.count)
            })
            .collect()
    }
}

/// Resolve a request into a validated config.
///
/// Explicit CLI values override plan-file values, which override defaults.
pub fn resolve_plan(request: &PlanRequest, catalog: &ScrollCatalog) -> Result<SimulationConfig> {
    let file = match &request.plan_file {
        Some(path) => {
            ensure!(
                request.usages.is_empty(),
                "--use cannot be combined with --plan"
            );
            Some(load_plan_file(path)?)
        }
        None => None,
    };

    let slots = request
        .slots
        .or(file.as_ref().map(|f| f.slots))
        .unwrap_or(DEFAULT_SLOTS);
    ensure!(
        (1..=MAX_SLOTS).contains(&slots),
        "slot count {slots} outside 1..={MAX_SLOTS}"
    );
    let trials = request
        .trials
        .or(file.as_ref().and_then(|f| f.trials))
        .unwrap_or(DEFAULT_TRIALS);
    ensure!(
        (MIN_TRIALS..=MAX_TRIALS).contains(&trials),
        "trial count {trials} outside {MIN_TRIALS}..={MAX_TRIALS}"
    );
    let threshold = request
        .threshold
        .or(file.as_ref().and_then(|f| f.threshold))
        .unwrap_or(DEFAULT_THRESHOLD);
    ensure!(
        threshold <= MAX_THRESHOLD,
        "threshold {threshold} exceeds {MAX_THRESHOLD}"
    );

    let sequence = match &file {
        Some(file) => file.sequence(),
        None => parse_usages(&request.usages, catalog)?,
    };

    let mut builder = SimulationConfig::builder(slots, trials)
        .threshold_ability(threshold)
        .draw_policy(request.draw_policy);
    for (scroll, count) in sequence {
        builder = builder.scroll(scroll, count);
    }
    let config = builder.build()?;
    log::debug!(
        "resolved plan: {} slots, {} trials, {} scroll entries",
        config.slot_count(),
        config.trial_count(),
        config.scroll_sequence().len()
    );
    Ok(config)
}

fn load_plan_file(path: &Path) -> Result<PlanFile> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read plan {}", path.display()))?;
    PlanFile::from_json(&raw).with_context(|| format!("failed to parse plan {}", path.display()))
}

/// Parse `NAME=COUNT` tokens (each argument may hold a comma-separated list)
/// against the catalog, preserving the order they were given in.
pub fn parse_usages(
    arguments: &[String],
    catalog: &ScrollCatalog,
) -> Result<Vec<(ScrollDefinition, u32)>> {
    arguments
        .iter()
        .flat_map(|argument| split_csv(argument))
        .map(|token| parse_usage(&token, catalog))
        .collect()
}

fn parse_usage(token: &str, catalog: &ScrollCatalog) -> Result<(ScrollDefinition, u32)> {
    let Some((name, count)) = token.split_once('=') else {
        bail!("expected NAME=COUNT, got {token}");
    };
    let count: u32 = count
        .trim()
        .parse()
        .with_context(|| format!("invalid usage count in {token}"))?;
    let Some(scroll) = catalog.get(name) else {
        let known: Vec<&str> = catalog.iter().map(ScrollDefinition::name).collect();
        bail!(
            "unknown scroll {} (known: {})",
            name.trim(),
            known.join(", ")
        );
    };
    Ok((scroll.clone(), count))
}
