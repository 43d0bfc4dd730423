use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::io::Write;
use std::time::Duration;

use scrollsim_engine::{ResultSummary, SimulationConfig};

const BAR_WIDTH: u64 = 40;

/// Everything a report needs to describe one run.
#[derive(Debug, Clone, Copy)]
pub struct RunReport<'a> {
    pub config: &'a SimulationConfig,
    pub summary: &'a ResultSummary,
    pub seed: u64,
    pub elapsed: Duration,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    seed: u64,
    elapsed_ms: u128,
    plan: &'a SimulationConfig,
    summary: &'a ResultSummary,
}

pub fn generate_console_report(out: &mut dyn Write, report: &RunReport<'_>) -> Result<()> {
    let summary = report.summary;

    writeln!(out)?;
    writeln!(out, "{}", "📈 Scroll Enhancement Simulation".bright_cyan().bold())?;
    writeln!(out, "{}", "================================".cyan())?;
    writeln!(out, "Seed: {}", report.seed)?;
    writeln!(
        out,
        "Slots: {}  Trials: {}  Draws: {:?}",
        summary.slot_count,
        summary.trial_count,
        report.config.draw_policy()
    )?;
    write_plan_lines(out, report.config)?;
    writeln!(out)?;

    writeln!(out, "{}", "📊 Results".bright_yellow().bold())?;
    writeln!(out, "{}", "==========".yellow())?;
    writeln!(
        out,
        "Destroyed: {} ({:.2}%)",
        summary.destroyed_count.to_string().red(),
        summary.destruction_percentage()
    )?;
    writeln!(
        out,
        "Reached +{}: {} ({:.2}%)",
        summary.threshold_ability,
        summary.qualified_count.to_string().green(),
        summary.qualified_percentage()
    )?;
    writeln!(
        out,
        "Average ability of survivors: {:.2}",
        summary.average_ability_of_survivors
    )?;
    writeln!(out)?;

    writeln!(out, "{}", "✅ Successful slots".bright_green().bold())?;
    for bucket in &summary.success_count_distribution {
        writeln!(
            out,
            "   {:>2} succeeded: {:>8} ({:.2}%)",
            bucket.success_count, bucket.count, bucket.percentage
        )?;
    }
    writeln!(out)?;

    writeln!(out, "{}", "📉 Ability distribution".bright_blue().bold())?;
    if summary.ability_distribution.is_empty() {
        writeln!(out, "   no surviving items")?;
    }
    let peak = summary
        .ability_distribution
        .iter()
        .map(|point| point.frequency)
        .max()
        .unwrap_or(0);
    for point in &summary.ability_distribution {
        writeln!(
            out,
            "   +{:<4} {:>8} {}",
            point.ability,
            point.frequency,
            bar(point.frequency, peak).blue()
        )?;
    }

    writeln!(out)?;
    writeln!(out, "Total time: {:?}", report.elapsed)?;
    Ok(())
}

fn write_plan_lines(out: &mut dyn Write, config: &SimulationConfig) -> Result<()> {
    if config.scroll_sequence().is_empty() {
        writeln!(out, "Plan: no scrolls")?;
        return Ok(());
    }
    writeln!(out, "Plan (applied in order):")?;
    for usage in config.scroll_sequence() {
        let risk = if usage.scroll.can_destroy_on_failure() {
            "may destroy"
        } else {
            "safe"
        };
        writeln!(
            out,
            "   {} x{} (rate {:.0}%, +{}, {risk})",
            usage.scroll.name(),
            usage.usage_count,
            usage.scroll.success_rate() * 100.0,
            usage.scroll.ability_value_on_success()
        )?;
    }
    Ok(())
}

fn bar(frequency: u64, peak: u64) -> String {
    if peak == 0 {
        return String::new();
    }
    let width = frequency.saturating_mul(BAR_WIDTH) / peak;
    let width = usize::try_from(width.max(u64::from(frequency > 0))).unwrap_or(0);
    "█".repeat(width)
}

pub fn generate_json_report(out: &mut dyn Write, report: &RunReport<'_>) -> Result<()> {
    let payload = JsonReport {
        seed: report.seed,
        elapsed_ms: report.elapsed.as_millis(),
        plan: report.config,
        summary: report.summary,
    };
    serde_json::to_writer_pretty(&mut *out, &payload)?;
    writeln!(out)?;
    Ok(())
}

pub fn generate_markdown_report(out: &mut dyn Write, report: &RunReport<'_>) -> Result<()> {
    let summary = report.summary;

    writeln!(out, "# Scroll Enhancement Simulation\n")?;
    writeln!(out, "## Summary\n")?;
    writeln!(out, "- **Seed**: {}", report.seed)?;
    writeln!(out, "- **Slots**: {}", summary.slot_count)?;
    writeln!(out, "- **Trials**: {}", summary.trial_count)?;
    writeln!(
        out,
        "- **Destroyed**: {} ({:.2}%)",
        summary.destroyed_count,
        summary.destruction_percentage()
    )?;
    writeln!(
        out,
        "- **Reached +{}**: {} ({:.2}%)",
        summary.threshold_ability,
        summary.qualified_count,
        summary.qualified_percentage()
    )?;
    writeln!(
        out,
        "- **Average ability of survivors**: {:.2}\n",
        summary.average_ability_of_survivors
    )?;

    writeln!(out, "## Plan\n")?;
    writeln!(out, "| Order | Scroll | Count | Rate | Ability | Destroys |")?;
    writeln!(out, "|---|---|---|---|---|---|")?;
    for (index, usage) in report.config.scroll_sequence().iter().enumerate() {
        writeln!(
            out,
            "| {} | {} | {} | {:.0}% | +{} | {} |",
            index + 1,
            usage.scroll.name(),
            usage.usage_count,
            usage.scroll.success_rate() * 100.0,
            usage.scroll.ability_value_on_success(),
            if usage.scroll.can_destroy_on_failure() {
                "yes"
            } else {
                "no"
            }
        )?;
    }
    writeln!(out)?;

    writeln!(out, "## Successful Slots\n")?;
    writeln!(out, "| Successes | Items | Share |")?;
    writeln!(out, "|---|---|---|")?;
    for bucket in &summary.success_count_distribution {
        writeln!(
            out,
            "| {} | {} | {:.2}% |",
            bucket.success_count, bucket.count, bucket.percentage
        )?;
    }
    writeln!(out)?;

    writeln!(out, "## Ability Distribution\n")?;
    writeln!(out, "| Ability | Items |")?;
    writeln!(out, "|---|---|")?;
    for point in &summary.ability_distribution {
        writeln!(out, "| {} | {} |", point.ability, point.frequency)?;
    }
    Ok(())
}

/// One row per success bucket followed by one row per ability value.
pub fn generate_csv_report(out: &mut dyn Write, report: &RunReport<'_>) -> Result<()> {
    let summary = report.summary;
    writeln!(out, "kind,value,count,percentage")?;
    for bucket in &summary.success_count_distribution {
        writeln!(
            out,
            "success_count,{},{},{:.4}",
            bucket.success_count, bucket.count, bucket.percentage
        )?;
    }
    for point in &summary.ability_distribution {
        let share = scrollsim_engine::numbers::percentage(point.frequency, summary.trial_count);
        writeln!(
            out,
            "ability,{},{},{share:.4}",
            point.ability, point.frequency
        )?;
    }
    writeln!(
        out,
        "destroyed,,{},{:.4}",
        summary.destroyed_count,
        summary.destruction_percentage()
    )?;
    Ok(())
}
