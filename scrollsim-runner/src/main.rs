mod common;
mod logic;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Instant;

use common::OutputTarget;
use logic::{PlanRequest, RunReport, resolve_plan, resolve_seed};
use scrollsim_engine::{DrawPolicy, Execution, RunOptions, ScrollCatalog, simulate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SlotPreset {
    #[value(name = "5")]
    Five,
    #[value(name = "7")]
    Seven,
    #[value(name = "10")]
    Ten,
}

impl SlotPreset {
    const fn slots(self) -> u32 {
        match self {
            Self::Five => 5,
            Self::Seven => 7,
            Self::Ten => 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExecutionMode {
    /// One batch after another on the current thread
    Sequential,
    /// Batches spread over the rayon pool
    Parallel,
}

impl From<ExecutionMode> for Execution {
    fn from(mode: ExecutionMode) -> Self {
        match mode {
            ExecutionMode::Sequential => Self::Sequential,
            ExecutionMode::Parallel => Self::Parallel,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DrawMode {
    /// Separate draws for success and destruction
    Two,
    /// One draw per application
    Single,
}

impl From<DrawMode> for DrawPolicy {
    fn from(mode: DrawMode) -> Self {
        match mode {
            DrawMode::Two => Self::TwoDraw,
            DrawMode::Single => Self::SingleDraw,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Console,
    Json,
    Markdown,
    Csv,
}

#[derive(Debug, Parser)]
#[command(name = "scrollsim", version = "0.1.0")]
#[command(about = "Monte Carlo estimate of scroll enhancement outcomes")]
struct Args {
    /// Number of simulated items
    #[arg(long, value_parser = clap::value_parser!(u64).range(1_000..=1_000_000))]
    trials: Option<u64>,

    /// Upgrade slots on the item
    #[arg(long, value_enum)]
    slots: Option<SlotPreset>,

    /// Ability total an item must reach to count as qualified
    #[arg(long, value_parser = clap::value_parser!(u64).range(0..=100))]
    threshold: Option<u64>,

    /// Scroll usages as NAME=COUNT, applied in the order given (repeatable, comma-separated)
    #[arg(long = "use", value_name = "NAME=COUNT")]
    usages: Vec<String>,

    /// JSON plan file with custom scroll definitions
    #[arg(long)]
    plan: Option<PathBuf>,

    /// Seed: decimal, 0x-prefixed hex, or `random`
    #[arg(long, default_value = "1337")]
    seed: String,

    /// How trial batches are executed
    #[arg(long, value_enum, default_value_t = ExecutionMode::Parallel)]
    execution: ExecutionMode,

    /// Random draws consumed per scroll application
    #[arg(long, value_enum, default_value_t = DrawMode::Two)]
    draws: DrawMode,

    /// Output report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// List the standard scrolls and exit
    #[arg(long)]
    list_scrolls: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn plan_request(&self) -> PlanRequest {
        PlanRequest {
            trials: self.trials,
            slots: self.slots.map(SlotPreset::slots),
            threshold: self.threshold,
            usages: self.usages.clone(),
            plan_file: self.plan.clone(),
            draw_policy: self.draws.into(),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let catalog = ScrollCatalog::standard();
    if maybe_list_scrolls(&args, &catalog)? {
        return Ok(());
    }

    let seed = resolve_seed(&args.seed)?;
    let config = resolve_plan(&args.plan_request(), &catalog)?;

    let start_time = Instant::now();
    let options = RunOptions::default().with_execution(args.execution.into());
    let summary = simulate(&config, seed, &options)?;
    log::info!(
        "{} of {} items destroyed",
        summary.destroyed_count,
        summary.trial_count
    );

    let report = RunReport {
        config: &config,
        summary: &summary,
        seed,
        elapsed: start_time.elapsed(),
    };
    write_report(&args, &report)
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn maybe_list_scrolls(args: &Args, catalog: &ScrollCatalog) -> Result<bool> {
    if !args.list_scrolls {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available scrolls:")?;
    for scroll in catalog.iter() {
        writeln!(
            output_target.writer(),
            "  {:6} success {:>5.1}%  +{:<2} {}",
            scroll.name(),
            scroll.success_rate() * 100.0,
            scroll.ability_value_on_success(),
            if scroll.can_destroy_on_failure() {
                "may destroy on failure"
            } else {
                "never destroys"
            }
        )?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn write_report(args: &Args, report: &RunReport<'_>) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;
    let out = output_target.writer();
    match args.report {
        ReportFormat::Json => logic::reports::generate_json_report(out, report)?,
        ReportFormat::Markdown => logic::reports::generate_markdown_report(out, report)?,
        ReportFormat::Csv => logic::reports::generate_csv_report(out, report)?,
        ReportFormat::Console => logic::reports::generate_console_report(out, report)?,
    }
    output_target.flush_inner()?;
    Ok(())
}
