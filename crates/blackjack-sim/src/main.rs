use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use blackjack_bot::Bidspread;
use blackjack_sim::config::{ResolvedOutputs, SimulationConfig, StrategyKind};
use blackjack_sim::logging::init_logging;
use blackjack_sim::report::SimulationSummary;
use blackjack_sim::simulator::Simulator;

/// Blackjack strategy simulator.
#[derive(Debug, Parser)]
#[command(
    name = "blackjack-sim",
    author,
    version,
    about = "Estimates EV and variance of a blackjack strategy over many shoes"
)]
struct Cli {
    /// Path to a YAML configuration file; built-in defaults are used without one.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Decks in the shoe.
    #[arg(long, value_name = "N")]
    decks: Option<usize>,

    /// Dealer hits soft 17.
    #[arg(long, value_name = "BOOL")]
    h17: Option<bool>,

    /// Double after split allowed.
    #[arg(long, value_name = "BOOL")]
    das: Option<bool>,

    /// Resplit aces allowed.
    #[arg(long, value_name = "BOOL")]
    rsa: Option<bool>,

    /// Maximum splits per spot.
    #[arg(long, value_name = "N")]
    splits: Option<u8>,

    /// Cut-card reserve in decks.
    #[arg(long, value_name = "DECKS")]
    pen: Option<f64>,

    /// Shoes to simulate.
    #[arg(long, value_name = "N")]
    shoes: Option<u64>,

    /// Worker threads.
    #[arg(long, value_name = "N")]
    workers: Option<usize>,

    /// Master RNG seed.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Rounds per hour used for hourly EV and variance.
    #[arg(long, value_name = "N")]
    rph: Option<usize>,

    /// Counting strategy.
    #[arg(long, value_enum)]
    strategy: Option<StrategyArg>,

    /// Bid spread as `tc:units[:hands];...`, e.g. `1:2;2:4;4:8:2`.
    #[arg(long, value_name = "SPREAD")]
    spread: Option<Bidspread>,

    /// Take insurance at or above this true count.
    #[arg(long, value_name = "TC", allow_hyphen_values = true)]
    insurance_tc: Option<i32>,

    /// Exit after validating the configuration (no simulation is run).
    #[arg(long)]
    validate_only: bool,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum StrategyArg {
    Flatbet,
    Hilo,
}

impl From<StrategyArg> for StrategyKind {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Flatbet => StrategyKind::Flatbet,
            StrategyArg::Hilo => StrategyKind::Hilo,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => SimulationConfig::from_path(path)?,
        None => SimulationConfig::default(),
    };

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }
    if let Some(decks) = cli.decks {
        config.table.decks = decks;
    }
    if let Some(h17) = cli.h17 {
        config.table.dealer_hits_soft17 = h17;
    }
    if let Some(das) = cli.das {
        config.table.double_after_split = das;
    }
    if let Some(rsa) = cli.rsa {
        config.table.resplit_aces = rsa;
    }
    if let Some(splits) = cli.splits {
        config.table.max_splits = splits;
    }
    if let Some(pen) = cli.pen {
        config.table.penetration = pen;
    }
    if let Some(shoes) = cli.shoes {
        config.simulation.shoes = shoes;
    }
    if let Some(workers) = cli.workers {
        config.simulation.workers = Some(workers);
    }
    if let Some(seed) = cli.seed {
        config.simulation.seed = seed;
    }
    if let Some(rph) = cli.rph {
        config.simulation.rounds_per_hour = rph;
    }
    if let Some(strategy) = cli.strategy {
        config.strategy.kind = strategy.into();
    }
    if let Some(spread) = cli.spread {
        config.strategy.spread = spread;
    }
    if let Some(tc) = cli.insurance_tc {
        config.strategy.insurance_true_count = Some(tc);
    }

    config.validate()?;

    let outputs: ResolvedOutputs = config.resolved_outputs();
    let run_id = config.run_id.clone();
    let settings = config.settings();

    println!(
        "Loaded configuration '{run_id}': {} shoes of {} decks on {} worker{}",
        settings.shoes,
        settings.decks,
        settings.workers,
        if settings.workers == 1 { "" } else { "s" }
    );

    let logging_guard = init_logging(&config.logging, &outputs, &run_id)?;
    let ruleset = config.ruleset().context("building the strategy chart")?;
    let simulator = Simulator::new(settings, ruleset, config.strategy())?;

    if cli.validate_only {
        println!("Validation-only mode: simulation skipped.");
        return Ok(());
    }

    let outcome = simulator.run()?;
    let summary = SimulationSummary::from_outcome(&run_id, &outcome);
    print!("{}", summary.render_text());

    if let Some(path) = outputs.summary_json.as_ref() {
        summary.write_json(path)?;
        println!("Summary (JSON): {}", path.display());
    }
    if let Some(path) = outputs.summary_md.as_ref() {
        summary.write_markdown(path)?;
        println!("Summary (Markdown): {}", path.display());
    }
    if let Some(guard) = logging_guard.as_ref() {
        println!("Telemetry log: {}", guard.telemetry_path.display());
    }

    Ok(())
}
