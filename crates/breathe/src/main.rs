//! breathe - Guided breathing exercises
//!
//! "Slow the breath, slow the mind."
//!
//! Usage:
//!   breathe list                    Show available patterns
//!   breathe show ID                 Show one pattern's timings
//!   breathe default ID              Make a pattern the default
//!   breathe run [--pattern ID]      Guide a live exercise
//!   breathe simulate --ticks N      Print a deterministic tick trace

use std::future::Future;
use std::io::Write;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mindmate_core::config::Config;
use mindmate_core::format::{color, progress_bar, BOLD, CYAN, GREEN, MAGENTA};
use tracing_subscriber::EnvFilter;

use breathe::catalog::{BreatheSettings, PatternCatalog};
use breathe::engine::{BreathingEngine, Snapshot, TickPolicy};
use breathe::pacer::{Pacer, PacerHandle};
use breathe::pattern::BreathingPattern;
use breathe::phase::Phase;

/// Breathe - Guided breathing exercises
#[derive(Parser)]
#[command(name = "breathe")]
#[command(about = "Guided breathing exercises with a paced visual guide")]
#[command(version)]
#[command(after_help = r#"WHEN TO USE:
    When stress builds up, before sleep, or between deep work sessions.

PATTERNS:
    4-7-8       Inhale 4, hold 7, exhale 8 (default)
    box         Inhale 4, hold 4, exhale 4, hold 4
    coherent    Inhale 5, exhale 5

EXAMPLES:
    breathe run                         # Start the default pattern
    breathe run --pattern box -c 6      # Six box breathing cycles
    breathe show coherent               # Show pattern timings
    breathe default box                 # Use box breathing by default
    breathe simulate --ticks 19 --json  # Trace one 4-7-8 cycle

CONFIG:
    Patterns, the default pattern, and the tick policy can be set in the
    "breathe" section of ~/.config/mindmate/config.json.

ALIASES:
    breathe ls    # list
    breathe r     # run
    breathe sim   # simulate
"#)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show available breathing patterns
    #[command(alias = "ls")]
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one pattern's timings
    Show {
        /// Pattern id
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Make a pattern the default for run and simulate
    #[command(name = "default")]
    SetDefault {
        /// Pattern id
        id: String,
    },

    /// Guide a live breathing exercise (Ctrl+C to stop)
    #[command(alias = "r")]
    Run {
        /// Pattern id (default: configured default pattern)
        #[arg(long, short)]
        pattern: Option<String>,

        /// Stop after this many completed cycles
        #[arg(long, short)]
        cycles: Option<u64>,

        /// Countdown policy: exact or linger
        #[arg(long, value_parser = parse_policy)]
        policy: Option<TickPolicy>,
    },

    /// Print the engine state after each tick
    #[command(alias = "sim")]
    Simulate {
        /// Pattern id (default: configured default pattern)
        #[arg(long, short)]
        pattern: Option<String>,

        /// Number of ticks to run
        #[arg(long, short, default_value = "19")]
        ticks: u32,

        /// Countdown policy: exact or linger
        #[arg(long, value_parser = parse_policy)]
        policy: Option<TickPolicy>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn parse_policy(s: &str) -> Result<TickPolicy, String> {
    TickPolicy::parse(s).map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::load()?;
    let settings: BreatheSettings = config.section("breathe")?;
    let catalog = PatternCatalog::from_settings(&settings).context("Invalid breathe config")?;

    match cli.command {
        Some(Commands::List { json }) => cmd_list(&catalog, json),
        Some(Commands::Show { id, json }) => cmd_show(&catalog, &id, json),
        Some(Commands::SetDefault { id }) => cmd_set_default(&mut config, &catalog, &settings, &id),
        Some(Commands::Run {
            pattern,
            cycles,
            policy,
        }) => {
            let pattern = pick(&catalog, pattern.as_deref())?;
            let policy = policy.unwrap_or_else(|| settings.tick_policy());
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(cmd_run(pattern, policy, cycles, &settings))
        }
        Some(Commands::Simulate {
            pattern,
            ticks,
            policy,
            json,
        }) => {
            let pattern = pick(&catalog, pattern.as_deref())?;
            let policy = policy.unwrap_or_else(|| settings.tick_policy());
            cmd_simulate(pattern, policy, ticks, json)
        }
        None => cmd_list(&catalog, false),
    }
}

fn pick(catalog: &PatternCatalog, id: Option<&str>) -> Result<BreathingPattern> {
    let pattern = match id {
        Some(id) => catalog.require(id)?,
        None => catalog.default_pattern(),
    };
    Ok(pattern.clone())
}

/// List all patterns
fn cmd_list(catalog: &PatternCatalog, json: bool) -> Result<()> {
    if json {
        let patterns: Vec<&BreathingPattern> = catalog.iter().collect();
        println!("{}", serde_json::to_string_pretty(&patterns)?);
        return Ok(());
    }

    let default_id = catalog.default_pattern().id.clone();

    println!("{}", color(&format!("{}{}", BOLD, MAGENTA), "BREATHING PATTERNS"));
    println!();
    for pattern in catalog.iter() {
        let marker = if pattern.id == default_id { "*" } else { " " };
        println!(
            " {} {:<12} {:<22} {}",
            marker,
            color(CYAN, &pattern.id),
            pattern.name,
            pattern.timing_label()
        );
        if !pattern.description.is_empty() {
            println!("   {:<12} {}", "", pattern.description);
        }
    }
    println!();
    println!("Run 'breathe run --pattern ID' to begin");

    Ok(())
}

/// Show one pattern
fn cmd_show(catalog: &PatternCatalog, id: &str, json: bool) -> Result<()> {
    let pattern = catalog.require(id)?;

    if json {
        let value = serde_json::json!({
            "pattern": pattern,
            "cycle_seconds": pattern.cycle_seconds(),
            "breaths_per_minute": pattern.breaths_per_minute(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{}", color(&format!("{}{}", BOLD, MAGENTA), &pattern.name));
    if !pattern.description.is_empty() {
        println!("{}", pattern.description);
    }
    println!();
    for phase in Phase::all() {
        let secs = pattern.duration_of(*phase);
        if secs == 0 {
            continue;
        }
        println!("  {:<20} {}s", color(CYAN, &format!("{}:", phase.cue())), secs);
    }
    println!();
    println!(
        "  {}  {}s ({:.1} breaths/min)",
        color(CYAN, "Cycle:"),
        pattern.cycle_seconds(),
        pattern.breaths_per_minute()
    );

    Ok(())
}

/// Store a new default pattern in the shared config
fn cmd_set_default(
    config: &mut Config,
    catalog: &PatternCatalog,
    settings: &BreatheSettings,
    id: &str,
) -> Result<()> {
    let pattern = catalog.require(id)?;

    let mut updated = settings.clone();
    updated.default_pattern = Some(pattern.id.clone());
    config.set_section("breathe", &updated)?;
    config.save()?;

    println!("{} Default pattern: {}", color(GREEN, "[ok]"), pattern.name);
    if let Some(path) = config.path() {
        println!("  Saved to {}", path.display());
    }

    Ok(())
}

/// Run a live exercise until the cycle target or Ctrl+C
async fn cmd_run(
    pattern: BreathingPattern,
    policy: TickPolicy,
    cycles: Option<u64>,
    settings: &BreatheSettings,
) -> Result<()> {
    let name = pattern.name.clone();
    let engine = BreathingEngine::with_policy(pattern, policy)?;
    let handle = Pacer::new(settings.tick_period()).spawn(engine);

    println!("{}", color(&format!("{}{}", BOLD, MAGENTA), &name.to_uppercase()));
    println!("Follow the guide. Ctrl+C to stop.");
    println!();

    handle.start().await?;
    follow(&handle, cycles, tokio::signal::ctrl_c()).await?;

    let engine = handle.shutdown().await?;
    println!();
    println!();
    println!(
        "{} Exercise finished: {} completed cycles",
        color(GREEN, "[ok]"),
        engine.state().completed_cycles()
    );

    Ok(())
}

/// Render snapshots until the cycle target is reached or `stop` resolves.
/// `stop` is created once and stays armed between frames.
async fn follow<F: Future>(handle: &PacerHandle, cycles: Option<u64>, stop: F) -> Result<()> {
    let mut updates = handle.subscribe();
    tokio::pin!(stop);

    render(&updates.borrow_and_update().clone())?;

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snap = updates.borrow_and_update().clone();
                render(&snap)?;
                if cycles.is_some_and(|target| snap.completed_cycles >= target) {
                    break;
                }
            }
            _ = &mut stop => {
                break;
            }
        }
    }

    Ok(())
}

fn render(snap: &Snapshot) -> Result<()> {
    let mut out = std::io::stdout();
    write!(
        out,
        "\r  {:<12} {:>3}s  [{}]  cycles: {}   ",
        snap.cue,
        snap.seconds_remaining,
        progress_bar(snap.scale, 30),
        snap.completed_cycles
    )?;
    out.flush()?;
    Ok(())
}

/// Print a tick-by-tick trace
fn cmd_simulate(pattern: BreathingPattern, policy: TickPolicy, ticks: u32, json: bool) -> Result<()> {
    let mut engine = BreathingEngine::with_policy(pattern, policy)?;
    engine.start();

    let mut trace = vec![(0u32, engine.snapshot())];
    for tick in 1..=ticks {
        engine.tick();
        trace.push((tick, engine.snapshot()));
    }

    if json {
        let rows: Vec<serde_json::Value> = trace
            .iter()
            .map(|(tick, snap)| {
                serde_json::json!({
                    "tick": tick,
                    "phase": snap.phase,
                    "seconds_remaining": snap.seconds_remaining,
                    "completed_cycles": snap.completed_cycles,
                    "progress": snap.progress,
                    "scale": snap.scale,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!(
        "{}",
        color(
            BOLD,
            &format!("{:>5}  {:<18} {:>9}  {:>6}  {:>5}", "TICK", "PHASE", "REMAINING", "CYCLES", "SCALE")
        )
    );
    for (tick, snap) in &trace {
        println!(
            "{:>5}  {:<18} {:>9}  {:>6}  {:>5.2}",
            tick, snap.phase.as_str(), snap.seconds_remaining, snap.completed_cycles, snap.scale
        );
    }

    Ok(())
}
