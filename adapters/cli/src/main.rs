#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Tilewalk simulation.

mod scene;

use std::{fs, io, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use tilewalk_rendering::{RenderingBackend, TextBackend};
use tilewalk_system_analytics::Analytics;
use tilewalk_system_bootstrap::{Bootstrap, Scenario};
use tilewalk_world::{self as world, query, Command, World};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "tilewalk", version)]
#[command(about = "Runs a tile-grid simulation and draws it as text")]
struct Args {
    /// Number of ticks to simulate
    #[arg(long, default_value_t = 600)]
    ticks: u64,

    /// Seed for behavior randomness, overriding the scenario
    #[arg(long)]
    seed: Option<u64>,

    /// TOML roster to load instead of the default roster
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Grid column count override
    #[arg(long)]
    columns: Option<u32>,

    /// Grid row count override
    #[arg(long)]
    rows: Option<u32>,

    /// Draw a frame every N ticks; 0 draws none
    #[arg(long, default_value_t = 60)]
    render_every: u64,

    /// Simulated milliseconds per tick
    #[arg(long, default_value_t = 16)]
    tick_millis: u64,

    /// Print only the final summary
    #[arg(long)]
    quiet: bool,
}

/// Entry point for the Tilewalk command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing();
    run(&args)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_scenario(args: &Args) -> Result<Scenario> {
    let scenario = match &args.scenario {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("failed to read scenario at {}", path.display()))?;
            Scenario::from_toml_str(&contents)
                .with_context(|| format!("invalid scenario at {}", path.display()))?
        }
        None => Scenario::default_roster(),
    };

    let scenario = if args.columns.is_some() || args.rows.is_some() {
        let columns = args.columns.unwrap_or(scenario.columns());
        let rows = args.rows.unwrap_or(scenario.rows());
        scenario
            .with_dimensions(columns, rows)
            .with_context(|| format!("scenario does not fit the requested {columns}x{rows} grid"))?
    } else {
        scenario
    };

    Ok(match args.seed {
        Some(seed) => scenario.with_seed(seed),
        None => scenario,
    })
}

fn present(backend: &mut impl RenderingBackend, world: &World) -> Result<()> {
    let scene = scene::capture(world).context("failed to capture scene")?;
    backend.present(&scene)
}

fn run(args: &Args) -> Result<()> {
    let bootstrap = Bootstrap;
    let scenario = load_scenario(args)?;
    let config = scenario.simulation_config();
    tracing::info!(
        columns = config.columns(),
        rows = config.rows(),
        seed = config.seed(),
        ticks = args.ticks,
        "starting simulation"
    );

    let mut events = Vec::new();
    let mut world = bootstrap
        .build_world(&scenario, config, &mut events)
        .context("failed to populate world")?;
    let mut analytics = Analytics::new();
    analytics.handle(&events);

    let draw_frames = !args.quiet && args.render_every > 0;
    let mut backend = TextBackend::new(io::stdout());
    if draw_frames {
        println!("{}", bootstrap.welcome_banner());
        present(&mut backend, &world)?;
    }

    let dt = Duration::from_millis(args.tick_millis);
    for _ in 0..args.ticks {
        events.clear();
        world::apply(&mut world, Command::Tick { dt }, &mut events).context("tick failed")?;
        analytics.handle(&events);
        if draw_frames && query::tick_index(&world) % args.render_every == 0 {
            present(&mut backend, &world)?;
        }
    }

    world
        .check_invariants()
        .context("world ended in an inconsistent state")?;
    let teardown = world.teardown();

    println!("{}", analytics.stats());
    for entity in teardown.entities() {
        println!(
            "{:>3} {:<12} ({}, {}) facing {:?}",
            entity.id.get(),
            entity.name,
            entity.cell.column(),
            entity.cell.row(),
            entity.direction
        );
    }
    Ok(())
}
