use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use tilecity::{
    engine::{Engine, EngineBuilder, EngineSettings},
    scenario::{Scenario, ScenarioLoader},
    Coord,
};

#[derive(Debug, Parser)]
#[command(name = "tilecity", version, about = "Tile city simulation runner")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run a scenario and print a summary line per tick
    Run {
        /// Path to the scenario YAML file
        #[arg(long, default_value = "scenarios/starter_town.yaml")]
        scenario: PathBuf,

        /// Override tick count (uses scenario default when omitted)
        #[arg(long)]
        ticks: Option<u64>,

        /// Pace ticks at a fixed interval instead of running flat out
        #[arg(long)]
        tick_ms: Option<u64>,

        /// Override snapshot interval in ticks
        #[arg(long)]
        snapshot_interval: Option<u64>,

        /// Directory for snapshots
        #[arg(long)]
        snapshot_dir: Option<PathBuf>,
    },

    /// Run a scenario, then print the city or a single tile
    Inspect {
        #[arg(long, default_value = "scenarios/starter_town.yaml")]
        scenario: PathBuf,

        #[arg(long)]
        ticks: Option<u64>,

        #[arg(long, requires = "y")]
        x: Option<u32>,

        #[arg(long, requires = "x")]
        y: Option<u32>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let loader = ScenarioLoader::new(".");

    match cli.command {
        Commands::Run {
            scenario,
            ticks,
            tick_ms,
            snapshot_interval,
            snapshot_dir,
        } => {
            let scenario = loader.load(&scenario)?;
            init_tracing(&scenario);
            let settings = EngineSettings {
                snapshot_interval_ticks: snapshot_interval.unwrap_or(scenario.snapshot_interval_ticks),
                snapshot_dir: snapshot_dir.unwrap_or_else(|| PathBuf::from("snapshots")),
            };
            let mut engine = EngineBuilder::new(settings).build(scenario.build_city()?);
            let ticks = scenario.ticks(ticks);

            match tick_ms {
                Some(ms) => run_paced(&mut engine, ticks, Duration::from_millis(ms.max(1))).await,
                None => engine.run_with_hook(ticks, |summary| {
                    println!(
                        "{} tick {:>5} | population {:>5} | jobs {:>4} | buildings {}",
                        summary.date,
                        summary.tick,
                        summary.population,
                        summary.stats.jobs,
                        summary.stats.buildings
                    )
                }),
            }

            let city = engine.city();
            println!(
                "City '{}' reached {} after {} ticks. Final population: {}",
                city.name(),
                city.date(),
                city.tick(),
                city.population()
            );
        }

        Commands::Inspect {
            scenario,
            ticks,
            x,
            y,
            json,
        } => {
            let scenario = loader.load(&scenario)?;
            init_tracing(&scenario);
            let mut engine = EngineBuilder::new(EngineSettings::default()).build(scenario.build_city()?);
            engine.run(scenario.ticks(ticks));
            let city = engine.city();

            match (x, y) {
                (Some(x), Some(y)) => {
                    let coord = Coord::new(x, y);
                    let Some(building) = city.building(coord) else {
                        bail!("no building at {coord}");
                    };
                    let snapshot = building.inspect();
                    if json {
                        println!("{}", serde_json::to_string_pretty(&snapshot)?);
                    } else {
                        println!("{snapshot}");
                    }
                }
                _ => {
                    let snapshot = city.inspect();
                    if json {
                        println!("{}", serde_json::to_string_pretty(&snapshot)?);
                    } else {
                        println!("{snapshot}");
                    }
                }
            }
        }
    }
    Ok(())
}

fn init_tracing(scenario: &Scenario) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&scenario.config.logging.level));
    fmt().with_env_filter(filter).with_target(false).init();
}

/// Fixed-interval driver: one tick per period until done or ctrl-c.
async fn run_paced(engine: &mut Engine, ticks: u64, period: Duration) {
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    let mut interval = tokio::time::interval(period);

    for _ in 0..ticks {
        tokio::select! {
            biased;
            _ = &mut shutdown => {
                tracing::info!(tick = engine.city().tick(), "shutdown signal received");
                break;
            }
            _ = interval.tick() => {
                let summary = engine.step();
                println!(
                    "{} tick {:>5} | population {:>5} | jobs {:>4}",
                    summary.date, summary.tick, summary.population, summary.stats.jobs
                );
            }
        }
    }
}
