use std::collections::VecDeque;
use std::path::PathBuf;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::city::City;
use crate::error::CommandError;
use crate::snapshot::SnapshotWriter;
use crate::spatial::Coord;
use crate::stats::CityStats;

pub struct EngineSettings {
    pub snapshot_interval_ticks: u64,
    pub snapshot_dir: PathBuf,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            snapshot_interval_ticks: 0,
            snapshot_dir: PathBuf::from("snapshots"),
        }
    }
}

/// Tool action issued from outside the simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Place { coord: Coord, building: String },
    Remove { coord: Coord },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutcome {
    pub command: Command,
    pub result: Result<(), CommandError>,
}

#[derive(Debug, Clone)]
pub struct TickSummary {
    pub tick: u64,
    pub date: NaiveDate,
    pub population: u64,
    pub stats: CityStats,
    pub command_results: Vec<CommandOutcome>,
    pub snapshot_path: Option<PathBuf>,
    /// Set when the periodic snapshot could not be written; the tick itself
    /// still happened.
    pub snapshot_error: Option<String>,
}

pub struct EngineBuilder {
    settings: EngineSettings,
    commands: Vec<Command>,
}

impl EngineBuilder {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            commands: Vec::new(),
        }
    }

    pub fn with_command(mut self, command: Command) -> Self {
        self.commands.push(command);
        self
    }

    pub fn build(self, city: City) -> Engine {
        Engine {
            city,
            snapshot_writer: SnapshotWriter::new(
                &self.settings.snapshot_dir,
                self.settings.snapshot_interval_ticks,
            ),
            pending: self.commands.into(),
        }
    }
}

/// Drives a city tick by tick; tool commands wait for the next tick boundary.
pub struct Engine {
    city: City,
    snapshot_writer: SnapshotWriter,
    pending: VecDeque<Command>,
}

impl Engine {
    pub fn city(&self) -> &City {
        &self.city
    }

    pub fn into_city(self) -> City {
        self.city
    }

    pub fn queue(&mut self, command: Command) {
        self.pending.push_back(command);
    }

    pub fn pending_commands(&self) -> usize {
        self.pending.len()
    }

    /// Applies queued commands, advances one tick, then writes a snapshot if
    /// one is due. Nothing here aborts the tick: rejected commands and failed
    /// snapshot writes are logged and reported in the summary.
    pub fn step(&mut self) -> TickSummary {
        let command_results = self.apply_pending();
        let stats = self.city.step().clone();
        let (snapshot_path, snapshot_error) = match self.snapshot_writer.maybe_write(&self.city) {
            Ok(path) => (path, None),
            Err(err) => {
                let message = format!("{err:#}");
                warn!(tick = self.city.tick(), error = %message, "snapshot write failed");
                (None, Some(message))
            }
        };
        TickSummary {
            tick: self.city.tick(),
            date: self.city.date(),
            population: stats.population,
            stats,
            command_results,
            snapshot_path,
            snapshot_error,
        }
    }

    pub fn run(&mut self, ticks: u64) {
        self.run_with_hook(ticks, |_| {})
    }

    pub fn run_with_hook<F>(&mut self, ticks: u64, mut hook: F)
    where
        F: FnMut(&TickSummary),
    {
        info!(city = self.city.name(), ticks, start_tick = self.city.tick(), "simulation started");
        for _ in 0..ticks {
            let summary = self.step();
            hook(&summary);
        }
        info!(
            city = self.city.name(),
            tick = self.city.tick(),
            population = self.city.population(),
            "simulation finished"
        );
    }

    fn apply_pending(&mut self) -> Vec<CommandOutcome> {
        let mut outcomes = Vec::with_capacity(self.pending.len());
        while let Some(command) = self.pending.pop_front() {
            let result = match &command {
                Command::Place { coord, building } => {
                    self.city.place_building(*coord, building).map(|_| ())
                }
                Command::Remove { coord } => self.city.remove_building(*coord).map(|_| ()),
            };
            if let Err(err) = &result {
                warn!(?command, error = %err, "command rejected");
            }
            outcomes.push(CommandOutcome { command, result });
        }
        outcomes
    }
}
