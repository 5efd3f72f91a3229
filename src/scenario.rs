use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::city::{default_start_date, City};
use crate::config::SimConfig;
use crate::spatial::{Coord, TileGrid};

fn default_ticks() -> u64 {
    120
}

fn default_grid() -> GridSize {
    GridSize {
        width: 16,
        height: 16,
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub description: Option<String>,
    pub seed: u64,
    #[serde(default = "default_ticks")]
    pub ticks: u64,
    #[serde(default = "default_start_date")]
    pub start_date: NaiveDate,
    #[serde(default)]
    pub snapshot_interval_ticks: u64,
    #[serde(default = "default_grid")]
    pub grid: GridSize,
    #[serde(default)]
    pub config: SimConfig,
    #[serde(default)]
    pub placements: Vec<Placement>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct GridSize {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Placement {
    pub x: u32,
    pub y: u32,
    pub building: String,
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let scenario: Scenario = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        scenario
            .config
            .validate()
            .with_context(|| format!("Invalid simulation rules in {}", path.display()))?;
        Ok(scenario)
    }
}

impl Scenario {
    pub fn build_city(&self) -> Result<City> {
        let grid = TileGrid::new(self.grid.width, self.grid.height);
        let mut city = City::new(self.name.clone(), grid, self.seed, self.config.clone())
            .with_start_date(self.start_date);
        for placement in &self.placements {
            let coord = Coord::new(placement.x, placement.y);
            city.place_building(coord, &placement.building)
                .with_context(|| format!("Scenario '{}' placement at {coord}", self.name))?;
        }
        Ok(city)
    }

    pub fn ticks(&self, override_ticks: Option<u64>) -> u64 {
        override_ticks.unwrap_or(self.ticks)
    }
}
