use std::collections::BTreeMap;
use std::fmt;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::buildings::{Building, BuildingSnapshot, BuildingType};
use crate::config::SimConfig;
use crate::error::CommandError;
use crate::rng::RngManager;
use crate::spatial::{Coord, TileGrid};
use crate::stats::CityStats;

pub fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default()
}

/// The tile map, its buildings, and the simulation clock.
///
/// One tick is one in-game day.
#[derive(Debug)]
pub struct City {
    name: String,
    grid: TileGrid,
    config: SimConfig,
    rng: RngManager,
    start_date: NaiveDate,
    tick: u64,
    buildings: BTreeMap<Coord, Building>,
    stats: CityStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitySnapshot {
    pub name: String,
    pub tick: u64,
    pub date: NaiveDate,
    pub width: u32,
    pub height: u32,
    pub stats: CityStats,
    pub buildings: Vec<BuildingSnapshot>,
}

impl City {
    pub fn new(name: impl Into<String>, grid: TileGrid, seed: u64, config: SimConfig) -> Self {
        let stats = CityStats::compute(std::iter::empty(), &config);
        Self {
            name: name.into(),
            grid,
            config,
            rng: RngManager::new(seed),
            start_date: default_start_date(),
            tick: 0,
            buildings: BTreeMap::new(),
            stats,
        }
    }

    pub fn with_start_date(mut self, start_date: NaiveDate) -> Self {
        self.start_date = start_date;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn grid(&self) -> TileGrid {
        self.grid
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// In-game calendar date for the current tick.
    pub fn date(&self) -> NaiveDate {
        self.start_date
            .checked_add_days(Days::new(self.tick))
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn population(&self) -> u64 {
        self.stats.population
    }

    /// Aggregates as of the last tick boundary.
    pub fn stats(&self) -> &CityStats {
        &self.stats
    }

    pub fn building(&self, coord: Coord) -> Option<&Building> {
        self.buildings.get(&coord)
    }

    pub fn building_mut(&mut self, coord: Coord) -> Option<&mut Building> {
        self.buildings.get_mut(&coord)
    }

    pub fn buildings(&self) -> impl Iterator<Item = &Building> {
        self.buildings.values()
    }

    pub fn building_count(&self) -> usize {
        self.buildings.len()
    }

    /// Places a zone from its tool id.
    pub fn place_building(&mut self, coord: Coord, type_id: &str) -> Result<&Building, CommandError> {
        let building_type: BuildingType = type_id.parse()?;
        self.place(coord, building_type)
    }

    pub fn place(&mut self, coord: Coord, building_type: BuildingType) -> Result<&Building, CommandError> {
        self.check_bounds(coord)?;
        if self.buildings.contains_key(&coord) {
            return Err(CommandError::TileOccupied(coord));
        }

        let building = Building::new(coord, building_type, self.tick, &self.config);
        self.buildings.insert(coord, building);
        self.refresh_stats();
        info!(%coord, building = %building_type, tick = self.tick, "building placed");

        Ok(&self.buildings[&coord])
    }

    /// Clears a tile. The building's modules are disposed before the tile is
    /// released; the disposed building is handed back for inspection.
    pub fn remove_building(&mut self, coord: Coord) -> Result<Option<Building>, CommandError> {
        self.check_bounds(coord)?;
        let Some(building) = self.buildings.get_mut(&coord) else {
            debug!(%coord, "nothing to remove");
            return Ok(None);
        };
        building.dispose();
        let removed = self.buildings.remove(&coord);
        self.refresh_stats();
        info!(%coord, tick = self.tick, "building removed");
        Ok(removed)
    }

    /// Advances the whole city by one tick.
    ///
    /// Every building reads the aggregates from the previous tick; the new
    /// aggregates are published only after all buildings ran.
    pub fn step(&mut self) -> &CityStats {
        let tick = self.tick + 1;
        let previous = &self.stats;
        for (coord, building) in self.buildings.iter_mut() {
            let mut rng = self.rng.building_rng(tick, *coord);
            building.simulate(tick, previous, &self.config, &mut rng);
        }
        self.tick = tick;
        self.refresh_stats();
        &self.stats
    }

    pub fn inspect(&self) -> CitySnapshot {
        CitySnapshot {
            name: self.name.clone(),
            tick: self.tick,
            date: self.date(),
            width: self.grid.width(),
            height: self.grid.height(),
            stats: self.stats.clone(),
            buildings: self.buildings.values().map(Building::inspect).collect(),
        }
    }

    fn refresh_stats(&mut self) {
        self.stats = CityStats::compute(self.buildings.values(), &self.config);
    }

    fn check_bounds(&self, coord: Coord) -> Result<(), CommandError> {
        if self.grid.contains(coord) {
            Ok(())
        } else {
            Err(CommandError::OutOfBounds {
                coord,
                width: self.grid.width(),
                height: self.grid.height(),
            })
        }
    }
}

impl fmt::Display for CitySnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {} (tick {}) | population {} | jobs {} | demand R {:+.2} C {:+.2} I {:+.2}",
            self.name,
            self.date,
            self.tick,
            self.stats.population,
            self.stats.jobs,
            self.stats.demand.residential,
            self.stats.demand.commercial,
            self.stats.demand.industrial
        )?;
        for building in &self.buildings {
            write!(f, "\n{building}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buildings::modules::DevelopmentState;

    fn quick_config() -> SimConfig {
        let mut config = SimConfig::default();
        config.development.construction_ticks = 2;
        config.development.level_up_progress = 1000.0;
        config
    }

    fn city() -> City {
        City::new("Testville", TileGrid::new(8, 8), 3, quick_config())
    }

    #[test]
    fn placement_validates_tile_and_type() {
        let mut city = city();
        assert!(city.place_building(Coord::new(1, 1), "residential").is_ok());
        assert_eq!(
            city.place_building(Coord::new(1, 1), "commercial").unwrap_err(),
            CommandError::TileOccupied(Coord::new(1, 1))
        );
        assert_eq!(
            city.place_building(Coord::new(2, 2), "park").unwrap_err(),
            CommandError::InvalidType("park".into())
        );
        assert!(matches!(
            city.place_building(Coord::new(8, 0), "industrial"),
            Err(CommandError::OutOfBounds { .. })
        ));
        assert_eq!(city.building_count(), 1);
        assert_eq!(city.stats().buildings, 1);
    }

    #[test]
    fn failed_placement_changes_nothing() {
        let mut city = city();
        city.place_building(Coord::new(0, 0), "residential").unwrap();
        let before = city.inspect();
        let _ = city.place_building(Coord::new(0, 0), "industrial");
        let _ = city.place_building(Coord::new(9, 9), "industrial");
        let _ = city.place_building(Coord::new(5, 5), "airport");
        assert_eq!(city.inspect(), before);
    }

    #[test]
    fn clock_and_date_advance() {
        let mut city = city();
        assert_eq!(city.tick(), 0);
        assert_eq!(city.date(), default_start_date());
        city.step();
        city.step();
        assert_eq!(city.tick(), 2);
        assert_eq!(city.date(), NaiveDate::from_ymd_opt(2023, 1, 3).unwrap());
    }

    #[test]
    fn residential_growth_follows_development() {
        let mut city = city();
        let home = Coord::new(3, 3);
        city.place_building(home, "residential").unwrap();

        city.step();
        assert_eq!(
            city.building(home).unwrap().status().state,
            DevelopmentState::UnderConstruction
        );
        assert_eq!(city.population(), 0);

        city.step();
        assert_eq!(city.building(home).unwrap().status().level, 1);
        assert_eq!(city.population(), 1);

        city.step();
        assert_eq!(city.population(), 2);
        city.step();
        assert_eq!(city.population(), 2);
    }

    #[test]
    fn removal_disposes_and_frees_tile() {
        let mut city = city();
        let home = Coord::new(0, 1);
        city.place_building(home, "residential").unwrap();
        for _ in 0..4 {
            city.step();
        }
        assert_eq!(city.population(), 2);

        let removed = city.remove_building(home).unwrap().unwrap();
        assert_eq!(removed.population(), 0);
        assert_eq!(removed.residents().unwrap().evicted(), 2);
        assert!(city.building(home).is_none());
        assert_eq!(city.population(), 0);

        assert!(city.remove_building(home).unwrap().is_none());
        assert!(city.place_building(home, "commercial").is_ok());
    }

    #[test]
    fn buildings_are_visited_row_major() {
        let mut city = city();
        for (x, y) in [(3, 1), (0, 2), (5, 0), (1, 1)] {
            city.place_building(Coord::new(x, y), "commercial").unwrap();
        }
        let order: Vec<Coord> = city.buildings().map(Building::coord).collect();
        assert_eq!(
            order,
            vec![
                Coord::new(5, 0),
                Coord::new(1, 1),
                Coord::new(3, 1),
                Coord::new(0, 2),
            ]
        );
    }

    #[test]
    fn removal_outside_map_is_rejected() {
        let mut city = city();
        assert!(matches!(
            city.remove_building(Coord::new(100, 0)),
            Err(CommandError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn snapshot_text_has_title_line() {
        let mut city = city();
        city.place_building(Coord::new(1, 2), "industrial").unwrap();
        let text = city.inspect().to_string();
        assert!(text.starts_with("Testville | 2023-01-01 (tick 0) | population 0"));
        assert!(text.contains("industrial zone at (1, 2)"));
    }
}
