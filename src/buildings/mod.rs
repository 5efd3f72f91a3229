//! Buildings: tile occupants composed of simulation modules

pub mod modules;

use std::fmt;
use std::str::FromStr;

use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::citizen::Citizen;
use crate::config::SimConfig;
use crate::error::CommandError;
use crate::spatial::Coord;
use crate::stats::CityStats;
use modules::{
    DevelopmentModule, DevelopmentRules, DevelopmentState, ModuleContext, ModuleSnapshot,
    ResidentsModule, SimModule, ZoneStatus,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingType {
    Residential,
    Commercial,
    Industrial,
}

impl BuildingType {
    pub const ALL: [BuildingType; 3] = [
        BuildingType::Residential,
        BuildingType::Commercial,
        BuildingType::Industrial,
    ];

    /// Tool id used by placement commands
    pub fn id(self) -> &'static str {
        match self {
            BuildingType::Residential => "residential",
            BuildingType::Commercial => "commercial",
            BuildingType::Industrial => "industrial",
        }
    }

    pub fn is_residential(self) -> bool {
        self == BuildingType::Residential
    }

    pub fn provides_jobs(self) -> bool {
        matches!(self, BuildingType::Commercial | BuildingType::Industrial)
    }
}

impl fmt::Display for BuildingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for BuildingType {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        BuildingType::ALL
            .into_iter()
            .find(|candidate| candidate.id().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CommandError::InvalidType(s.to_string()))
    }
}

/// A zone on one tile.
///
/// The first module is always the development module; residential buildings
/// also carry a residents module right after it.
#[derive(Debug)]
pub struct Building {
    coord: Coord,
    building_type: BuildingType,
    placed_at: u64,
    modules: Vec<Box<dyn SimModule>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingSnapshot {
    pub coord: Coord,
    pub building_type: BuildingType,
    pub placed_at: u64,
    pub state: DevelopmentState,
    pub level: u32,
    pub modules: Vec<ModuleSnapshot>,
}

impl Building {
    pub fn new(coord: Coord, building_type: BuildingType, placed_at: u64, config: &SimConfig) -> Self {
        let rules = DevelopmentRules::for_type(&config.development, building_type);
        let mut modules: Vec<Box<dyn SimModule>> = vec![Box::new(DevelopmentModule::new(rules))];
        if building_type.is_residential() {
            modules.push(Box::new(ResidentsModule::new(
                config.residents.base_capacity_per_level,
            )));
        }
        Self {
            coord,
            building_type,
            placed_at,
            modules,
        }
    }

    /// Appends a behavior after the built-in modules.
    pub fn with_module(mut self, module: impl SimModule + 'static) -> Self {
        self.modules.push(Box::new(module));
        self
    }

    pub fn coord(&self) -> Coord {
        self.coord
    }

    pub fn building_type(&self) -> BuildingType {
        self.building_type
    }

    pub fn placed_at(&self) -> u64 {
        self.placed_at
    }

    pub fn module_names(&self) -> Vec<&'static str> {
        self.modules.iter().map(|module| module.name()).collect()
    }

    pub fn module<T: SimModule + 'static>(&self) -> Option<&T> {
        self.modules
            .iter()
            .find_map(|module| module.as_any().downcast_ref::<T>())
    }

    pub fn module_mut<T: SimModule + 'static>(&mut self) -> Option<&mut T> {
        self.modules
            .iter_mut()
            .find_map(|module| module.as_any_mut().downcast_mut::<T>())
    }

    pub fn development(&self) -> Option<&DevelopmentModule> {
        self.module::<DevelopmentModule>()
    }

    pub fn development_mut(&mut self) -> Option<&mut DevelopmentModule> {
        self.module_mut::<DevelopmentModule>()
    }

    pub fn residents(&self) -> Option<&ResidentsModule> {
        self.module::<ResidentsModule>()
    }

    pub fn residents_mut(&mut self) -> Option<&mut ResidentsModule> {
        self.module_mut::<ResidentsModule>()
    }

    /// Places a citizen from outside the simulation, checked against this
    /// building's own development status.
    ///
    /// The citizen is handed back if the building houses nobody, is abandoned,
    /// or is full.
    pub fn try_move_in(&mut self, citizen: Citizen) -> Result<(), Citizen> {
        let zone = self.status();
        match self.residents_mut() {
            Some(residents) => residents.try_move_in(citizen, zone),
            None => Err(citizen),
        }
    }

    pub fn status(&self) -> ZoneStatus {
        self.development()
            .map(DevelopmentModule::status)
            .unwrap_or_default()
    }

    pub fn population(&self) -> u64 {
        self.residents().map_or(0, |r| r.count() as u64)
    }

    /// Current resident capacity, zero for buildings without residents.
    pub fn max_residents(&self) -> u64 {
        let level = self.status().level;
        self.residents().map_or(0, |r| r.maximum(level))
    }

    pub fn jobs(&self, jobs_per_level: u32) -> u64 {
        let status = self.status();
        if !self.building_type.provides_jobs() || status.state != DevelopmentState::Developed {
            return 0;
        }
        u64::from(jobs_per_level) * u64::from(status.level)
    }

    /// Runs every module once, in declared order.
    pub fn simulate(
        &mut self,
        tick: u64,
        stats: &CityStats,
        config: &SimConfig,
        rng: &mut ChaCha8Rng,
    ) {
        let mut ctx = ModuleContext {
            tick,
            coord: self.coord,
            building_type: self.building_type,
            stats,
            config,
            zone: self.status(),
            rng,
        };
        for module in &mut self.modules {
            module.simulate(&mut ctx);
        }
    }

    pub fn dispose(&mut self) {
        for module in &mut self.modules {
            module.dispose();
        }
    }

    pub fn inspect(&self) -> BuildingSnapshot {
        let status = self.status();
        BuildingSnapshot {
            coord: self.coord,
            building_type: self.building_type,
            placed_at: self.placed_at,
            state: status.state,
            level: status.level,
            modules: self
                .modules
                .iter()
                .map(|module| module.inspect(status))
                .collect(),
        }
    }
}

impl fmt::Display for BuildingSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} zone at {} (placed tick {})",
            self.building_type, self.coord, self.placed_at
        )?;
        for module in &self.modules {
            for line in module.to_string().lines() {
                write!(f, "\n  {line}")?;
            }
        }
        Ok(())
    }
}
