//! City-wide aggregates, recomputed at tick boundaries

use serde::{Deserialize, Serialize};

use crate::buildings::{Building, BuildingType};
use crate::config::SimConfig;

/// Demand per zone type, each in `[-1, 1]`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneDemand {
    pub residential: f64,
    pub commercial: f64,
    pub industrial: f64,
}

impl ZoneDemand {
    pub fn for_type(&self, building_type: BuildingType) -> f64 {
        match building_type {
            BuildingType::Residential => self.residential,
            BuildingType::Commercial => self.commercial,
            BuildingType::Industrial => self.industrial,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CityStats {
    pub population: u64,
    pub jobs: u64,
    pub commercial_jobs: u64,
    pub industrial_jobs: u64,
    pub buildings: usize,
    pub demand: ZoneDemand,
}

impl CityStats {
    pub fn compute<'a>(
        buildings: impl IntoIterator<Item = &'a Building>,
        config: &SimConfig,
    ) -> Self {
        let jobs_per_level = config.jobs.jobs_per_level;
        let mut stats = CityStats::default();
        for building in buildings {
            stats.buildings += 1;
            stats.population += building.population();
            let jobs = building.jobs(jobs_per_level);
            match building.building_type() {
                BuildingType::Commercial => stats.commercial_jobs += jobs,
                BuildingType::Industrial => stats.industrial_jobs += jobs,
                BuildingType::Residential => {}
            }
        }
        stats.jobs = stats.commercial_jobs + stats.industrial_jobs;
        stats.demand = stats.zone_demand(config);
        stats
    }

    fn zone_demand(&self, config: &SimConfig) -> ZoneDemand {
        let rules = &config.demand;
        let population = self.population as f64;
        let residential =
            rules.base_residential + rules.sensitivity * (self.jobs as f64 - population);
        let commercial = rules.base_commercial
            + rules.sensitivity * (population * rules.commercial_ratio - self.commercial_jobs as f64);
        let industrial = rules.base_industrial
            + rules.sensitivity * (population * rules.industrial_ratio - self.industrial_jobs as f64);
        ZoneDemand {
            residential: residential.clamp(-1.0, 1.0),
            commercial: commercial.clamp(-1.0, 1.0),
            industrial: industrial.clamp(-1.0, 1.0),
        }
    }
}
