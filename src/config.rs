//! Tunable simulation rules

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::buildings::BuildingType;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("config validation error:\n{0}")]
    Validation(String),
}

/// All rules driving building development, occupancy and demand
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    #[serde(default)]
    pub development: DevelopmentConfig,
    #[serde(default)]
    pub residents: ResidentsConfig,
    #[serde(default)]
    pub jobs: JobsConfig,
    #[serde(default)]
    pub demand: DemandConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DevelopmentConfig {
    /// Ticks of construction before a building is developed
    #[serde(default = "default_construction_ticks")]
    pub construction_ticks: u32,
    /// Demand-weighted progress needed for each level-up
    #[serde(default = "default_level_up_progress")]
    pub level_up_progress: f64,
    /// Consecutive ticks without demand before a building is abandoned
    #[serde(default = "default_abandonment_ticks")]
    pub abandonment_ticks: u32,
    #[serde(default)]
    pub max_level: MaxLevels,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaxLevels {
    #[serde(default = "default_max_level")]
    pub residential: u32,
    #[serde(default = "default_max_level")]
    pub commercial: u32,
    #[serde(default = "default_max_level")]
    pub industrial: u32,
}

impl MaxLevels {
    pub fn for_type(&self, building_type: BuildingType) -> u32 {
        match building_type {
            BuildingType::Residential => self.residential,
            BuildingType::Commercial => self.commercial,
            BuildingType::Industrial => self.industrial,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResidentsConfig {
    /// Capacity at level `n` is `base_capacity_per_level ^ n`
    #[serde(default = "default_base_capacity")]
    pub base_capacity_per_level: u32,
    #[serde(default = "default_ticks_per_year")]
    pub ticks_per_year: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobsConfig {
    #[serde(default = "default_jobs_per_level")]
    pub jobs_per_level: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandConfig {
    #[serde(default = "default_base_residential")]
    pub base_residential: f64,
    #[serde(default = "default_base_commercial")]
    pub base_commercial: f64,
    #[serde(default = "default_base_industrial")]
    pub base_industrial: f64,
    #[serde(default = "default_sensitivity")]
    pub sensitivity: f64,
    #[serde(default = "default_commercial_ratio")]
    pub commercial_ratio: f64,
    #[serde(default = "default_industrial_ratio")]
    pub industrial_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_construction_ticks() -> u32 {
    5
}
fn default_level_up_progress() -> f64 {
    10.0
}
fn default_abandonment_ticks() -> u32 {
    30
}
fn default_max_level() -> u32 {
    3
}
fn default_base_capacity() -> u32 {
    2
}
fn default_ticks_per_year() -> u32 {
    365
}
fn default_jobs_per_level() -> u32 {
    4
}
fn default_base_residential() -> f64 {
    0.5
}
fn default_base_commercial() -> f64 {
    0.1
}
fn default_base_industrial() -> f64 {
    0.2
}
fn default_sensitivity() -> f64 {
    0.01
}
fn default_commercial_ratio() -> f64 {
    0.3
}
fn default_industrial_ratio() -> f64 {
    0.4
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for DevelopmentConfig {
    fn default() -> Self {
        Self {
            construction_ticks: default_construction_ticks(),
            level_up_progress: default_level_up_progress(),
            abandonment_ticks: default_abandonment_ticks(),
            max_level: MaxLevels::default(),
        }
    }
}

impl Default for MaxLevels {
    fn default() -> Self {
        Self {
            residential: default_max_level(),
            commercial: default_max_level(),
            industrial: default_max_level(),
        }
    }
}

impl Default for ResidentsConfig {
    fn default() -> Self {
        Self {
            base_capacity_per_level: default_base_capacity(),
            ticks_per_year: default_ticks_per_year(),
        }
    }
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            jobs_per_level: default_jobs_per_level(),
        }
    }
}

impl Default for DemandConfig {
    fn default() -> Self {
        Self {
            base_residential: default_base_residential(),
            base_commercial: default_base_commercial(),
            base_industrial: default_base_industrial(),
            sensitivity: default_sensitivity(),
            commercial_ratio: default_commercial_ratio(),
            industrial_ratio: default_industrial_ratio(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl SimConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every rule and reports all violations at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();
        let dev = &self.development;

        if dev.construction_ticks == 0 {
            errors.push("development.construction_ticks must be > 0".to_string());
        }
        if dev.level_up_progress.is_nan() || dev.level_up_progress <= 0.0 {
            errors.push(format!(
                "development.level_up_progress must be > 0.0, got {}",
                dev.level_up_progress
            ));
        }
        if dev.abandonment_ticks == 0 {
            errors.push("development.abandonment_ticks must be > 0".to_string());
        }
        for building_type in BuildingType::ALL {
            if dev.max_level.for_type(building_type) == 0 {
                errors.push(format!(
                    "development.max_level.{} must be >= 1",
                    building_type.id()
                ));
            }
        }
        if self.residents.base_capacity_per_level == 0 {
            errors.push("residents.base_capacity_per_level must be >= 1".to_string());
        }
        if self.residents.ticks_per_year == 0 {
            errors.push("residents.ticks_per_year must be > 0".to_string());
        }
        if self.demand.sensitivity < 0.0 {
            errors.push(format!(
                "demand.sensitivity must be >= 0.0, got {}",
                self.demand.sensitivity
            ));
        }

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            errors.push(format!(
                "logging.level must be one of {:?}, got '{}'",
                valid_levels, self.logging.level
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors.join("\n")))
        }
    }
}
