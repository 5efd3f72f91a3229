//! Pluggable per-building behaviors

mod development;
mod residents;

use std::any::Any;
use std::fmt;

use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::buildings::BuildingType;
use crate::citizen::CitizenSnapshot;
use crate::config::SimConfig;
use crate::spatial::Coord;
use crate::stats::CityStats;

pub use development::{
    advance, DevelopmentModule, DevelopmentProgress, DevelopmentRules, DevelopmentState,
};
pub use residents::ResidentsModule;

/// Development state and level a building exposes to its other modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneStatus {
    pub state: DevelopmentState,
    pub level: u32,
}

impl Default for ZoneStatus {
    fn default() -> Self {
        Self {
            state: DevelopmentState::UnderConstruction,
            level: 0,
        }
    }
}

/// Everything a module may look at while simulating one tick.
///
/// `stats` is the aggregate snapshot from the end of the previous tick.
/// `zone` starts as the building's status before the pass and is rewritten by
/// the development module, so later modules see this tick's transition.
pub struct ModuleContext<'a> {
    pub tick: u64,
    pub coord: Coord,
    pub building_type: BuildingType,
    pub stats: &'a CityStats,
    pub config: &'a SimConfig,
    pub zone: ZoneStatus,
    pub rng: &'a mut ChaCha8Rng,
}

/// Contract shared by every behavior a building can carry.
pub trait SimModule: fmt::Debug {
    fn name(&self) -> &'static str;

    /// Advances the module by one tick. Must not fail for any reachable state.
    fn simulate(&mut self, ctx: &mut ModuleContext<'_>);

    /// Releases everything the module owns. Safe to call repeatedly and
    /// before the first `simulate`.
    fn dispose(&mut self);

    /// Read-only summary for display.
    fn inspect(&self, zone: ZoneStatus) -> ModuleSnapshot;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "module", rename_all = "snake_case")]
pub enum ModuleSnapshot {
    Development {
        state: DevelopmentState,
        level: u32,
        max_level: u32,
        progress: f64,
        idle_ticks: u32,
    },
    Residents {
        count: usize,
        maximum: u64,
        admitted: u64,
        evicted: u64,
        residents: Vec<CitizenSnapshot>,
    },
}

impl fmt::Display for ModuleSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleSnapshot::Development {
                state,
                level,
                max_level,
                progress,
                ..
            } => write!(
                f,
                "Development: {state} (level {level}/{max_level}, progress {progress:.1})"
            ),
            ModuleSnapshot::Residents {
                count,
                maximum,
                residents,
                ..
            } => {
                write!(f, "Residents ({count}/{maximum})")?;
                for resident in residents {
                    write!(f, "\n  - {resident}")?;
                }
                Ok(())
            }
        }
    }
}
