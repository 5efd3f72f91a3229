use std::any::Any;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ModuleContext, ModuleSnapshot, SimModule, ZoneStatus};
use crate::buildings::BuildingType;
use crate::config::DevelopmentConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DevelopmentState {
    UnderConstruction,
    Developed,
    Abandoned,
}

impl fmt::Display for DevelopmentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DevelopmentState::UnderConstruction => "under construction",
            DevelopmentState::Developed => "developed",
            DevelopmentState::Abandoned => "abandoned",
        };
        f.write_str(label)
    }
}

/// Thresholds for one building type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DevelopmentRules {
    pub construction_ticks: u32,
    pub level_up_progress: f64,
    pub abandonment_ticks: u32,
    pub max_level: u32,
}

impl DevelopmentRules {
    pub fn for_type(config: &DevelopmentConfig, building_type: BuildingType) -> Self {
        Self {
            construction_ticks: config.construction_ticks,
            level_up_progress: config.level_up_progress,
            abandonment_ticks: config.abandonment_ticks,
            max_level: config.max_level.for_type(building_type).max(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DevelopmentProgress {
    pub state: DevelopmentState,
    pub level: u32,
    pub progress: f64,
    /// Consecutive developed ticks without demand
    pub idle_ticks: u32,
}

impl Default for DevelopmentProgress {
    fn default() -> Self {
        Self {
            state: DevelopmentState::UnderConstruction,
            level: 0,
            progress: 0.0,
            idle_ticks: 0,
        }
    }
}

/// One tick of development as a pure function of the current progress and
/// this building type's demand.
pub fn advance(
    current: DevelopmentProgress,
    demand: f64,
    rules: &DevelopmentRules,
) -> DevelopmentProgress {
    let mut next = current;
    match current.state {
        DevelopmentState::UnderConstruction => {
            next.progress += 1.0;
            if next.progress >= f64::from(rules.construction_ticks) {
                next.state = DevelopmentState::Developed;
                next.level = 1;
                next.progress = 0.0;
                next.idle_ticks = 0;
            }
        }
        DevelopmentState::Developed => {
            if demand > 0.0 {
                next.idle_ticks = 0;
                next.progress += demand;
            } else {
                next.idle_ticks += 1;
            }

            if next.idle_ticks >= rules.abandonment_ticks {
                next.state = DevelopmentState::Abandoned;
                next.progress = 0.0;
            } else if next.level < rules.max_level {
                if next.progress >= rules.level_up_progress {
                    next.level += 1;
                    next.progress = 0.0;
                }
            } else {
                next.progress = next.progress.min(rules.level_up_progress);
            }
        }
        DevelopmentState::Abandoned => {}
    }
    next
}

/// Construction progress and level of a building.
#[derive(Debug, Clone)]
pub struct DevelopmentModule {
    rules: DevelopmentRules,
    current: DevelopmentProgress,
}

impl DevelopmentModule {
    pub fn new(rules: DevelopmentRules) -> Self {
        Self {
            rules,
            current: DevelopmentProgress::default(),
        }
    }

    pub fn state(&self) -> DevelopmentState {
        self.current.state
    }

    pub fn level(&self) -> u32 {
        self.current.level
    }

    pub fn progress(&self) -> DevelopmentProgress {
        self.current
    }

    pub fn rules(&self) -> &DevelopmentRules {
        &self.rules
    }

    pub fn status(&self) -> ZoneStatus {
        ZoneStatus {
            state: self.current.state,
            level: self.current.level,
        }
    }

    /// External boost, e.g. a reward from outside the simulation.
    ///
    /// Ignored once abandoned or for non-positive amounts.
    pub fn add_progress(&mut self, amount: f64) {
        if self.current.state == DevelopmentState::Abandoned || amount.is_nan() || amount <= 0.0 {
            return;
        }
        self.current.progress += amount;
    }
}

impl SimModule for DevelopmentModule {
    fn name(&self) -> &'static str {
        "development"
    }

    fn simulate(&mut self, ctx: &mut ModuleContext<'_>) {
        let demand = ctx.stats.demand.for_type(ctx.building_type);
        let before = self.current;
        self.current = advance(before, demand, &self.rules);

        if before.state != self.current.state {
            debug!(
                coord = %ctx.coord,
                building = %ctx.building_type,
                from = %before.state,
                to = %self.current.state,
                "development state changed"
            );
        } else if before.level != self.current.level {
            debug!(
                coord = %ctx.coord,
                building = %ctx.building_type,
                level = self.current.level,
                "building levelled up"
            );
        }

        ctx.zone = self.status();
    }

    fn dispose(&mut self) {
        self.current.progress = 0.0;
        self.current.idle_ticks = 0;
    }

    fn inspect(&self, _zone: ZoneStatus) -> ModuleSnapshot {
        ModuleSnapshot::Development {
            state: self.current.state,
            level: self.current.level,
            max_level: self.rules.max_level,
            progress: self.current.progress,
            idle_ticks: self.current.idle_ticks,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
