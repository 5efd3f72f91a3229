use std::any::Any;

use tracing::trace;

use super::{DevelopmentState, ModuleContext, ModuleSnapshot, SimModule, ZoneStatus};
use crate::citizen::Citizen;

/// Citizens living in a residential building.
///
/// Capacity is `base_capacity_per_level ^ level`, where the level always comes
/// from the building's development module.
#[derive(Debug, Clone)]
pub struct ResidentsModule {
    base_capacity_per_level: u32,
    residents: Vec<Citizen>,
    admitted: u64,
    evicted: u64,
}

impl ResidentsModule {
    pub fn new(base_capacity_per_level: u32) -> Self {
        Self {
            base_capacity_per_level,
            residents: Vec::new(),
            admitted: 0,
            evicted: 0,
        }
    }

    pub fn count(&self) -> usize {
        self.residents.len()
    }

    /// Capacity at `level`, saturating at `u64::MAX`.
    pub fn maximum(&self, level: u32) -> u64 {
        u64::from(self.base_capacity_per_level)
            .checked_pow(level)
            .unwrap_or(u64::MAX)
    }

    pub fn residents(&self) -> &[Citizen] {
        &self.residents
    }

    /// Lifetime number of citizens that moved in.
    pub fn admitted(&self) -> u64 {
        self.admitted
    }

    /// Lifetime number of citizens that moved out.
    pub fn evicted(&self) -> u64 {
        self.evicted
    }

    /// Places a citizen from outside the simulation against the building's
    /// real status. Callers outside the crate go through
    /// `Building::try_move_in`.
    ///
    /// The citizen is handed back when the building is abandoned or full.
    pub(crate) fn try_move_in(&mut self, citizen: Citizen, zone: ZoneStatus) -> Result<(), Citizen> {
        if zone.state == DevelopmentState::Abandoned || !self.has_room(zone.level) {
            return Err(citizen);
        }
        trace!(citizen = %citizen.id(), home = %citizen.home(), "citizen placed");
        self.residents.push(citizen);
        self.admitted += 1;
        Ok(())
    }

    fn has_room(&self, level: u32) -> bool {
        (self.residents.len() as u64) < self.maximum(level)
    }

    /// Moves out the newest residents until at most `maximum` remain.
    fn evict_above(&mut self, maximum: u64) {
        let keep = usize::try_from(maximum).unwrap_or(usize::MAX);
        if self.residents.len() <= keep {
            return;
        }
        for resident in self.residents.split_off(keep) {
            resident.dispose();
            self.evicted += 1;
        }
    }

    fn evict_all(&mut self) {
        for resident in self.residents.drain(..) {
            resident.dispose();
            self.evicted += 1;
        }
    }
}

impl SimModule for ResidentsModule {
    fn name(&self) -> &'static str {
        "residents"
    }

    fn simulate(&mut self, ctx: &mut ModuleContext<'_>) {
        if !ctx.building_type.is_residential() {
            return;
        }

        match ctx.zone.state {
            DevelopmentState::Abandoned => self.evict_all(),
            DevelopmentState::Developed => {
                self.evict_above(self.maximum(ctx.zone.level));
                if self.has_room(ctx.zone.level) {
                    let citizen = Citizen::generate(&mut *ctx.rng, ctx.coord, ctx.tick);
                    trace!(citizen = %citizen.id(), home = %ctx.coord, "citizen moved in");
                    self.residents.push(citizen);
                    self.admitted += 1;
                }
            }
            DevelopmentState::UnderConstruction => {}
        }

        for resident in &mut self.residents {
            resident.simulate(ctx);
        }
    }

    fn dispose(&mut self) {
        self.evict_all();
    }

    fn inspect(&self, zone: ZoneStatus) -> ModuleSnapshot {
        ModuleSnapshot::Residents {
            count: self.count(),
            maximum: self.maximum(zone.level),
            admitted: self.admitted,
            evicted: self.evicted,
            residents: self.residents.iter().map(Citizen::inspect).collect(),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
