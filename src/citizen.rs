use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;
use uuid::Uuid;

use crate::buildings::modules::ModuleContext;
use crate::spatial::Coord;

const FIRST_NAMES: &[&str] = &[
    "Ada", "Bram", "Cleo", "Dario", "Edith", "Felix", "Greta", "Hugo", "Ines", "Jonas", "Kira",
    "Lev", "Mara", "Nils", "Olga", "Pavel", "Quinn", "Rosa", "Sami", "Tove",
];

const LAST_NAMES: &[&str] = &[
    "Abbott", "Berg", "Costa", "Dahl", "Eriksen", "Fischer", "Garcia", "Holm", "Ivanov", "Jensen",
    "Kowalski", "Lund", "Moreau", "Novak", "Ortega", "Park",
];

const MIN_AGE: u32 = 18;
const MAX_AGE: u32 = 70;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CitizenId(Uuid);

impl fmt::Display for CitizenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A resident owned by exactly one residents module.
///
/// `home` points back at the building tile without owning it.
#[derive(Debug, Clone, PartialEq)]
pub struct Citizen {
    id: CitizenId,
    name: String,
    age: u32,
    home: Coord,
    moved_in_tick: u64,
    ticks_resident: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitizenSnapshot {
    pub id: CitizenId,
    pub name: String,
    pub age: u32,
    pub home: Coord,
    pub moved_in_tick: u64,
    pub ticks_resident: u64,
}

impl Citizen {
    /// Creates a newcomer moving into `home` from the building's random stream.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R, home: Coord, tick: u64) -> Self {
        let id = CitizenId(uuid::Builder::from_random_bytes(rng.gen()).into_uuid());
        let first = FIRST_NAMES[rng.gen_range(0..FIRST_NAMES.len())];
        let last = LAST_NAMES[rng.gen_range(0..LAST_NAMES.len())];
        Self {
            id,
            name: format!("{first} {last}"),
            age: rng.gen_range(MIN_AGE..=MAX_AGE),
            home,
            moved_in_tick: tick,
            ticks_resident: 0,
        }
    }

    pub fn id(&self) -> CitizenId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn home(&self) -> Coord {
        self.home
    }

    pub fn ticks_resident(&self) -> u64 {
        self.ticks_resident
    }

    pub fn simulate(&mut self, ctx: &ModuleContext<'_>) {
        self.ticks_resident += 1;
        let ticks_per_year = u64::from(ctx.config.residents.ticks_per_year.max(1));
        if self.ticks_resident % ticks_per_year == 0 {
            self.age += 1;
        }
    }

    /// Moves the citizen out. Consumes it, so it can only happen once.
    pub fn dispose(self) -> CitizenSnapshot {
        trace!(citizen = %self.id, home = %self.home, "citizen moved out");
        self.inspect()
    }

    pub fn inspect(&self) -> CitizenSnapshot {
        CitizenSnapshot {
            id: self.id,
            name: self.name.clone(),
            age: self.age,
            home: self.home,
            moved_in_tick: self.moved_in_tick,
            ticks_resident: self.ticks_resident,
        }
    }
}

impl fmt::Display for CitizenSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (age {}, resident {} ticks)",
            self.name, self.age, self.ticks_resident
        )
    }
}
