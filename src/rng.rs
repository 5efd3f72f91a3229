//! Deterministic random streams
//!
//! Every building gets its own stream per tick, seeded from
//! (city seed, tick, coordinate), so results do not depend on visit order.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::spatial::Coord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RngManager {
    master_seed: u64,
}

impl RngManager {
    pub fn new(seed: u64) -> Self {
        Self { master_seed: seed }
    }

    pub fn building_rng(&self, tick: u64, coord: Coord) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.derive_seed(tick, coord))
    }

    fn derive_seed(&self, tick: u64, coord: Coord) -> u64 {
        let mut seed = self.master_seed;
        seed = seed
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        seed ^= (coord.x as u64).wrapping_mul(1103515245);
        seed = seed
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        seed ^= (coord.y as u64).wrapping_mul(48271);
        seed = seed
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        seed ^= tick.wrapping_mul(69069);
        seed
    }
}

impl Default for RngManager {
    fn default() -> Self {
        Self::new(42)
    }
}
