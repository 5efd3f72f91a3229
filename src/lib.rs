pub mod buildings;
pub mod citizen;
pub mod city;
pub mod config;
pub mod engine;
pub mod error;
pub mod rng;
pub mod scenario;
pub mod snapshot;
pub mod spatial;
pub mod stats;

pub use buildings::{Building, BuildingType};
pub use city::City;
pub use config::SimConfig;
pub use engine::{Engine, EngineBuilder, EngineSettings, TickSummary};
pub use error::CommandError;
pub use spatial::Coord;
