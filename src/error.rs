use thiserror::Error;

use crate::spatial::Coord;

/// Errors surfaced by placement and removal commands.
///
/// A failed command leaves the city untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("tile {0} is already occupied")]
    TileOccupied(Coord),
    #[error("unknown building type '{0}'")]
    InvalidType(String),
    #[error("tile {coord} is outside the {width}x{height} map")]
    OutOfBounds { coord: Coord, width: u32, height: u32 },
}
