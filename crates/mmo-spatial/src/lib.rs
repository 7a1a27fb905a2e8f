//! Uniform-grid spatial index and per-zone terrain/movement validation.

pub mod error;
pub mod grid;
pub mod terrain;
pub mod zones;

pub mod prelude {
    pub use crate::error::SpatialError;
    pub use crate::grid::{BoundsMode, BoundsOutcome, CellCoord, GridConfig, SpatialGrid};
    pub use crate::terrain::{DamageKind, TerrainCell, TerrainMap, TerrainType, MAX_SLOPE_DEGREES};
    pub use crate::zones::ZoneRegistry;
}
