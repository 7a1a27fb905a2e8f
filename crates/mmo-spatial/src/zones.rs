use crate::error::SpatialError;
use crate::grid::{GridConfig, SpatialGrid};
use crate::terrain::TerrainMap;
use std::collections::HashMap;

/// Owns one spatial grid and one terrain map per zone id; the interest
/// manager and combat resolver both look up a zone's grid through this
/// registry rather than each keeping their own.
#[derive(Default)]
pub struct ZoneRegistry {
    grids: HashMap<u32, SpatialGrid>,
    terrains: HashMap<u32, TerrainMap>,
}

impl ZoneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_zone(&mut self, zone: u32, grid_config: GridConfig, terrain: TerrainMap) {
        self.grids.insert(zone, SpatialGrid::new(grid_config));
        self.terrains.insert(zone, terrain);
    }

    pub fn grid(&self, zone: u32) -> Result<&SpatialGrid, SpatialError> {
        self.grids.get(&zone).ok_or(SpatialError::UnknownZone { zone })
    }

    pub fn grid_mut(&mut self, zone: u32) -> Result<&mut SpatialGrid, SpatialError> {
        self.grids.get_mut(&zone).ok_or(SpatialError::UnknownZone { zone })
    }

    pub fn terrain(&self, zone: u32) -> Result<&TerrainMap, SpatialError> {
        self.terrains.get(&zone).ok_or(SpatialError::UnknownZone { zone })
    }

    pub fn terrain_mut(&mut self, zone: u32) -> Result<&mut TerrainMap, SpatialError> {
        self.terrains.get_mut(&zone).ok_or(SpatialError::UnknownZone { zone })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unregistered_zone_is_an_error() {
        let registry = ZoneRegistry::new();
        assert!(registry.grid(1).is_err());
    }

    #[test]
    fn registered_zone_is_reachable() {
        let mut registry = ZoneRegistry::new();
        registry.register_zone(1, GridConfig::default(), TerrainMap::new(10, 10, 1.0));
        assert!(registry.grid(1).is_ok());
        assert!(registry.terrain(1).is_ok());
    }
}
