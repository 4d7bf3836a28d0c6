use super::constants::*;
use super::VillageBuilder;
use crate::coords::{self, TileCoord};
use tracing::debug;

/// Placement zone used to bias building size and type distributions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Zone {
    Waterfront,
    Center,
    Outskirts,
}

/// Path tiles bucketed by zone. Tiles beyond the outskirts radius are
/// unzoned and take no buildings.
#[derive(Debug, Clone, Default)]
pub struct ZoneMap {
    pub waterfront: Vec<TileCoord>,
    pub center: Vec<TileCoord>,
    pub outskirts: Vec<TileCoord>,
}

impl ZoneMap {
    pub fn tiles(&self, zone: Zone) -> &[TileCoord] {
        match zone {
            Zone::Waterfront => &self.waterfront,
            Zone::Center => &self.center,
            Zone::Outskirts => &self.outskirts,
        }
    }
}

/// Classify every path tile: waterfront if any 8-neighbor is water,
/// otherwise center/outskirts by distance from the village center.
pub(crate) fn partition_zones(builder: &VillageBuilder) -> ZoneMap {
    let tile_size = builder.tile_size();
    let center_px = coords::tile_center(builder.center, tile_size);
    let center_radius = (builder.size_px() / CENTER_ZONE_DIVISOR) as f32;
    let outskirts_radius = (builder.size_px() / OUTSKIRTS_ZONE_DIVISOR) as f32;

    let mut zones = ZoneMap::default();

    for path in &builder.paths {
        let coord = path.coord;

        let near_water = coord
            .all_neighbors()
            .iter()
            .any(|n| builder.water.contains(n));
        if near_water {
            zones.waterfront.push(coord);
            continue;
        }

        let distance = coords::tile_center(coord, tile_size).distance(center_px);
        if distance < center_radius {
            zones.center.push(coord);
        } else if distance < outskirts_radius {
            zones.outskirts.push(coord);
        }
    }

    debug!(
        "Zones: {} waterfront, {} center, {} outskirts path tiles",
        zones.waterfront.len(),
        zones.center.len(),
        zones.outskirts.len()
    );

    zones
}
