use super::VillageBuilder;
use crate::coords::TileCoord;
use crate::village::{Bridge, BridgeOrientation};
use std::collections::HashSet;
use tracing::info;

/// Mark water tiles flanked by opposing path tiles as bridges
pub(crate) fn place_bridges(builder: &mut VillageBuilder) {
    let bridges = scan_bridges(&builder.water, &builder.path_set);
    builder.report.bridges_placed = bridges.len() as u32;
    info!("Placed {} bridges", bridges.len());
    builder.bridges = bridges;
}

/// A water tile with path tiles on both its east and west sides carries a
/// horizontal bridge; path tiles north and south make a vertical one.
/// Horizontal wins when both apply.
pub(crate) fn scan_bridges(
    water: &HashSet<TileCoord>,
    paths: &HashSet<TileCoord>,
) -> Vec<Bridge> {
    let mut sorted_water: Vec<TileCoord> = water.iter().copied().collect();
    sorted_water.sort();

    let mut bridges = Vec::new();
    for coord in sorted_water {
        let horizontal =
            paths.contains(&coord.offset(-1, 0)) && paths.contains(&coord.offset(1, 0));
        let vertical =
            paths.contains(&coord.offset(0, -1)) && paths.contains(&coord.offset(0, 1));

        if horizontal {
            bridges.push(Bridge {
                coord,
                orientation: BridgeOrientation::Horizontal,
            });
        } else if vertical {
            bridges.push(Bridge {
                coord,
                orientation: BridgeOrientation::Vertical,
            });
        }
    }

    bridges
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizontal_bridge() {
        let water: HashSet<TileCoord> = [TileCoord::new(2, 2)].into_iter().collect();
        let paths: HashSet<TileCoord> = [TileCoord::new(1, 2), TileCoord::new(3, 2)]
            .into_iter()
            .collect();

        let bridges = scan_bridges(&water, &paths);
        assert_eq!(bridges.len(), 1);
        assert_eq!(bridges[0].coord, TileCoord::new(2, 2));
        assert_eq!(bridges[0].orientation, BridgeOrientation::Horizontal);
    }

    #[test]
    fn test_vertical_bridge() {
        let water: HashSet<TileCoord> = [TileCoord::new(5, 5)].into_iter().collect();
        let paths: HashSet<TileCoord> = [TileCoord::new(5, 4), TileCoord::new(5, 6)]
            .into_iter()
            .collect();

        let bridges = scan_bridges(&water, &paths);
        assert_eq!(bridges.len(), 1);
        assert_eq!(bridges[0].orientation, BridgeOrientation::Vertical);
    }

    #[test]
    fn test_horizontal_wins_over_vertical() {
        let water: HashSet<TileCoord> = [TileCoord::new(5, 5)].into_iter().collect();
        let paths: HashSet<TileCoord> = [
            TileCoord::new(4, 5),
            TileCoord::new(6, 5),
            TileCoord::new(5, 4),
            TileCoord::new(5, 6),
        ]
        .into_iter()
        .collect();

        let bridges = scan_bridges(&water, &paths);
        assert_eq!(bridges.len(), 1);
        assert_eq!(bridges[0].orientation, BridgeOrientation::Horizontal);
    }

    #[test]
    fn test_one_sided_water_gets_no_bridge() {
        let water: HashSet<TileCoord> = [TileCoord::new(5, 5)].into_iter().collect();
        let paths: HashSet<TileCoord> = [TileCoord::new(4, 5)].into_iter().collect();

        assert!(scan_bridges(&water, &paths).is_empty());
    }

    #[test]
    fn test_flanked_by_water_gets_no_bridge() {
        // Both flanks must be paths; a water neighbor does not count
        let water: HashSet<TileCoord> = [TileCoord::new(5, 5), TileCoord::new(6, 5)]
            .into_iter()
            .collect();
        let paths: HashSet<TileCoord> = [TileCoord::new(4, 5), TileCoord::new(7, 5)]
            .into_iter()
            .collect();

        assert!(scan_bridges(&water, &paths).is_empty());
    }
}
