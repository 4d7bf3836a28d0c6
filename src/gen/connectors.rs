use super::VillageBuilder;
use crate::coords::{self, TileCoord};
use crate::village::{Building, PathVariant};
use glam::Vec2;
use ::pathfinding::prelude::bfs;
use rand::Rng;
use tracing::{debug, info, warn};

/// Guarantee (best-effort) that every building reaches the path network by
/// carving an L-shaped connector from its nearest perimeter cell to the
/// nearest path tile, detouring one tile sideways around water.
pub(crate) fn connect_buildings(builder: &mut VillageBuilder) {
    let verify_target = nearest_path_tile(builder, builder.center);

    for id in 0..builder.buildings.len() {
        let building = builder.buildings[id].clone();
        if has_adjacent_path(builder, &building) {
            continue;
        }
        let perimeter = perimeter_cells(&building);

        let building_center = building.center_px(builder.tile_size());
        let Some(target) = nearest_path_tile_px(builder, building_center) else {
            continue;
        };

        // The door is the perimeter cell closest to the chosen path tile
        let Some(door) = perimeter
            .iter()
            .copied()
            .filter(|cell| builder.in_bounds(*cell) && !builder.water.contains(cell))
            .min_by(|a, b| {
                a.euclidean_distance(target)
                    .total_cmp(&b.euclidean_distance(target))
            })
        else {
            continue;
        };

        let horizontal_first = builder.rng.gen_bool(0.5);
        carve_l_path(builder, door, target, horizontal_first);

        // Verification pass: the carve may have terminated early on water.
        // Retry once with the opposite axis order before giving up.
        if let Some(verify_target) = verify_target {
            if !is_connected(builder, door, verify_target) {
                builder.report.connectors_retried += 1;
                debug!("Connector for building {id} retried with swapped axis order");
                carve_l_path(builder, door, target, !horizontal_first);

                if !is_connected(builder, door, verify_target) {
                    builder.report.connectors_abandoned += 1;
                    warn!("Building {id} could not be connected to the path network");
                }
            }
        }
    }

    info!(
        "Connector pass: {} tiles carved, {} retried, {} abandoned",
        builder.report.connector_tiles_carved,
        builder.report.connectors_retried,
        builder.report.connectors_abandoned
    );
}

/// Cells along the building's four cardinal sides (no corners); these are
/// the candidate door locations.
fn perimeter_cells(building: &Building) -> Vec<TileCoord> {
    let span = building.size.footprint_tiles();
    let anchor = building.anchor;
    let mut cells = Vec::with_capacity((span * 4) as usize);

    // Bottom side first: the preferred door direction
    for x in 0..span {
        cells.push(anchor.offset(x, span));
    }
    for y in 0..span {
        cells.push(anchor.offset(span, y));
    }
    for x in 0..span {
        cells.push(anchor.offset(x, -1));
    }
    for y in 0..span {
        cells.push(anchor.offset(-1, y));
    }

    cells
}

/// Globally nearest path tile to a pixel position, by straight-line
/// distance. Ties break on coordinate order so generation stays
/// reproducible for a given seed.
fn nearest_path_tile_px(builder: &VillageBuilder, from: Vec2) -> Option<TileCoord> {
    let tile_size = builder.tile_size();
    builder.path_set.iter().copied().min_by(|a, b| {
        coords::tile_center(*a, tile_size)
            .distance(from)
            .total_cmp(&coords::tile_center(*b, tile_size).distance(from))
            .then_with(|| a.cmp(b))
    })
}

fn nearest_path_tile(builder: &VillageBuilder, from: TileCoord) -> Option<TileCoord> {
    nearest_path_tile_px(builder, coords::tile_center(from, builder.tile_size()))
}

/// BFS across the cardinal path network from `start` to `target`
fn is_connected(builder: &VillageBuilder, start: TileCoord, target: TileCoord) -> bool {
    if !builder.path_set.contains(&start) {
        return false;
    }
    bfs(
        &start,
        |coord| {
            coord
                .cardinal_neighbors()
                .into_iter()
                .filter(|n| builder.path_set.contains(n))
                .collect::<Vec<_>>()
        },
        |coord| *coord == target,
    )
    .is_some()
}

/// Carve an L-shaped dirt path from `start` to `end`: one axis to
/// alignment, then the other. A step into water tries a one-tile lateral
/// detour first; with no detour the connector terminates early.
fn carve_l_path(builder: &mut VillageBuilder, start: TileCoord, end: TileCoord, horizontal_first: bool) {
    add_connector_tile(builder, start);

    let mut current = start;
    if horizontal_first {
        carve_horizontal_leg(builder, &mut current, end.x);
        carve_vertical_leg(builder, &mut current, end.y);
    } else {
        carve_vertical_leg(builder, &mut current, end.y);
        carve_horizontal_leg(builder, &mut current, end.x);
    }
}

fn carve_horizontal_leg(builder: &mut VillageBuilder, current: &mut TileCoord, end_x: i32) {
    let dx = match end_x.cmp(&current.x) {
        std::cmp::Ordering::Greater => 1,
        std::cmp::Ordering::Less => -1,
        std::cmp::Ordering::Equal => return,
    };

    while current.x != end_x {
        let next = current.offset(dx, 0);
        if !builder.in_bounds(next) {
            break;
        }

        if builder.water.contains(&next) {
            // Sidestep one tile perpendicular to the direction of travel
            let mut detoured = false;
            for dy in [1, -1] {
                let detour = current.offset(0, dy);
                let next_detour = next.offset(0, dy);
                if builder.in_bounds(detour)
                    && builder.in_bounds(next_detour)
                    && !builder.water.contains(&detour)
                    && !builder.water.contains(&next_detour)
                {
                    add_connector_tile(builder, detour);
                    current.y += dy;
                    detoured = true;
                    break;
                }
            }
            if !detoured {
                break;
            }
        } else {
            current.x = next.x;
            add_connector_tile(builder, next);
        }
    }
}

fn carve_vertical_leg(builder: &mut VillageBuilder, current: &mut TileCoord, end_y: i32) {
    let dy = match end_y.cmp(&current.y) {
        std::cmp::Ordering::Greater => 1,
        std::cmp::Ordering::Less => -1,
        std::cmp::Ordering::Equal => return,
    };

    while current.y != end_y {
        let next = current.offset(0, dy);
        if !builder.in_bounds(next) {
            break;
        }

        if builder.water.contains(&next) {
            let mut detoured = false;
            for dx in [1, -1] {
                let detour = current.offset(dx, 0);
                let next_detour = next.offset(dx, 0);
                if builder.in_bounds(detour)
                    && builder.in_bounds(next_detour)
                    && !builder.water.contains(&detour)
                    && !builder.water.contains(&next_detour)
                {
                    add_connector_tile(builder, detour);
                    current.x += dx;
                    detoured = true;
                    break;
                }
            }
            if !detoured {
                break;
            }
        } else {
            current.y = next.y;
            add_connector_tile(builder, next);
        }
    }
}

fn add_connector_tile(builder: &mut VillageBuilder, coord: TileCoord) {
    if !builder.path_set.contains(&coord) {
        builder.add_path(coord, PathVariant::Dirt);
        if builder.path_set.contains(&coord) {
            builder.report.connector_tiles_carved += 1;
        }
    }
}

/// Whether a building already touches the path network on a cardinal side
pub(crate) fn has_adjacent_path(builder: &VillageBuilder, building: &Building) -> bool {
    perimeter_cells(building)
        .iter()
        .any(|cell| builder.path_set.contains(cell))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gen::{GenerationConfig, VillageBuilder, WaterKind};
    use crate::village::{BuildingKind, BuildingSize};

    fn builder(seed: u64) -> VillageBuilder {
        let mut b = VillageBuilder::new(GenerationConfig {
            seed,
            size_tiles: 48,
            water: WaterKind::Lake,
            ..Default::default()
        })
        .unwrap();
        b.center = TileCoord::new(24, 24);
        b
    }

    fn test_building(id: usize, anchor: TileCoord, size: BuildingSize) -> Building {
        Building {
            id,
            anchor,
            size,
            kind: BuildingKind::House,
            name: None,
            interaction_points: Vec::new(),
        }
    }

    #[test]
    fn test_perimeter_excludes_corners() {
        let building = test_building(0, TileCoord::new(10, 10), BuildingSize::Medium);
        let cells = perimeter_cells(&building);

        assert_eq!(cells.len(), 8);
        assert!(!cells.contains(&TileCoord::new(9, 9)));
        assert!(!cells.contains(&TileCoord::new(12, 12)));
        assert!(cells.contains(&TileCoord::new(10, 12)));
        assert!(cells.contains(&TileCoord::new(12, 10)));
        assert!(cells.contains(&TileCoord::new(10, 9)));
        assert!(cells.contains(&TileCoord::new(9, 10)));
    }

    #[test]
    fn test_l_path_connects() {
        let mut b = builder(1);
        carve_l_path(&mut b, TileCoord::new(5, 5), TileCoord::new(10, 9), true);

        // Start, elbow, and end are all carved
        assert!(b.path_set.contains(&TileCoord::new(5, 5)));
        assert!(b.path_set.contains(&TileCoord::new(10, 5)));
        assert!(b.path_set.contains(&TileCoord::new(10, 9)));
        // The chain is cardinally contiguous from start to end
        assert!(is_connected(&b, TileCoord::new(5, 5), TileCoord::new(10, 9)));
    }

    #[test]
    fn test_l_path_detours_water() {
        let mut b = builder(2);
        // A single water tile blocking the horizontal leg
        b.water.insert(TileCoord::new(7, 5));

        carve_l_path(&mut b, TileCoord::new(5, 5), TileCoord::new(10, 5), true);

        for path in &b.paths {
            assert!(!b.water.contains(&path.coord));
        }
        assert!(is_connected(&b, TileCoord::new(5, 5), TileCoord::new(10, 5)));
    }

    #[test]
    fn test_connect_buildings_reaches_network() {
        let mut b = builder(3);
        // A straight road and a building away from it
        for x in 10..30 {
            b.add_path(TileCoord::new(x, 24), PathVariant::Dirt);
        }
        let building = test_building(0, TileCoord::new(18, 14), BuildingSize::Medium);
        for tile in building.footprint() {
            b.building_tiles.insert(tile);
        }
        b.buildings.push(building);

        connect_buildings(&mut b);

        let building = b.buildings[0].clone();
        assert!(has_adjacent_path(&b, &building));
        assert_eq!(b.report.connectors_abandoned, 0);
    }

    #[test]
    fn test_already_connected_building_untouched() {
        let mut b = builder(4);
        for x in 10..30 {
            b.add_path(TileCoord::new(x, 24), PathVariant::Dirt);
        }
        // Building directly north of the road: perimeter touches it
        let building = test_building(0, TileCoord::new(15, 22), BuildingSize::Medium);
        b.buildings.push(building);

        let paths_before = b.paths.len();
        connect_buildings(&mut b);
        assert_eq!(b.paths.len(), paths_before);
    }
}
