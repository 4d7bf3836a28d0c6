use super::constants::*;
use super::VillageBuilder;
use crate::coords::{self, TileCoord};
use crate::village::PathVariant;
use rand::Rng;
use std::collections::{HashSet, VecDeque};
use tracing::{debug, info};

/// Lay out the path network: village center, plaza, waterfront path,
/// radial roads with water detours, and ring connectors.
pub(crate) fn build_road_network(builder: &mut VillageBuilder) {
    find_village_center(builder);
    create_plaza(builder);
    create_waterfront_path(builder);
    create_radial_roads(builder);
    create_ring_paths(builder);

    info!(
        "Road network laid: {} path tiles, center at {}",
        builder.paths.len(),
        builder.center
    );
}

/// Pick the village center: the map center if dry, otherwise the nearest
/// non-water tile found by spiraling outward. Falls back to a fixed
/// off-center point when the search radius is exhausted.
fn find_village_center(builder: &mut VillageBuilder) {
    let map_center = TileCoord::new(
        builder.size_tiles() as i32 / 2,
        builder.size_tiles() as i32 / 2,
    );
    if !builder.water.contains(&map_center) {
        builder.center = map_center;
        return;
    }

    let center_px = coords::tile_center(map_center, builder.tile_size());
    let tile_size = builder.tile_size();
    let max_radius = builder.size_px() / 4;

    let mut radius = tile_size;
    while radius < max_radius {
        for angle_deg in (0..360).step_by(CENTER_SEARCH_ANGLE_STEP_DEG as usize) {
            let pos = coords::polar_offset(
                center_px,
                (angle_deg as f32).to_radians(),
                radius as f32,
            );
            let coord = coords::pixel_to_tile(pos, tile_size);
            if builder.in_bounds(coord) && !builder.water.contains(&coord) {
                builder.center = coord;
                return;
            }
        }
        radius += tile_size;
    }

    // Everything near the middle is water; settle a quarter of the way in
    builder.center = TileCoord::new(
        builder.size_tiles() as i32 / 4,
        builder.size_tiles() as i32 / 4,
    );
}

/// Stone-paved circular plaza around the village center
fn create_plaza(builder: &mut VillageBuilder) {
    let tile_size = builder.tile_size();
    let radius = (builder.size_px() / PLAZA_RADIUS_DIVISOR) as f32;
    let center_px = coords::tile_center(builder.center, tile_size);
    let radius_tiles = (radius / tile_size as f32).ceil() as i32;

    for dy in -radius_tiles..=radius_tiles {
        for dx in -radius_tiles..=radius_tiles {
            let coord = builder.center.offset(dx, dy);
            if !builder.in_bounds(coord) || builder.water.contains(&coord) {
                continue;
            }
            if coords::tile_center(coord, tile_size).distance(center_px) < radius {
                builder.add_path(coord, PathVariant::Stone);
            }
        }
    }
}

/// Sparse dirt path along the water's edge: every 3rd edge tile, to avoid
/// an unnaturally dense border.
fn create_waterfront_path(builder: &mut VillageBuilder) {
    let mut water_edge = HashSet::new();
    for water_pos in &builder.water {
        for neighbor in water_pos.all_neighbors() {
            if coords::in_bounds(neighbor, builder.size_tiles())
                && !builder.water.contains(&neighbor)
            {
                water_edge.insert(neighbor);
            }
        }
    }

    let mut sorted_edges: Vec<TileCoord> = water_edge.into_iter().collect();
    sorted_edges.sort();

    for (i, edge_pos) in sorted_edges.into_iter().enumerate() {
        if i % WATERFRONT_PATH_SPACING == 0 {
            builder.add_path(edge_pos, PathVariant::Dirt);
        }
    }
}

/// Main roads radiating out from the village center in 8 compass directions
fn create_radial_roads(builder: &mut VillageBuilder) {
    for angle_deg in (0..360).step_by(RADIAL_ROAD_ANGLE_STEP_DEG as usize) {
        create_road_from_center(builder, angle_deg as f32);
    }
}

/// Step outward from the center along one angle, detouring around water.
/// The road is abandoned when no detour exists within the search envelope.
fn create_road_from_center(builder: &mut VillageBuilder, angle_deg: f32) {
    let tile_size = builder.tile_size();
    let angle_rad = angle_deg.to_radians();
    let road_length =
        builder.size_px() / 2 + builder.rng.gen_range(0..builder.size_px() / 4);
    let center_px = coords::tile_center(builder.center, tile_size);

    let mut current = builder.center;

    let mut dist = 0;
    while dist < road_length {
        let next_px = coords::polar_offset(center_px, angle_rad, dist as f32);
        let next = coords::pixel_to_tile(next_px, tile_size);

        if !builder.in_bounds(next) {
            break;
        }

        if builder.water.contains(&next) {
            match find_detour_around_water(builder, current, angle_deg) {
                Some(detour) => {
                    builder.add_path(detour, PathVariant::Dirt);
                    current = detour;
                }
                None => {
                    builder.report.roads_aborted += 1;
                    debug!("Road at {angle_deg}° abandoned: no detour around water");
                    break;
                }
            }
        } else {
            builder.add_path(next, PathVariant::Dirt);
            current = next;
        }

        dist += tile_size;
    }
}

/// Probe alternate angles and step distances for a dry tile to resume a
/// road from
fn find_detour_around_water(
    builder: &mut VillageBuilder,
    current: TileCoord,
    angle_deg: f32,
) -> Option<TileCoord> {
    let tile_size = builder.tile_size();
    let current_px = coords::tile_center(current, tile_size);

    for offset_deg in DETOUR_ANGLE_OFFSETS_DEG {
        let detour_rad = (angle_deg + offset_deg).to_radians();
        for dist_tiles in 1..=DETOUR_MAX_DISTANCE_TILES {
            let pos = coords::polar_offset(
                current_px,
                detour_rad,
                (dist_tiles * tile_size as i32) as f32,
            );
            let coord = coords::pixel_to_tile(pos, tile_size);
            if builder.in_bounds(coord) && !builder.water.contains(&coord) {
                return Some(coord);
            }
        }
    }

    None
}

/// Concentric connector rings at three fixed radii for lateral connectivity
fn create_ring_paths(builder: &mut VillageBuilder) {
    for divisor in RING_RADIUS_DIVISORS {
        create_ring_path(builder, (builder.size_px() / divisor) as f32);
    }
}

fn create_ring_path(builder: &mut VillageBuilder, ring_radius: f32) {
    let tile_size = builder.tile_size();
    let center_px = coords::tile_center(builder.center, tile_size);
    let tolerance = tile_size as f32 * RING_TOLERANCE_TILES;
    let scan_tiles = ((ring_radius + tile_size as f32) / tile_size as f32).ceil() as i32;

    for dy in -scan_tiles..=scan_tiles {
        for dx in -scan_tiles..=scan_tiles {
            let coord = builder.center.offset(dx, dy);
            if !builder.in_bounds(coord) || builder.water.contains(&coord) {
                continue;
            }
            let distance = coords::tile_center(coord, tile_size).distance(center_px);
            if (distance - ring_radius).abs() < tolerance {
                builder.add_path(coord, PathVariant::Dirt);
            }
        }
    }
}

/// Repair the path network after buildings and connectors are in: insert
/// cardinal tiles for diagonal-only links, then prune dead-end stubs.
pub(crate) fn repair_path_network(builder: &mut VillageBuilder) {
    ensure_cardinal_adjacency(builder);
    prune_isolated_paths(builder);

    info!(
        "Path repair: {} diagonal links fixed, {} stubs removed",
        builder.report.diagonal_links_repaired, builder.report.stub_paths_removed
    );
}

/// Any path tile with no cardinal path neighbor but at least one diagonal
/// path neighbor gets a synthesized cardinal connector so that no segment
/// is diagonal-only.
fn ensure_cardinal_adjacency(builder: &mut VillageBuilder) {
    let snapshot: Vec<(TileCoord, PathVariant)> =
        builder.paths.iter().map(|p| (p.coord, p.variant)).collect();

    for (coord, variant) in snapshot {
        let cardinal_adjacent = coord
            .cardinal_neighbors()
            .iter()
            .filter(|n| builder.path_set.contains(n))
            .count();
        if cardinal_adjacent > 0 {
            continue;
        }

        // For each diagonal link, prefer the vertical connector, then the
        // horizontal one (N/W for NW, N/E for NE, S/W for SW, S/E for SE)
        for (dx, dy) in crate::coords::DIAGONAL_OFFSETS {
            if !builder.path_set.contains(&coord.offset(dx, dy)) {
                continue;
            }
            for candidate in [coord.offset(0, dy), coord.offset(dx, 0)] {
                if builder.path_set.contains(&candidate) {
                    // A previous repair already made this link cardinal
                    break;
                }
                builder.add_path(candidate, variant);
                if builder.path_set.contains(&candidate) {
                    builder.report.diagonal_links_repaired += 1;
                    break;
                }
            }
        }
    }
}

/// Remove path tiles with fewer than 2 cardinal path neighbors, unless the
/// tile sits on the map boundary or beside a building footprint (those keep
/// building access alive). Removal cascades until stable so that no
/// dead-end chain survives.
fn prune_isolated_paths(builder: &mut VillageBuilder) {
    let max = builder.size_tiles() as i32 - 1;
    let building_tiles = builder.building_tiles.clone();

    let is_exempt = |coord: TileCoord| {
        let on_boundary = coord.x == 0 || coord.y == 0 || coord.x == max || coord.y == max;
        on_boundary
            || coord
                .all_neighbors()
                .iter()
                .any(|n| building_tiles.contains(n))
    };

    let mut removed = HashSet::new();
    let mut queue: VecDeque<TileCoord> = builder.path_set.iter().copied().collect();

    while let Some(coord) = queue.pop_front() {
        if removed.contains(&coord) || !builder.path_set.contains(&coord) {
            continue;
        }
        let cardinal_count = coord
            .cardinal_neighbors()
            .iter()
            .filter(|n| builder.path_set.contains(n) && !removed.contains(*n))
            .count();
        if cardinal_count >= 2 || is_exempt(coord) {
            continue;
        }

        removed.insert(coord);
        // Neighbors may have just lost their second connection
        for neighbor in coord.cardinal_neighbors() {
            if builder.path_set.contains(&neighbor) && !removed.contains(&neighbor) {
                queue.push_back(neighbor);
            }
        }
    }

    builder.report.stub_paths_removed += removed.len() as u32;
    builder.remove_paths(&removed);
}
