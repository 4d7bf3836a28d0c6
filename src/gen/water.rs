use super::constants::*;
use super::{VillageBuilder, WaterKind};
use crate::coords::{self, TileCoord};
use crate::village::GrassVariant;
use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg64;
use std::f32::consts::PI;
use tracing::info;

/// Carve the configured water feature into the terrain and mark shoreline
/// grass around it.
pub(crate) fn carve_water_features(builder: &mut VillageBuilder, kind: WaterKind) {
    match kind {
        WaterKind::Lake => {
            carve_lake(builder);
        }
        WaterKind::River => {
            let size_px = builder.size_px() as f32;
            let quarter = builder.size_px() / 4;
            let start_y = builder.rng.gen_range(quarter..3 * quarter) as f32;
            let end_y = builder.rng.gen_range(quarter..3 * quarter) as f32;
            carve_river(builder, Vec2::new(0.0, start_y), Vec2::new(size_px, end_y));
        }
        WaterKind::LakeWithRiver => {
            let (lake_center, lake_radius) = carve_lake(builder);
            let (start, end) = river_into_lake(builder, lake_center, lake_radius);
            carve_river(builder, start, end);
        }
        // Resolved by the builder before this stage runs
        WaterKind::Random => {}
    }

    mark_shore_grass(builder);
    info!("Carved {} water tiles", builder.water.len());
}

/// Carve an irregular lake near the map center. Returns its center and
/// base radius in pixels for river routing.
fn carve_lake(builder: &mut VillageBuilder) -> (Vec2, f32) {
    let size_px = builder.size_px() as f32;
    let jitter = (builder.size_px() / LAKE_CENTER_JITTER_DIVISOR) as i32;
    let center = Vec2::new(
        size_px / 2.0 + builder.rng.gen_range(-jitter..=jitter) as f32,
        size_px / 2.0 + builder.rng.gen_range(-jitter..=jitter) as f32,
    );
    let radius = (builder.size_px() / LAKE_RADIUS_DIVISOR) as f32;
    let irregularity = builder.config.irregularity.get();

    let polygon = lake_polygon(&mut builder.rng, center, radius, irregularity);

    // Scan the polygon's bounding box, testing each tile center
    let tile_size = builder.tile_size();
    let margin = 2.0 * tile_size as f32;
    let min_x = polygon.iter().map(|p| p.x).fold(f32::MAX, f32::min) - margin;
    let max_x = polygon.iter().map(|p| p.x).fold(f32::MIN, f32::max) + margin;
    let min_y = polygon.iter().map(|p| p.y).fold(f32::MAX, f32::min) - margin;
    let max_y = polygon.iter().map(|p| p.y).fold(f32::MIN, f32::max) + margin;

    let min_tile = coords::pixel_to_tile(Vec2::new(min_x, min_y), tile_size);
    let max_tile = coords::pixel_to_tile(Vec2::new(max_x, max_y), tile_size);

    for ty in min_tile.y..=max_tile.y {
        for tx in min_tile.x..=max_tile.x {
            let coord = TileCoord::new(tx, ty);
            if !builder.in_bounds(coord) {
                continue;
            }
            let tile_center = coords::tile_center(coord, tile_size);
            if point_in_radial_shape(tile_center, center, &polygon) {
                builder.water.insert(coord);
            }
        }
    }

    (center, radius)
}

/// Perimeter points of an irregular lake polygon, evenly spaced by angle
/// with randomized radii.
fn lake_polygon(rng: &mut Pcg64, center: Vec2, base_radius: f32, irregularity: f32) -> Vec<Vec2> {
    let mut points = Vec::with_capacity(LAKE_POLYGON_POINTS);
    for i in 0..LAKE_POLYGON_POINTS {
        let angle = i as f32 * (2.0 * PI / LAKE_POLYGON_POINTS as f32);
        let radius_modifier = 1.0 - irregularity / 2.0 + rng.gen_range(0.0..1.0) * irregularity;
        points.push(coords::polar_offset(
            center,
            angle,
            base_radius * radius_modifier,
        ));
    }
    points
}

/// Radial point-in-shape test: the point is inside if it is closer to the
/// polygon's center than the interpolated edge at its angle. Cheaper than
/// ray casting and exact enough for star-shaped lake polygons.
pub(crate) fn point_in_radial_shape(point: Vec2, center: Vec2, polygon: &[Vec2]) -> bool {
    if polygon.is_empty() {
        return false;
    }

    let offset = point - center;
    let mut angle = offset.y.atan2(offset.x);
    if angle < 0.0 {
        angle += 2.0 * PI;
    }

    let num_points = polygon.len();
    let mut sector = (angle / (2.0 * PI) * num_points as f32) as usize;
    if sector >= num_points {
        sector = 0;
    }

    let p1 = polygon[sector];
    let p2 = polygon[(sector + 1) % num_points];

    let sector_start = sector as f32 * (2.0 * PI / num_points as f32);
    let sector_progress = (angle - sector_start) / (2.0 * PI / num_points as f32);

    let edge = p1 + (p2 - p1) * sector_progress.clamp(0.0, 1.0);

    center.distance(point) <= center.distance(edge)
}

/// Pick a random map edge and route a river from it into the lake
fn river_into_lake(
    builder: &mut VillageBuilder,
    lake_center: Vec2,
    lake_radius: f32,
) -> (Vec2, Vec2) {
    let size_px = builder.size_px() as f32;
    let quarter = builder.size_px() / 4;
    let span = builder.rng.gen_range(quarter..3 * quarter) as f32;

    match builder.rng.gen_range(0..4) {
        0 => (
            Vec2::new(span, 0.0),
            Vec2::new(lake_center.x, lake_center.y - lake_radius),
        ),
        1 => (
            Vec2::new(size_px, span),
            Vec2::new(lake_center.x + lake_radius, lake_center.y),
        ),
        2 => (
            Vec2::new(span, size_px),
            Vec2::new(lake_center.x, lake_center.y + lake_radius),
        ),
        _ => (
            Vec2::new(0.0, span),
            Vec2::new(lake_center.x - lake_radius, lake_center.y),
        ),
    }
}

/// Carve a winding river as a fixed-width band around waypoint segments
fn carve_river(builder: &mut VillageBuilder, start: Vec2, end: Vec2) {
    let tile_size = builder.tile_size() as f32;
    let width_tiles = builder
        .rng
        .gen_range(RIVER_WIDTH_MIN_TILES..=RIVER_WIDTH_MAX_TILES) as i32;
    let waypoints = river_waypoints(builder, start, end);

    for pair in waypoints.windows(2) {
        let (p1, p2) = (pair[0], pair[1]);
        let segment = p2 - p1;
        let segment_length = segment.length();
        if segment_length == 0.0 {
            continue;
        }
        let perpendicular = Vec2::new(-segment.y, segment.x) / segment_length;

        // Half-tile steps keep the band gap-free on curved segments
        let steps = ((segment_length / (tile_size / 2.0)) as i32).max(1);
        for step in 0..=steps {
            let t = step as f32 / steps as f32;
            let along = p1 + segment * t;

            for w in -width_tiles / 2..=width_tiles / 2 {
                let pos = along + perpendicular * (w as f32 * tile_size);
                let coord = coords::pixel_to_tile(pos, builder.tile_size());
                if builder.in_bounds(coord) {
                    builder.water.insert(coord);
                }
            }
        }
    }
}

/// Interpolate start..end waypoints with a perpendicular sinusoidal-weighted
/// random deviation, maximal at the midpoint and zero at the endpoints.
fn river_waypoints(builder: &mut VillageBuilder, start: Vec2, end: Vec2) -> Vec<Vec2> {
    let size_px = builder.size_px() as f32;
    let distance = start.distance(end);
    let num_waypoints = ((distance / (size_px / RIVER_WAYPOINT_SPACING_DIVISOR)) as usize).max(3);

    let direction = end - start;
    let perpendicular = if distance > 0.0 {
        Vec2::new(-direction.y, direction.x) / distance
    } else {
        Vec2::ZERO
    };

    let mut waypoints = vec![start];
    for i in 1..num_waypoints {
        let progress = i as f32 / num_waypoints as f32;
        let base = start + direction * progress;

        let deviation = builder.rng.gen_range(-0.5..0.5) * size_px / RIVER_DEVIATION_DIVISOR
            * (progress * PI).sin();

        waypoints.push(base + perpendicular * deviation);
    }
    waypoints.push(end);
    waypoints
}

/// Turn grass tiles bordering water into shore grass (variant 2)
fn mark_shore_grass(builder: &mut VillageBuilder) {
    let water: Vec<TileCoord> = builder.water.iter().copied().collect();
    for water_pos in water {
        for neighbor in water_pos.all_neighbors() {
            if builder.in_bounds(neighbor) && !builder.water.contains(&neighbor) {
                builder.terrain.set(neighbor, GrassVariant::Shore);
            }
        }
    }
}
