use super::constants::*;
use super::VillageBuilder;
use crate::coords::{self, TileCoord};
use crate::village::Tree;
use glam::Vec2;
use rand::Rng;
use std::collections::HashSet;
use tracing::{debug, info};

/// A circular forest zone seeded away from the village center
#[derive(Debug, Clone, Copy)]
struct ForestBlob {
    center: Vec2,
    radius: f32,
}

/// Scatter trees: dense random forest blobs first, then path-adjacent
/// filler if the target count was not reached, then a validation pass that
/// deletes any tree that ended up on a path or inside a building.
pub(crate) fn place_trees(builder: &mut VillageBuilder) {
    let size_px = builder.size_px() as f32;
    let target = (size_px * size_px * builder.config.tree_density.get()) as usize;
    debug!("Tree target: {target}");

    let blobs = create_forest_blobs(builder);
    let blocked = blocked_tiles(builder);

    for blob in &blobs {
        if builder.trees.len() >= target {
            break;
        }
        fill_blob(builder, blob, &blocked, target);
    }

    if builder.trees.len() < target {
        place_path_filler(builder, &blocked, target);
    }

    validate_trees(builder);

    info!(
        "Placed {} trees ({} removed by the repair pass)",
        builder.trees.len(),
        builder.report.trees_removed_by_repair
    );
}

/// Tiles trees must never occupy: water, paths, and building footprints
/// plus a two-tile ring around each building.
fn blocked_tiles(builder: &VillageBuilder) -> HashSet<TileCoord> {
    let mut blocked = HashSet::new();
    blocked.extend(builder.water.iter().copied());
    blocked.extend(builder.path_set.iter().copied());

    for building in &builder.buildings {
        let span = building.size.footprint_tiles();
        for dy in -2..span + 2 {
            for dx in -2..span + 2 {
                let pos = building.anchor.offset(dx, dy);
                if builder.in_bounds(pos) {
                    blocked.insert(pos);
                }
            }
        }
    }

    blocked
}

/// Seed 4-6 forest blobs, each kept clear of the village center and of
/// built-up areas (at most 2 buildings inside).
fn create_forest_blobs(builder: &mut VillageBuilder) -> Vec<ForestBlob> {
    let size_px = builder.size_px() as f32;
    let tile_size = builder.tile_size() as f32;
    let margin = tile_size * FOREST_EDGE_MARGIN_TILES as f32;
    let map_center = Vec2::splat(size_px / 2.0);
    let min_center_distance = size_px / FOREST_CENTER_CLEARANCE_DIVISOR as f32;

    let num_blobs = builder.rng.gen_range(FOREST_BLOBS_MIN..=FOREST_BLOBS_MAX);
    let mut blobs = Vec::with_capacity(num_blobs as usize);

    for _ in 0..num_blobs {
        for _attempt in 0..FOREST_BLOB_ATTEMPTS {
            let center = Vec2::new(
                builder.rng.gen_range(margin..size_px - margin),
                builder.rng.gen_range(margin..size_px - margin),
            );
            if center.distance(map_center) < min_center_distance {
                continue;
            }

            let radius = builder.rng.gen_range(
                size_px / FOREST_RADIUS_MIN_DIVISOR as f32
                    ..=size_px / FOREST_RADIUS_MAX_DIVISOR as f32,
            );

            let buildings_inside = builder
                .buildings
                .iter()
                .filter(|b| b.center_px(builder.tile_size()).distance(center) < radius)
                .count() as u32;
            if buildings_inside > FOREST_MAX_BUILDINGS_IN_BLOB {
                continue;
            }

            blobs.push(ForestBlob { center, radius });
            break;
        }
    }

    debug!("Seeded {} forest blobs", blobs.len());
    blobs
}

/// Fill one blob, with placement probability falling off linearly from the
/// blob center.
fn fill_blob(
    builder: &mut VillageBuilder,
    blob: &ForestBlob,
    blocked: &HashSet<TileCoord>,
    target: usize,
) {
    let tile_size = builder.tile_size();
    let min_tile = coords::pixel_to_tile(blob.center - Vec2::splat(blob.radius), tile_size);
    let max_tile = coords::pixel_to_tile(blob.center + Vec2::splat(blob.radius), tile_size);

    for ty in min_tile.y..=max_tile.y {
        for tx in min_tile.x..=max_tile.x {
            if builder.trees.len() >= target {
                return;
            }

            let coord = TileCoord::new(tx, ty);
            if !builder.in_bounds(coord) || blocked.contains(&coord) {
                continue;
            }

            let distance = coords::tile_center(coord, tile_size).distance(blob.center);
            if distance > blob.radius {
                continue;
            }

            let probability = (1.0 - distance / blob.radius) * FOREST_DENSITY_FACTOR;
            if builder.rng.gen_range(0.0..1.0f32) > probability {
                continue;
            }

            if too_close_to_tree(builder, coord) {
                continue;
            }

            plant_tree(builder, coord);
        }
    }
}

/// Filler pass: trees between 1 and 3 tiles from any path tile, used only
/// when the blobs under-filled the target.
fn place_path_filler(builder: &mut VillageBuilder, blocked: &HashSet<TileCoord>, target: usize) {
    let size = builder.size_tiles() as i32;

    for ty in 0..size {
        for tx in 0..size {
            if builder.trees.len() >= target {
                return;
            }

            let coord = TileCoord::new(tx, ty);
            if blocked.contains(&coord)
                || builder.tree_set.contains(&coord)
                || too_close_to_tree(builder, coord)
                || !near_path(builder, coord)
            {
                continue;
            }

            plant_tree(builder, coord);
        }
    }
}

/// Near a path but not on one: some path tile within 1..=3 tiles
fn near_path(builder: &VillageBuilder, coord: TileCoord) -> bool {
    let max = TREE_FILLER_MAX_PATH_DISTANCE_TILES;
    for dy in -max..=max {
        for dx in -max..=max {
            if dx == 0 && dy == 0 {
                continue;
            }
            if builder.path_set.contains(&coord.offset(dx, dy)) {
                return true;
            }
        }
    }
    false
}

/// Minimum spacing of ~1.5 tiles means no tree in the 8-neighborhood
fn too_close_to_tree(builder: &VillageBuilder, coord: TileCoord) -> bool {
    coord
        .all_neighbors()
        .iter()
        .any(|n| builder.tree_set.contains(n))
}

fn plant_tree(builder: &mut VillageBuilder, coord: TileCoord) {
    let variant = builder.rng.gen_range(1..=TREE_VARIANTS);
    builder.trees.push(Tree { coord, variant });
    builder.tree_set.insert(coord);
}

/// Correctness backstop: delete any tree coincident with a path tile or
/// inside a building footprint, and log how many were removed.
fn validate_trees(builder: &mut VillageBuilder) {
    let path_set = &builder.path_set;
    let building_tiles = &builder.building_tiles;

    let before = builder.trees.len();
    builder.trees.retain(|tree| {
        let bad = path_set.contains(&tree.coord) || building_tiles.contains(&tree.coord);
        if bad {
            debug!("Removing misplaced tree at {}", tree.coord);
        }
        !bad
    });
    let removed = (before - builder.trees.len()) as u32;
    builder.report.trees_removed_by_repair += removed;

    if removed > 0 {
        builder
            .tree_set
            .retain(|c| !path_set.contains(c) && !building_tiles.contains(c));
        info!("Tree validation removed {removed} misplaced trees");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gen::{GenerationConfig, VillageBuilder, WaterKind};
    use crate::village::{Building, BuildingKind, BuildingSize, PathVariant};

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

    #[test]
    fn test_trees_avoid_blocked_tiles() {
        let mut b = builder(21);
        for x in 0..48 {
            b.add_path(TileCoord::new(x, 24), PathVariant::Dirt);
        }
        b.water.insert(TileCoord::new(10, 10));
        let building = Building {
            id: 0,
            anchor: TileCoord::new(30, 30),
            size: BuildingSize::Large,
            kind: BuildingKind::Manor,
            name: None,
            interaction_points: Vec::new(),
        };
        for tile in building.footprint() {
            b.building_tiles.insert(tile);
        }
        b.buildings.push(building);

        place_trees(&mut b);

        assert!(!b.trees.is_empty());
        for tree in &b.trees {
            assert!(!b.path_set.contains(&tree.coord));
            assert!(!b.water.contains(&tree.coord));
            assert!(!b.building_tiles.contains(&tree.coord));
        }
    }

    #[test]
    fn test_tree_spacing() {
        let mut b = builder(22);
        place_trees(&mut b);

        for tree in &b.trees {
            for neighbor in tree.coord.all_neighbors() {
                assert!(
                    !b.tree_set.contains(&neighbor),
                    "trees at {} and {} violate spacing",
                    tree.coord,
                    neighbor
                );
            }
        }
    }

    #[test]
    fn test_forest_blobs_stay_off_center() {
        let mut b = builder(23);
        let blobs = create_forest_blobs(&mut b);

        let map_center = Vec2::splat(b.size_px() as f32 / 2.0);
        for blob in &blobs {
            assert!(blob.center.distance(map_center) >= b.size_px() as f32 / 4.0);
        }
    }

    #[test]
    fn test_validation_removes_planted_conflicts() {
        let mut b = builder(24);
        // Force a conflict: a tree directly on a path
        b.trees.push(Tree {
            coord: TileCoord::new(5, 5),
            variant: 1,
        });
        b.tree_set.insert(TileCoord::new(5, 5));
        b.add_path(TileCoord::new(5, 5), PathVariant::Dirt);

        validate_trees(&mut b);

        assert!(b.trees.is_empty());
        assert_eq!(b.report.trees_removed_by_repair, 1);
    }
}
