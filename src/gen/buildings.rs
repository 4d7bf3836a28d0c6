use super::constants::*;
use super::zones::{Zone, ZoneMap};
use super::VillageBuilder;
use crate::coords::TileCoord;
use crate::village::{Building, BuildingKind, BuildingSize};
use rand::seq::SliceRandom;
use rand::Rng;
use rand_pcg::Pcg64;
use tracing::{debug, info};

const NAME_ADJECTIVES: [&str; 8] = [
    "Rusty", "Golden", "Laughing", "Wandering", "Crooked", "Salty", "Merry", "Drowsy",
];
const NAME_NOUNS: [&str; 8] = [
    "Anchor", "Stag", "Barrel", "Kettle", "Lantern", "Gull", "Oak", "Tankard",
];

/// Place buildings zone by zone. First-fit with no backtracking: placement
/// order shapes the final layout.
pub(crate) fn place_buildings(builder: &mut VillageBuilder, zones: &ZoneMap) {
    // Water is never buildable, nor may it sit inside a buffer ring
    builder.occupied.extend(builder.water.iter().copied());

    let scale = (builder.size_px() as f32 / BUILDING_SCALE_REFERENCE_PX).powi(2);
    let center_target = (CENTER_BUILDING_BASE * scale) as usize;
    let waterfront_target = (WATERFRONT_BUILDING_BASE * scale) as usize;
    let outskirts_target = (OUTSKIRTS_BUILDING_BASE * scale) as usize;

    debug!(
        "Building targets: {center_target} center, {waterfront_target} waterfront, \
         {outskirts_target} outskirts"
    );

    place_zone_buildings(builder, zones, Zone::Center, center_target);
    place_zone_buildings(builder, zones, Zone::Waterfront, waterfront_target);
    place_zone_buildings(builder, zones, Zone::Outskirts, outskirts_target);

    info!("Placed {} buildings", builder.buildings.len());
}

/// Attempt up to `target * 3` placements in one zone, anchoring candidates
/// near randomly chosen zone path tiles.
fn place_zone_buildings(
    builder: &mut VillageBuilder,
    zones: &ZoneMap,
    zone: Zone,
    target: usize,
) {
    let mut zone_paths: Vec<TileCoord> = zones.tiles(zone).to_vec();
    if zone_paths.is_empty() || target == 0 {
        return;
    }

    let mut placed = 0;
    for _attempt in 0..target * PLACEMENT_ATTEMPTS_PER_TARGET {
        if placed >= target || zone_paths.is_empty() {
            break;
        }

        let path_index = builder.rng.gen_range(0..zone_paths.len());
        let path_pos = zone_paths[path_index];

        let size = pick_size(&mut builder.rng, zone);
        if try_place_near(builder, path_pos, size, zone) {
            placed += 1;
        }

        // Spread buildings out instead of clustering on one path tile
        zone_paths.swap_remove(path_index);
    }

    debug!("Placed {placed}/{target} buildings in {zone:?} zone");
}

/// Scan anchors near a path tile (shuffled, first fit) and place a building
/// when footprint and buffer both validate.
fn try_place_near(
    builder: &mut VillageBuilder,
    path_pos: TileCoord,
    size: BuildingSize,
    zone: Zone,
) -> bool {
    let mut candidates = Vec::new();
    for dy in -ANCHOR_SCAN_RADIUS_TILES..=ANCHOR_SCAN_RADIUS_TILES {
        for dx in -ANCHOR_SCAN_RADIUS_TILES..=ANCHOR_SCAN_RADIUS_TILES {
            candidates.push(path_pos.offset(dx, dy));
        }
    }
    candidates.shuffle(&mut builder.rng);

    for anchor in candidates {
        if !footprint_valid(builder, anchor, size) || !buffer_valid(builder, anchor, size) {
            continue;
        }

        let kind = pick_kind(&mut builder.rng, zone);
        let name = pick_name(&mut builder.rng, kind);
        let id = builder.buildings.len();
        let building = Building {
            id,
            anchor,
            size,
            kind,
            name,
            interaction_points: Vec::new(),
        };

        occupy(builder, &building);
        clear_trees_under(builder, &building);
        builder.buildings.push(building);
        return true;
    }

    false
}

/// Every footprint tile must be in bounds and free of water, paths, and
/// previously claimed space.
fn footprint_valid(builder: &VillageBuilder, anchor: TileCoord, size: BuildingSize) -> bool {
    let span = size.footprint_tiles();
    for dy in 0..span {
        for dx in 0..span {
            let pos = anchor.offset(dx, dy);
            if !builder.in_bounds(pos)
                || builder.water.contains(&pos)
                || builder.path_set.contains(&pos)
                || builder.occupied.contains(&pos)
                || builder.building_tiles.contains(&pos)
            {
                return false;
            }
        }
    }
    true
}

/// The buffer ring may overlap paths (buildings sit beside roads) but not
/// another building's claimed space.
fn buffer_valid(builder: &VillageBuilder, anchor: TileCoord, size: BuildingSize) -> bool {
    let span = size.footprint_tiles();
    let buffer = size.buffer_tiles();

    for dy in -buffer..span + buffer {
        for dx in -buffer..span + buffer {
            if dx >= 0 && dx < span && dy >= 0 && dy < span {
                continue;
            }
            let pos = anchor.offset(dx, dy);
            if !builder.in_bounds(pos) {
                continue;
            }
            if builder.occupied.contains(&pos) && !builder.path_set.contains(&pos) {
                return false;
            }
        }
    }
    true
}

/// Claim the footprint and its buffer ring
fn occupy(builder: &mut VillageBuilder, building: &Building) {
    let span = building.size.footprint_tiles();
    let buffer = building.size.buffer_tiles();

    for tile in building.footprint() {
        builder.building_tiles.insert(tile);
        builder.occupied.insert(tile);
    }
    for dy in -buffer..span + buffer {
        for dx in -buffer..span + buffer {
            if dx >= 0 && dx < span && dy >= 0 && dy < span {
                continue;
            }
            let pos = building.anchor.offset(dx, dy);
            if builder.in_bounds(pos) {
                builder.occupied.insert(pos);
            }
        }
    }
}

/// Delete trees under a freshly placed footprint. Defensive when the forest
/// stage has not run yet; load-bearing when regenerating over existing trees.
fn clear_trees_under(builder: &mut VillageBuilder, building: &Building) {
    let before = builder.trees.len();
    builder.trees.retain(|tree| !building.contains(tree.coord));
    let removed = before - builder.trees.len();
    if removed > 0 {
        builder.tree_set.retain(|coord| !building.contains(*coord));
        builder.report.trees_cleared_for_buildings += removed as u32;
        debug!("Removed {removed} trees when placing {}", building.kind);
    }
}

/// Weighted size draw per zone: waterfront and outskirts favor small,
/// the center favors medium/large.
fn pick_size(rng: &mut Pcg64, zone: Zone) -> BuildingSize {
    use BuildingSize::*;
    match zone {
        Zone::Waterfront => weighted_pick(rng, &[(Small, 70), (Medium, 30)]),
        Zone::Center => weighted_pick(rng, &[(Small, 30), (Medium, 50), (Large, 20)]),
        Zone::Outskirts => weighted_pick(rng, &[(Small, 80), (Medium, 20)]),
    }
}

/// Weighted building-type draw per zone
fn pick_kind(rng: &mut Pcg64, zone: Zone) -> BuildingKind {
    use BuildingKind::*;
    match zone {
        Zone::Waterfront => weighted_pick(
            rng,
            &[
                (Cottage, 30),
                (House, 20),
                (Workshop, 10),
                (Inn, 20),
                (Tavern, 10),
                (Store, 10),
            ],
        ),
        Zone::Center => weighted_pick(
            rng,
            &[
                (House, 10),
                (Workshop, 15),
                (Store, 20),
                (Inn, 10),
                (Tavern, 10),
                (Smithy, 10),
                (Market, 10),
                (TownHall, 5),
                (Bakery, 10),
            ],
        ),
        Zone::Outskirts => weighted_pick(
            rng,
            &[
                (House, 40),
                (Cottage, 30),
                (Workshop, 10),
                (Store, 10),
                (Storage, 10),
            ],
        ),
    }
}

/// Social buildings get a sign name; everything else stays anonymous
fn pick_name(rng: &mut Pcg64, kind: BuildingKind) -> Option<String> {
    match kind {
        BuildingKind::Inn | BuildingKind::Tavern => {
            let adjective = NAME_ADJECTIVES[rng.gen_range(0..NAME_ADJECTIVES.len())];
            let noun = NAME_NOUNS[rng.gen_range(0..NAME_NOUNS.len())];
            Some(format!("The {adjective} {noun}"))
        }
        _ => None,
    }
}

fn weighted_pick<T: Copy>(rng: &mut Pcg64, choices: &[(T, u32)]) -> T {
    let total: u32 = choices.iter().map(|(_, weight)| weight).sum();
    let mut roll = rng.gen_range(0..total);
    for (item, weight) in choices {
        if roll < *weight {
            return *item;
        }
        roll -= weight;
    }
    choices[0].0
}
