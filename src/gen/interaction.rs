use super::VillageBuilder;
use crate::coords::{self, TileCoord};
use crate::village::{
    Building, BuildingKind, FurnitureKind, GrassVariant, InteractionKind, InteractionPoint,
};
use glam::Vec2;
use tracing::info;

/// How many water-edge tiles sit between successive fishing spots
const FISHING_SPOT_SPACING: usize = 4;

/// Derive interaction points from the generated layout: building doors,
/// type-specific furniture, and fishing spots along path-adjacent water.
pub(crate) fn analyze_interaction_points(builder: &mut VillageBuilder) {
    for id in 0..builder.buildings.len() {
        let building = builder.buildings[id].clone();

        let door = place_door(builder, &building);
        let mut points = vec![door];
        points.extend(furniture_points(builder, &building));

        builder.buildings[id].interaction_points = points.clone();
        builder.interaction_points.extend(points);

        mark_trodden_grass(builder, door.position);
    }

    find_fishing_spots(builder);

    info!(
        "Derived {} interaction points",
        builder.interaction_points.len()
    );
}

/// Doors default to the bottom-center of the footprint. When that side
/// faces water, the other sides are tried in left, right, top order. If an
/// adjacent tile carries a path, the door snaps to it.
fn place_door(builder: &VillageBuilder, building: &Building) -> InteractionPoint {
    let tile_size = builder.tile_size();
    let span_px = building.size.footprint_tiles() as f32 * tile_size as f32;
    let origin = coords::tile_origin(building.anchor, tile_size);

    let candidates = [
        origin + Vec2::new(span_px / 2.0, span_px), // bottom
        origin + Vec2::new(0.0, span_px / 2.0),     // left
        origin + Vec2::new(span_px, span_px / 2.0), // right
        origin + Vec2::new(span_px / 2.0, 0.0),     // top
    ];

    let mut door_pos = candidates[0];
    for candidate in candidates {
        let tile = coords::pixel_to_tile(candidate, tile_size);
        if !builder.water.contains(&tile) {
            door_pos = candidate;
            break;
        }
    }

    // Prefer a door that opens directly onto the path network
    let door_tile = coords::pixel_to_tile(door_pos, tile_size);
    'snap: for dy in -1..=1 {
        for dx in -1..=1 {
            let check = door_tile.offset(dx, dy);
            if builder.path_set.contains(&check) {
                door_pos = coords::tile_center(check, tile_size);
                break 'snap;
            }
        }
    }

    InteractionPoint {
        kind: InteractionKind::Door,
        position: door_pos,
        building: Some(building.id),
    }
}

/// Interior furniture by building type, positioned at footprint fractions
fn furniture_points(builder: &VillageBuilder, building: &Building) -> Vec<InteractionPoint> {
    let tile_size = builder.tile_size();
    let span_px = building.size.footprint_tiles() as f32 * tile_size as f32;
    let origin = coords::tile_origin(building.anchor, tile_size);

    let at = |fx: f32, fy: f32| origin + Vec2::new(span_px * fx, span_px * fy);
    let point = |kind: FurnitureKind, pos: Vec2| InteractionPoint {
        kind: InteractionKind::Furniture(kind),
        position: pos,
        building: Some(building.id),
    };

    match building.kind {
        BuildingKind::House | BuildingKind::Cottage | BuildingKind::Manor => vec![
            point(FurnitureKind::Bed, at(0.25, 0.25)),
            point(FurnitureKind::Table, at(0.75, 0.75)),
        ],
        BuildingKind::Inn | BuildingKind::Tavern => vec![
            point(FurnitureKind::Bed, at(0.25, 0.25)),
            point(FurnitureKind::Table, at(0.75, 0.25)),
            point(FurnitureKind::Table, at(0.25, 0.75)),
            point(FurnitureKind::Table, at(0.75, 0.75)),
        ],
        BuildingKind::Store | BuildingKind::Market | BuildingKind::Bakery => {
            vec![point(FurnitureKind::Counter, at(0.5, 0.5))]
        }
        BuildingKind::Workshop | BuildingKind::Smithy | BuildingKind::Storage => {
            vec![point(FurnitureKind::Workbench, at(0.5, 0.5))]
        }
        BuildingKind::TownHall | BuildingKind::Temple => {
            vec![point(FurnitureKind::Table, at(0.5, 0.5))]
        }
    }
}

/// Grass outside a door becomes trodden (variant 3); agents prefer it
fn mark_trodden_grass(builder: &mut VillageBuilder, door_pos: Vec2) {
    let door_tile = coords::pixel_to_tile(door_pos, builder.tile_size());
    let mut tiles = vec![door_tile];
    tiles.extend(door_tile.cardinal_neighbors());

    for tile in tiles {
        if builder.in_bounds(tile)
            && !builder.water.contains(&tile)
            && !builder.path_set.contains(&tile)
            && !builder.building_tiles.contains(&tile)
        {
            builder.terrain.set(tile, GrassVariant::Trodden);
        }
    }
}

/// Fishing spots: a sparse sample of water tiles reachable from the path
/// network (a cardinal path neighbor).
fn find_fishing_spots(builder: &mut VillageBuilder) {
    let mut edge_water: Vec<TileCoord> = builder
        .water
        .iter()
        .copied()
        .filter(|w| {
            w.cardinal_neighbors()
                .iter()
                .any(|n| builder.path_set.contains(n))
        })
        .collect();
    edge_water.sort();

    let tile_size = builder.tile_size();
    for coord in edge_water.into_iter().step_by(FISHING_SPOT_SPACING) {
        builder.interaction_points.push(InteractionPoint {
            kind: InteractionKind::FishingSpot,
            position: coords::tile_center(coord, tile_size),
            building: None,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gen::{GenerationConfig, VillageBuilder, WaterKind};
    use crate::village::{BuildingSize, PathVariant};

    fn builder(seed: u64) -> VillageBuilder {
        VillageBuilder::new(GenerationConfig {
            seed,
            size_tiles: 48,
            water: WaterKind::Lake,
            ..Default::default()
        })
        .unwrap()
    }

    fn test_building(id: usize, anchor: TileCoord, kind: BuildingKind) -> Building {
        Building {
            id,
            anchor,
            size: BuildingSize::Medium,
            kind,
            name: None,
            interaction_points: Vec::new(),
        }
    }

    #[test]
    fn test_every_building_gets_a_door() {
        let mut b = builder(31);
        b.buildings.push(test_building(0, TileCoord::new(10, 10), BuildingKind::House));
        b.buildings.push(test_building(1, TileCoord::new(20, 20), BuildingKind::Store));

        analyze_interaction_points(&mut b);

        for building in &b.buildings {
            let doors = building
                .interaction_points
                .iter()
                .filter(|p| p.kind == InteractionKind::Door)
                .count();
            assert_eq!(doors, 1);
        }
    }

    #[test]
    fn test_door_avoids_water_side() {
        let mut b = builder(32);
        // Water directly south of the building pushes the door elsewhere
        for dx in -1..=3 {
            b.water.insert(TileCoord::new(10 + dx, 12));
        }
        b.buildings.push(test_building(0, TileCoord::new(10, 10), BuildingKind::House));

        analyze_interaction_points(&mut b);

        let door = b.buildings[0].interaction_points[0];
        let door_tile = coords::pixel_to_tile(door.position, b.tile_size());
        assert!(!b.water.contains(&door_tile));
    }

    #[test]
    fn test_door_snaps_to_path() {
        let mut b = builder(33);
        // A path tile just below the building's bottom-center
        b.add_path(TileCoord::new(11, 12), PathVariant::Dirt);
        b.buildings.push(test_building(0, TileCoord::new(10, 10), BuildingKind::House));

        analyze_interaction_points(&mut b);

        let door = b.buildings[0].interaction_points[0];
        assert_eq!(door.position, coords::tile_center(TileCoord::new(11, 12), 32));
    }

    #[test]
    fn test_furniture_by_kind() {
        let mut b = builder(34);
        b.buildings.push(test_building(0, TileCoord::new(10, 10), BuildingKind::Tavern));
        b.buildings.push(test_building(1, TileCoord::new(20, 20), BuildingKind::Smithy));

        analyze_interaction_points(&mut b);

        let tavern_tables = b.buildings[0]
            .interaction_points
            .iter()
            .filter(|p| p.kind == InteractionKind::Furniture(FurnitureKind::Table))
            .count();
        assert_eq!(tavern_tables, 3);

        let smithy_has_workbench = b.buildings[1]
            .interaction_points
            .iter()
            .any(|p| p.kind == InteractionKind::Furniture(FurnitureKind::Workbench));
        assert!(smithy_has_workbench);
    }

    #[test]
    fn test_fishing_spots_touch_paths() {
        let mut b = builder(35);
        for i in 0..8 {
            b.water.insert(TileCoord::new(10 + i, 10));
            b.add_path(TileCoord::new(10 + i, 11), PathVariant::Dirt);
        }

        analyze_interaction_points(&mut b);

        let spots: Vec<_> = b
            .interaction_points
            .iter()
            .filter(|p| p.kind == InteractionKind::FishingSpot)
            .collect();
        assert!(!spots.is_empty());
        for spot in spots {
            let tile = coords::pixel_to_tile(spot.position, b.tile_size());
            assert!(b.water.contains(&tile));
        }
    }

    #[test]
    fn test_trodden_grass_outside_door() {
        let mut b = builder(36);
        b.buildings.push(test_building(0, TileCoord::new(10, 10), BuildingKind::House));
        for tile in b.buildings[0].footprint() {
            b.building_tiles.insert(tile);
        }

        analyze_interaction_points(&mut b);

        // Door defaults to bottom-center; the tile under it is outside the
        // footprint and should now be trodden
        let door = b.buildings[0].interaction_points[0];
        let door_tile = coords::pixel_to_tile(door.position, b.tile_size());
        assert_eq!(b.terrain.get(door_tile), Some(GrassVariant::Trodden));
    }
}
