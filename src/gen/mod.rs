use crate::config::range_types::{Irregularity, TreeDensity};
use crate::coords::{self, TileCoord};
use crate::errors::{HamletError, HamletResult};
use crate::village::{
    Bridge, Building, InteractionPoint, PathTile, PathVariant, TerrainField, Tree, Village,
};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::info;
use validator::Validate;

pub mod bridges;
pub mod buildings;
pub mod connectors;
pub mod constants;
pub mod forest;
pub mod interaction;
pub mod roads;
pub mod water;
pub mod zones;

/// Which water feature to carve into the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaterKind {
    Lake,
    River,
    LakeWithRiver,
    /// Pick one of the above at generation time
    Random,
}

impl std::str::FromStr for WaterKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lake" => Ok(WaterKind::Lake),
            "river" => Ok(WaterKind::River),
            "lake_with_river" => Ok(WaterKind::LakeWithRiver),
            "random" => Ok(WaterKind::Random),
            other => Err(format!(
                "Unknown water kind '{other}' (expected lake, river, lake_with_river, or random)"
            )),
        }
    }
}

/// Parameters for one generation run. The seed makes runs reproducible:
/// identical configs produce identical villages.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GenerationConfig {
    pub seed: u64,
    #[validate(range(min = 16, max = 512))]
    pub size_tiles: u32,
    #[validate(range(min = 8, max = 128))]
    pub tile_size: u32,
    pub water: WaterKind,
    pub irregularity: Irregularity,
    pub tree_density: TreeDensity,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            seed: 12345,
            size_tiles: 64,
            tile_size: 32,
            water: WaterKind::Random,
            irregularity: Irregularity::default(),
            tree_density: TreeDensity::default(),
        }
    }
}

/// Non-fatal diagnostics collected while generating. Repair passes and
/// abandoned carves are expected cleanup, not errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenerationReport {
    pub roads_aborted: u32,
    pub connector_tiles_carved: u32,
    pub connectors_retried: u32,
    pub connectors_abandoned: u32,
    pub diagonal_links_repaired: u32,
    pub stub_paths_removed: u32,
    pub trees_cleared_for_buildings: u32,
    pub trees_removed_by_repair: u32,
    pub bridges_placed: u32,
}

/// Shared mutable state threaded through the generation stages in order.
/// Each stage reads what earlier stages produced and writes its own layer.
pub struct VillageBuilder {
    pub(crate) config: GenerationConfig,
    pub(crate) rng: Pcg64,
    pub(crate) terrain: TerrainField,
    pub(crate) water: HashSet<TileCoord>,
    pub(crate) paths: Vec<PathTile>,
    pub(crate) path_set: HashSet<TileCoord>,
    pub(crate) buildings: Vec<Building>,
    pub(crate) building_tiles: HashSet<TileCoord>,
    /// Footprints plus buffer rings, used to keep buildings apart
    pub(crate) occupied: HashSet<TileCoord>,
    pub(crate) trees: Vec<Tree>,
    pub(crate) tree_set: HashSet<TileCoord>,
    pub(crate) bridges: Vec<Bridge>,
    pub(crate) interaction_points: Vec<InteractionPoint>,
    pub(crate) center: TileCoord,
    pub(crate) report: GenerationReport,
}

impl VillageBuilder {
    pub fn new(config: GenerationConfig) -> HamletResult<Self> {
        config
            .validate()
            .map_err(|e| HamletError::InvalidGenerationConfig {
                reason: e.to_string(),
            })?;

        let rng = Pcg64::seed_from_u64(config.seed);
        let terrain = TerrainField::new(config.size_tiles);
        let center = TileCoord::new(config.size_tiles as i32 / 2, config.size_tiles as i32 / 2);

        Ok(Self {
            config,
            rng,
            terrain,
            water: HashSet::new(),
            paths: Vec::new(),
            path_set: HashSet::new(),
            buildings: Vec::new(),
            building_tiles: HashSet::new(),
            occupied: HashSet::new(),
            trees: Vec::new(),
            tree_set: HashSet::new(),
            bridges: Vec::new(),
            interaction_points: Vec::new(),
            center,
            report: GenerationReport::default(),
        })
    }

    /// Run the full pipeline and return the finished village
    pub fn generate(self, name: impl Into<String>) -> HamletResult<Village> {
        self.generate_with_report(name).map(|(village, _)| village)
    }

    /// Run the full pipeline, also returning the collected diagnostics
    pub fn generate_with_report(
        mut self,
        name: impl Into<String>,
    ) -> HamletResult<(Village, GenerationReport)> {
        let name = name.into();
        info!(
            "Generating village '{}': {}x{} tiles at {}px (seed {})",
            name, self.config.size_tiles, self.config.size_tiles, self.config.tile_size,
            self.config.seed
        );

        let water_kind = self.resolve_water_kind();
        water::carve_water_features(&mut self, water_kind);
        roads::build_road_network(&mut self);

        let zone_map = zones::partition_zones(&self);
        buildings::place_buildings(&mut self, &zone_map);
        connectors::connect_buildings(&mut self);
        roads::repair_path_network(&mut self);
        forest::place_trees(&mut self);
        bridges::place_bridges(&mut self);
        interaction::analyze_interaction_points(&mut self);

        info!(
            "Generation complete: {} paths, {} buildings, {} trees, {} bridges, {} water tiles",
            self.paths.len(),
            self.buildings.len(),
            self.trees.len(),
            self.bridges.len(),
            self.water.len()
        );

        let report = self.report;
        let village = Village {
            name,
            size_tiles: self.config.size_tiles,
            tile_size: self.config.tile_size,
            terrain: self.terrain,
            water: self.water,
            paths: self.paths,
            path_set: self.path_set,
            buildings: self.buildings,
            trees: self.trees,
            bridges: self.bridges,
            interaction_points: self.interaction_points,
            center: self.center,
        };

        Ok((village, report))
    }

    fn resolve_water_kind(&mut self) -> WaterKind {
        match self.config.water {
            WaterKind::Random => {
                match self.rng.gen_range(0..3) {
                    0 => WaterKind::Lake,
                    1 => WaterKind::River,
                    _ => WaterKind::LakeWithRiver,
                }
            }
            kind => kind,
        }
    }

    pub(crate) fn size_tiles(&self) -> u32 {
        self.config.size_tiles
    }

    pub(crate) fn tile_size(&self) -> u32 {
        self.config.tile_size
    }

    pub(crate) fn size_px(&self) -> u32 {
        self.config.size_tiles * self.config.tile_size
    }

    pub(crate) fn in_bounds(&self, coord: TileCoord) -> bool {
        coords::in_bounds(coord, self.config.size_tiles)
    }

    /// Add a path tile. Out-of-bounds, water, and duplicate coordinates are
    /// silently skipped.
    pub(crate) fn add_path(&mut self, coord: TileCoord, variant: PathVariant) {
        if !self.in_bounds(coord) || self.water.contains(&coord) || self.path_set.contains(&coord)
        {
            return;
        }
        self.paths.push(PathTile { coord, variant });
        self.path_set.insert(coord);
    }

    /// Remove path tiles at the given coordinates
    pub(crate) fn remove_paths(&mut self, coords: &HashSet<TileCoord>) {
        self.paths.retain(|p| !coords.contains(&p.coord));
        for coord in coords {
            self.path_set.remove(coord);
        }
    }
}
