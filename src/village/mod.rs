use crate::coords::{self, TileCoord};
use crate::errors::{HamletError, HamletResult};
use derive_more::Display;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use validator::Validate;

/// Index of a building within [`Village::buildings`]
pub type BuildingId = usize;

/// Grass classification for a terrain tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GrassVariant {
    /// Ordinary grass
    Plain,
    /// Grass bordering water
    Shore,
    /// Worn grass outside building entrances
    Trodden,
}

/// Dense per-tile grass classification grid (row-major)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainField {
    size_tiles: u32,
    cells: Vec<GrassVariant>,
}

impl TerrainField {
    /// Create a field of plain grass covering a square grid
    pub fn new(size_tiles: u32) -> Self {
        Self {
            size_tiles,
            cells: vec![GrassVariant::Plain; (size_tiles * size_tiles) as usize],
        }
    }

    pub fn size_tiles(&self) -> u32 {
        self.size_tiles
    }

    pub fn get(&self, coord: TileCoord) -> Option<GrassVariant> {
        if !coords::in_bounds(coord, self.size_tiles) {
            return None;
        }
        let index = (coord.y as u32 * self.size_tiles + coord.x as u32) as usize;
        self.cells.get(index).copied()
    }

    /// Set a tile's grass variant. Out-of-bounds coordinates are ignored.
    pub fn set(&mut self, coord: TileCoord, variant: GrassVariant) {
        if !coords::in_bounds(coord, self.size_tiles) {
            return;
        }
        let index = (coord.y as u32 * self.size_tiles + coord.x as u32) as usize;
        if let Some(cell) = self.cells.get_mut(index) {
            *cell = variant;
        }
    }
}

/// Building footprint size class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum BuildingSize {
    Small,
    Medium,
    Large,
}

impl BuildingSize {
    /// Side length of the square footprint, in tiles
    pub fn footprint_tiles(self) -> i32 {
        match self {
            BuildingSize::Small => 1,
            BuildingSize::Medium => 2,
            BuildingSize::Large => 3,
        }
    }

    /// Exclusion ring width around the footprint, in tiles
    pub fn buffer_tiles(self) -> i32 {
        match self {
            BuildingSize::Small => 1,
            BuildingSize::Medium | BuildingSize::Large => 2,
        }
    }
}

/// Building type label, biased by placement zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum BuildingKind {
    House,
    Cottage,
    Workshop,
    Storage,
    Inn,
    Store,
    Tavern,
    Smithy,
    Bakery,
    Market,
    #[display("Town Hall")]
    TownHall,
    Temple,
    Manor,
}

/// A placed building. The anchor is the top-left footprint tile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Building {
    pub id: BuildingId,
    pub anchor: TileCoord,
    pub size: BuildingSize,
    pub kind: BuildingKind,
    pub name: Option<String>,
    pub interaction_points: Vec<InteractionPoint>,
}

impl Building {
    /// All tiles covered by the footprint
    pub fn footprint(&self) -> Vec<TileCoord> {
        let span = self.size.footprint_tiles();
        let mut tiles = Vec::with_capacity((span * span) as usize);
        for dy in 0..span {
            for dx in 0..span {
                tiles.push(self.anchor.offset(dx, dy));
            }
        }
        tiles
    }

    pub fn contains(&self, coord: TileCoord) -> bool {
        let span = self.size.footprint_tiles();
        coord.x >= self.anchor.x
            && coord.x < self.anchor.x + span
            && coord.y >= self.anchor.y
            && coord.y < self.anchor.y + span
    }

    /// Pixel center of the footprint
    pub fn center_px(&self, tile_size: u32) -> Vec2 {
        let half_span = self.size.footprint_tiles() as f32 * tile_size as f32 / 2.0;
        coords::tile_origin(self.anchor, tile_size) + Vec2::splat(half_span)
    }
}

/// Path surface variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathVariant {
    Dirt,
    Stone,
}

/// A single tile of the path network
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PathTile {
    pub coord: TileCoord,
    pub variant: PathVariant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BridgeOrientation {
    Horizontal,
    Vertical,
}

/// A bridge overlaying a water tile flanked by path tiles
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Bridge {
    pub coord: TileCoord,
    pub orientation: BridgeOrientation,
}

/// A tree occupying one tile; never on a path or inside a footprint
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Tree {
    pub coord: TileCoord,
    pub variant: u8,
}

/// Furniture placed inside building interiors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum FurnitureKind {
    Bed,
    Table,
    Counter,
    Workbench,
}

impl FurnitureKind {
    /// Beds stay walkable so agents can reach them to sleep
    pub fn is_passable(self) -> bool {
        matches!(self, FurnitureKind::Bed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InteractionKind {
    Door,
    Furniture(FurnitureKind),
    FishingSpot,
}

/// A point agents can interact with, in pixel coordinates
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct InteractionPoint {
    pub kind: InteractionKind,
    pub position: Vec2,
    pub building: Option<BuildingId>,
}

/// A fully generated village: terrain, water, paths, buildings, trees,
/// bridges, and interaction points. Immutable once generation finishes.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Village {
    pub name: String,
    #[validate(range(min = 16, max = 512))]
    pub size_tiles: u32,
    #[validate(range(min = 8, max = 128))]
    pub tile_size: u32,
    pub terrain: TerrainField,
    pub water: HashSet<TileCoord>,
    pub paths: Vec<PathTile>,
    pub path_set: HashSet<TileCoord>,
    pub buildings: Vec<Building>,
    pub trees: Vec<Tree>,
    pub bridges: Vec<Bridge>,
    pub interaction_points: Vec<InteractionPoint>,
    pub center: TileCoord,
}

impl Village {
    /// Side length in pixels
    pub fn size_px(&self) -> u32 {
        self.size_tiles * self.tile_size
    }

    /// All tiles covered by any building footprint
    pub fn building_tiles(&self) -> HashSet<TileCoord> {
        self.buildings
            .iter()
            .flat_map(|b| b.footprint())
            .collect()
    }

    pub fn building(&self, id: BuildingId) -> Option<&Building> {
        self.buildings.get(id)
    }

    /// Get the villages directory path
    pub fn get_villages_dir() -> HamletResult<PathBuf> {
        std::env::current_dir()
            .map_err(HamletError::ConfigDirCreationFailed)
            .map(|dir| dir.join("villages"))
    }

    /// Load a village from the villages directory
    pub fn load_from_file<P: AsRef<Path>>(filename: P) -> HamletResult<Self> {
        let villages_dir = Self::get_villages_dir()?;
        let file_path = villages_dir.join(filename);

        if !file_path.exists() {
            return Err(HamletError::VillageFileNotFound { path: file_path });
        }

        let data = std::fs::read(&file_path).map_err(HamletError::ConfigDirCreationFailed)?;

        let (village, _): (Village, usize) =
            bincode::serde::decode_from_slice(&data, bincode::config::standard()).map_err(|e| {
                HamletError::CorruptedVillageFile {
                    reason: format!("Failed to deserialize village data: {e}"),
                }
            })?;

        village.validate().map_err(|validation_errors| {
            let error_details = validation_errors
                .field_errors()
                .iter()
                .map(|(field, errors)| {
                    let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
                    format!("{field}: {}", error_msgs.join(", "))
                })
                .collect::<Vec<String>>()
                .join("; ");

            HamletError::VillageValidationFailed {
                reason: error_details,
            }
        })?;

        Ok(village)
    }

    /// Save the village to the villages directory
    pub fn save_to_file<P: AsRef<Path>>(&self, filename: P) -> HamletResult<()> {
        self.validate()
            .map_err(|_| HamletError::InvalidVillageData {
                reason: "Village validation failed before save".to_string(),
            })?;

        let villages_dir = Self::get_villages_dir()?;
        let file_path = villages_dir.join(filename);

        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).map_err(HamletError::ConfigDirCreationFailed)?;
        }

        let data = bincode::serde::encode_to_vec(self, bincode::config::standard()).map_err(
            |e| HamletError::InvalidVillageData {
                reason: format!("Failed to serialize village: {e}"),
            },
        )?;

        std::fs::write(&file_path, data).map_err(HamletError::ConfigDirCreationFailed)?;

        Ok(())
    }
}
