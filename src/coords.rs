use derive_more::{Add, AddAssign, Display};
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Cardinal neighbor offsets in tile units (N, E, S, W)
pub const CARDINAL_OFFSETS: [(i32, i32); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

/// Diagonal neighbor offsets in tile units (NW, NE, SW, SE)
pub const DIAGONAL_OFFSETS: [(i32, i32); 4] = [(-1, -1), (1, -1), (-1, 1), (1, 1)];

/// All 8 neighbor offsets, cardinals first
pub const ALL_OFFSETS: [(i32, i32); 8] = [
    (0, -1),
    (1, 0),
    (0, 1),
    (-1, 0),
    (-1, -1),
    (1, -1),
    (-1, 1),
    (1, 1),
];

/// An integer tile coordinate on the village grid
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Add,
    AddAssign,
    Display,
    Serialize,
    Deserialize,
)]
#[display("({x}, {y})")]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
}

impl TileCoord {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// The 4 axis-aligned neighbors (N, E, S, W)
    pub fn cardinal_neighbors(self) -> [TileCoord; 4] {
        CARDINAL_OFFSETS.map(|(dx, dy)| self.offset(dx, dy))
    }

    /// The 4 diagonal neighbors
    pub fn diagonal_neighbors(self) -> [TileCoord; 4] {
        DIAGONAL_OFFSETS.map(|(dx, dy)| self.offset(dx, dy))
    }

    /// All 8 neighbors, cardinals first
    pub fn all_neighbors(self) -> [TileCoord; 8] {
        ALL_OFFSETS.map(|(dx, dy)| self.offset(dx, dy))
    }

    pub fn manhattan_distance(self, other: TileCoord) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    pub fn euclidean_distance(self, other: TileCoord) -> f32 {
        let dx = (self.x - other.x) as f32;
        let dy = (self.y - other.y) as f32;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Check if a tile coordinate is within a square grid of `size_tiles` per side
pub fn in_bounds(coord: TileCoord, size_tiles: u32) -> bool {
    coord.x >= 0 && coord.y >= 0 && coord.x < size_tiles as i32 && coord.y < size_tiles as i32
}

/// Convert a pixel position to the tile containing it
pub fn pixel_to_tile(pos: Vec2, tile_size: u32) -> TileCoord {
    TileCoord::new(
        (pos.x / tile_size as f32).floor() as i32,
        (pos.y / tile_size as f32).floor() as i32,
    )
}

/// Pixel position of a tile's top-left corner
pub fn tile_origin(coord: TileCoord, tile_size: u32) -> Vec2 {
    Vec2::new(
        (coord.x * tile_size as i32) as f32,
        (coord.y * tile_size as i32) as f32,
    )
}

/// Pixel position of a tile's center
pub fn tile_center(coord: TileCoord, tile_size: u32) -> Vec2 {
    tile_origin(coord, tile_size) + Vec2::splat(tile_size as f32 / 2.0)
}

/// Snap an arbitrary pixel position to the containing tile's top-left corner
pub fn align_to_grid(pos: Vec2, tile_size: u32) -> Vec2 {
    tile_origin(pixel_to_tile(pos, tile_size), tile_size)
}

/// Offset a pixel position by a polar (angle, distance) step
pub fn polar_offset(origin: Vec2, angle_rad: f32, distance: f32) -> Vec2 {
    origin + Vec2::new(angle_rad.cos(), angle_rad.sin()) * distance
}
