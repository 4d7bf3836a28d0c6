/// Constants for the village generation pipeline

/// Water feature shaping
pub const LAKE_RADIUS_DIVISOR: u32 = 8;
pub const LAKE_CENTER_JITTER_DIVISOR: u32 = 10;
pub const LAKE_POLYGON_POINTS: usize = 12;
pub const RIVER_WIDTH_MIN_TILES: u32 = 3;
pub const RIVER_WIDTH_MAX_TILES: u32 = 5;
pub const RIVER_DEVIATION_DIVISOR: f32 = 6.0;
pub const RIVER_WAYPOINT_SPACING_DIVISOR: f32 = 10.0;

/// Road network layout
pub const RADIAL_ROAD_ANGLE_STEP_DEG: u32 = 45;
pub const CENTER_SEARCH_ANGLE_STEP_DEG: u32 = 15;
pub const PLAZA_RADIUS_DIVISOR: u32 = 16;
pub const WATERFRONT_PATH_SPACING: usize = 3;
pub const RING_RADIUS_DIVISORS: [u32; 3] = [10, 5, 3];
pub const RING_TOLERANCE_TILES: f32 = 0.75;
pub const DETOUR_ANGLE_OFFSETS_DEG: [f32; 8] = [-30.0, -15.0, 15.0, 30.0, -45.0, 45.0, -60.0, 60.0];
pub const DETOUR_MAX_DISTANCE_TILES: i32 = 4;

/// Zone thresholds (fractions of the map span)
pub const CENTER_ZONE_DIVISOR: u32 = 8;
pub const OUTSKIRTS_ZONE_DIVISOR: u32 = 3;

/// Building placement
pub const PLACEMENT_ATTEMPTS_PER_TARGET: usize = 3;
pub const ANCHOR_SCAN_RADIUS_TILES: i32 = 3;
pub const CENTER_BUILDING_BASE: f32 = 8.0;
pub const WATERFRONT_BUILDING_BASE: f32 = 6.0;
pub const OUTSKIRTS_BUILDING_BASE: f32 = 12.0;
pub const BUILDING_SCALE_REFERENCE_PX: f32 = 1000.0;

/// Forest placement
pub const FOREST_BLOBS_MIN: u32 = 4;
pub const FOREST_BLOBS_MAX: u32 = 6;
pub const FOREST_RADIUS_MIN_DIVISOR: u32 = 12;
pub const FOREST_RADIUS_MAX_DIVISOR: u32 = 8;
pub const FOREST_CENTER_CLEARANCE_DIVISOR: u32 = 4;
pub const FOREST_BLOB_ATTEMPTS: u32 = 10;
pub const FOREST_MAX_BUILDINGS_IN_BLOB: u32 = 2;
pub const FOREST_DENSITY_FACTOR: f32 = 0.8;
pub const FOREST_EDGE_MARGIN_TILES: i32 = 5;
pub const TREE_VARIANTS: u8 = 5;
pub const TREE_FILLER_MAX_PATH_DISTANCE_TILES: i32 = 3;
