pub mod agent;
pub mod config;
pub mod coords;
pub mod errors;
pub mod gen;
pub mod pathfinding;
pub mod village;

// Selective re-exports for external consumers

// Errors - binaries and consumers need the shared result types
pub use errors::{HamletError, HamletResult};

// Generation - the pipeline entry points
pub use gen::{GenerationConfig, GenerationReport, VillageBuilder, WaterKind};

// Routing - the query surface used by simulation agents
pub use crate::pathfinding::{AStarRouter, PathfindingGrid};

// Village - the produced data record
pub use village::{Building, Village};
