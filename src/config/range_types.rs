use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

/// How strongly an agent prefers to travel on paths, constrained to [0.3, 0.99].
/// Higher values make path and bridge tiles cheaper to traverse.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, From, Serialize, Deserialize)]
pub struct PathPreference(f32);

impl PathPreference {
    const MIN: f32 = 0.3;
    const MAX: f32 = 0.99;

    pub fn new(value: f32) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl Default for PathPreference {
    fn default() -> Self {
        Self::new(0.6)
    }
}

/// Lake shape irregularity constrained to [0.0, 1.0].
/// 0.0 is a circle, 1.0 is very irregular.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, From, Serialize, Deserialize)]
pub struct Irregularity(f32);

impl Irregularity {
    const MIN: f32 = 0.0;
    const MAX: f32 = 1.0;

    pub fn new(value: f32) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl Default for Irregularity {
    fn default() -> Self {
        Self::new(0.3)
    }
}

/// Tree density as a fraction of squared pixel size, constrained to [0.0, 0.01]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, From, Serialize, Deserialize)]
pub struct TreeDensity(f32);

impl TreeDensity {
    const MIN: f32 = 0.0;
    const MAX: f32 = 0.01;

    pub fn new(value: f32) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl Default for TreeDensity {
    fn default() -> Self {
        Self::new(0.0003)
    }
}
