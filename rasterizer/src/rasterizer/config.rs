use crate::math_prelude::*;

use super::{LightingMode, Material};

/// Knobs shared by every triangle of a draw pass.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RasterConfig {
    pub material: Material,
    /// Stand-in eye position for the specular term.
    pub eye: Vec3,
    pub lighting: LightingMode,
    /// Triangles whose `|det|` is at or below this cover no pixel.
    pub degenerate_epsilon: f32,
    /// Scan rows on the rayon pool. Output is identical to the serial scan.
    pub parallel_rows: bool,
}

impl RasterConfig {
    pub const DEFAULT_EYE: Vec3 = Vec3::new(0.0, 0.0, 1.0);
    pub const DEFAULT_DEGENERATE_EPSILON: f32 = 1e-6;

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    pub fn with_lighting(mut self, lighting: LightingMode) -> Self {
        self.lighting = lighting;
        self
    }

    pub fn with_parallel_rows(mut self, parallel_rows: bool) -> Self {
        self.parallel_rows = parallel_rows;
        self
    }
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            material: Material::default(),
            eye: Self::DEFAULT_EYE,
            lighting: LightingMode::default(),
            degenerate_epsilon: Self::DEFAULT_DEGENERATE_EPSILON,
            parallel_rows: false,
        }
    }
}
