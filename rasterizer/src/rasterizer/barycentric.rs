use crate::math_prelude::*;

/// Barycentric ratios of a point relative to a triangle.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Barycentric {
    ratios: [f32; 3],
    inside: bool,
}

impl Barycentric {
    const DEGENERATE: Barycentric = Barycentric {
        ratios: [0.0; 3],
        inside: false,
    };

    pub fn ratios(&self) -> [f32; 3] {
        self.ratios
    }

    /// True when every ratio is non-negative. Points on an edge count as inside.
    pub fn is_inside(&self) -> bool {
        self.inside
    }
}

/// Edge-function coefficients of a screen-space triangle.
///
/// Built once per draw from the current vertex positions and then queried per
/// pixel. `det` is twice the signed area, so the solver works for both windings.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct EdgeFunctions {
    origin: Vec2,
    det: f32,
    coefficients: [f32; 4],
    degenerate: bool,
}

impl EdgeFunctions {
    pub fn new(p1: Vec2, p2: Vec2, p3: Vec2, epsilon: f32) -> Self {
        let coefficients = [p2.y - p3.y, p3.x - p2.x, p3.y - p1.y, p1.x - p3.x];
        let det = coefficients[0] * (p1.x - p3.x) + coefficients[1] * (p1.y - p3.y);
        Self {
            origin: p3,
            det,
            coefficients,
            degenerate: det.abs() <= epsilon,
        }
    }

    pub fn det(&self) -> f32 {
        self.det
    }

    /// Zero-area (collinear) triangle. Such a triangle covers no pixel.
    pub fn is_degenerate(&self) -> bool {
        self.degenerate
    }

    pub fn weights(&self, point: Vec2) -> Barycentric {
        if self.degenerate {
            return Barycentric::DEGENERATE;
        }

        let [c0, c1, c2, c3] = self.coefficients;
        let dx = point.x - self.origin.x;
        let dy = point.y - self.origin.y;
        let w0 = (c0 * dx + c1 * dy) / self.det;
        let w1 = (c2 * dx + c3 * dy) / self.det;
        let w2 = 1.0 - w0 - w1;

        Barycentric {
            ratios: [w0, w1, w2],
            inside: w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0,
        }
    }
}
