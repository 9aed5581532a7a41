use std::ops::RangeInclusive;

use crate::math_prelude::*;

/// Inclusive pixel rectangle.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BoundingBox {
    min_x: i32,
    min_y: i32,
    max_x: i32,
    max_y: i32,
}

impl BoundingBox {
    pub fn new(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Box around a screen-space triangle. Coordinates are truncated toward
    /// zero, not floored, so fractional edges may lose a pixel.
    pub fn from_points(p0: Vec2, p1: Vec2, p2: Vec2) -> Self {
        let min_x = p0.x.min(p1.x.min(p2.x));
        let min_y = p0.y.min(p1.y.min(p2.y));
        let max_x = p0.x.max(p1.x.max(p2.x));
        let max_y = p0.y.max(p1.y.max(p2.y));
        Self::new(min_x as i32, min_y as i32, max_x as i32, max_y as i32)
    }

    pub fn min_x(&self) -> i32 {
        self.min_x
    }
    pub fn min_y(&self) -> i32 {
        self.min_y
    }
    pub fn max_x(&self) -> i32 {
        self.max_x
    }
    pub fn max_y(&self) -> i32 {
        self.max_y
    }

    pub fn width(&self) -> u32 {
        span(self.min_x, self.max_x)
    }

    pub fn height(&self) -> u32 {
        span(self.min_y, self.max_y)
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    pub fn rows(&self) -> RangeInclusive<i32> {
        self.min_y..=self.max_y
    }

    pub fn columns(&self) -> RangeInclusive<i32> {
        self.min_x..=self.max_x
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.columns().contains(&x) && self.rows().contains(&y)
    }

    pub fn overlap(&self, other: &BoundingBox) -> Option<BoundingBox> {
        let maxl = self.min_x.max(other.min_x);
        let minr = self.max_x.min(other.max_x);
        if minr < maxl {
            return None;
        }

        let maxt = self.min_y.max(other.min_y);
        let minb = self.max_y.min(other.max_y);
        if minb < maxt {
            return None;
        }

        Some(BoundingBox::new(maxl, maxt, minr, minb))
    }
}

fn span(min: i32, max: i32) -> u32 {
    (i64::from(max) - i64::from(min) + 1).clamp(0, i64::from(u32::MAX)) as u32
}
