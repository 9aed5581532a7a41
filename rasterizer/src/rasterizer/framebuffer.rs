use super::{BoundingBox, Color, Fragment};

/// Destination of rasterized pixels.
///
/// Implementations do their own depth test and bounds check; the rasterizer
/// hands over every covered pixel of its bounding box as is.
pub trait ScreenTarget {
    fn set_pixel(&mut self, x: i32, y: i32, depth: f32, color: &Color);

    /// Receives the full fragment. Targets that want the interpolated world
    /// position override this; the default forwards to `set_pixel`.
    fn set_fragment(&mut self, fragment: &Fragment) {
        self.set_pixel(fragment.x, fragment.y, fragment.depth, &fragment.color)
    }

    /// Pixels outside these bounds would be discarded anyway, so the
    /// rasterizer may skip them. `None` means unknown.
    fn bounds(&self) -> Option<BoundingBox> {
        None
    }
}

impl<T: ScreenTarget + ?Sized> ScreenTarget for &mut T {
    fn set_pixel(&mut self, x: i32, y: i32, depth: f32, color: &Color) {
        (**self).set_pixel(x, y, depth, color)
    }

    fn set_fragment(&mut self, fragment: &Fragment) {
        (**self).set_fragment(fragment)
    }

    fn bounds(&self) -> Option<BoundingBox> {
        (**self).bounds()
    }
}

/// Color and depth planes of a frame. Smaller depth is closer.
#[derive(Debug, Clone)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    color: Vec<Color>,
    depth: Vec<f32>,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Self {
        let size = plane_len(width, height);
        let color = vec![Color::default(); size];
        let depth = vec![f32::MAX; size];
        Self {
            width,
            height,
            color,
            depth,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn clear(&mut self) {
        self.clear_color(Color::default())
    }

    pub fn clear_color(&mut self, color: Color) {
        self.color.fill(color);
        self.depth.fill(f32::MAX);
    }

    pub fn color(&self) -> impl Iterator<Item = (u32, u32, &Color)> {
        self.color.iter().enumerate().map(move |(i, c)| {
            let (x, y) = self.index_to_coords(i);
            (x, y, c)
        })
    }

    pub fn depth(&self) -> impl Iterator<Item = (u32, u32, &f32)> {
        self.depth.iter().enumerate().map(move |(i, d)| {
            let (x, y) = self.index_to_coords(i);
            (x, y, d)
        })
    }

    pub fn get_color(&self, x: u32, y: u32) -> Option<&Color> {
        self.coords_to_index(x, y).map(|i| &self.color[i])
    }

    pub fn get_depth(&self, x: u32, y: u32) -> Option<&f32> {
        self.coords_to_index(x, y).map(|i| &self.depth[i])
    }

    /// Stores `color` when `depth` is closer than what is already there.
    pub fn set_color_if_closer(&mut self, x: u32, y: u32, depth: f32, color: &Color) -> bool {
        match self.coords_to_index(x, y) {
            Some(index) if self.depth[index] > depth => {
                self.depth[index] = depth;
                self.color[index] = *color;
                true
            }
            _ => false,
        }
    }

    /// Row-major RGBA bytes of channels on the 0-255 scale, alpha forced opaque.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.color.len() * 4);
        for c in self.color.iter() {
            bytes.extend_from_slice(&[c.r as u8, c.g as u8, c.b as u8, 255]);
        }
        bytes
    }

    fn coords_to_index(&self, x: u32, y: u32) -> Option<usize> {
        if x < self.width && y < self.height {
            Some(x as usize + y as usize * self.width as usize)
        } else {
            None
        }
    }

    fn index_to_coords(&self, index: usize) -> (u32, u32) {
        let width = self.width as usize;
        ((index % width) as u32, (index / width) as u32)
    }
}

fn plane_len(width: u32, height: u32) -> usize {
    width as usize * height as usize
}

impl ScreenTarget for Framebuffer {
    fn set_pixel(&mut self, x: i32, y: i32, depth: f32, color: &Color) {
        if x < 0 || y < 0 {
            log::trace!("dropping pixel at ({}, {})", x, y);
            return;
        }
        self.set_color_if_closer(x as u32, y as u32, depth, color);
    }

    fn bounds(&self) -> Option<BoundingBox> {
        if self.width == 0 || self.height == 0 {
            return None;
        }
        Some(BoundingBox::new(
            0,
            0,
            self.width as i32 - 1,
            self.height as i32 - 1,
        ))
    }
}
