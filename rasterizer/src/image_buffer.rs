//! Images as grids of normalized RGBA samples.
//!
//! [`ImageBuffer`] is the texture-side counterpart of the framebuffer: every
//! sample is a [`Color`] whose channels sit in `0..=1`. Buffers come from a
//! file through the `image` crate, from an already decoded surface described
//! by a [`RawBitmap`], or from plain dimensions.

use std::path::Path;

use thiserror::Error;

use crate::math_prelude::*;
use crate::Color;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("failed to read image: {0}")]
    Image(#[from] image::ImageError),
    #[error("bitmap pitch of {pitch} bytes is smaller than a row of {row_bytes} bytes")]
    PitchTooSmall { pitch: usize, row_bytes: usize },
    #[error("bitmap needs {required} bytes but only {actual} were given")]
    BufferTooShort { required: usize, actual: usize },
    #[error("bitmap dimensions {width}x{height} do not fit in memory")]
    DimensionsOverflow { width: u32, height: u32 },
}

/// A decoded surface: rows of `pitch` bytes, `bytes_per_pixel` bytes per pixel.
#[derive(Debug, Copy, Clone)]
pub struct RawBitmap<'a> {
    width: u32,
    height: u32,
    pitch: usize,
    bytes_per_pixel: usize,
    data: &'a [u8],
}

impl<'a> RawBitmap<'a> {
    pub fn new(
        width: u32,
        height: u32,
        pitch: usize,
        bytes_per_pixel: usize,
        data: &'a [u8],
    ) -> Result<Self, ImageError> {
        let overflow = ImageError::DimensionsOverflow { width, height };
        let row_bytes = (width as usize)
            .checked_mul(bytes_per_pixel)
            .ok_or(overflow)?;
        if pitch < row_bytes {
            return Err(ImageError::PitchTooSmall { pitch, row_bytes });
        }

        let required = match height {
            0 => 0,
            h => pitch
                .checked_mul(h as usize - 1)
                .and_then(|n| n.checked_add(row_bytes))
                .ok_or(ImageError::DimensionsOverflow { width, height })?,
        };
        if data.len() < required {
            return Err(ImageError::BufferTooShort {
                required,
                actual: data.len(),
            });
        }

        Ok(Self {
            width,
            height,
            pitch,
            bytes_per_pixel,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bytes_per_pixel(&self) -> usize {
        self.bytes_per_pixel
    }

    /// The pixel packed into a `u32` the way the platform stores it.
    ///
    /// One, two and four byte pixels are read in native byte order; three byte
    /// pixels are assembled according to the target's endianness. Any other
    /// depth reads as 0. `None` when `(x, y)` is outside the bitmap.
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = y as usize * self.pitch + x as usize * self.bytes_per_pixel;
        let p = &self.data[offset..offset + self.bytes_per_pixel];
        let value = match self.bytes_per_pixel {
            1 => p[0] as u32,
            2 => u16::from_ne_bytes([p[0], p[1]]) as u32,
            3 if cfg!(target_endian = "big") => {
                (p[0] as u32) << 16 | (p[1] as u32) << 8 | p[2] as u32
            }
            3 => p[0] as u32 | (p[1] as u32) << 8 | (p[2] as u32) << 16,
            4 => u32::from_ne_bytes([p[0], p[1], p[2], p[3]]),
            _ => 0,
        };
        Some(value)
    }
}

/// Row-major grid of normalized samples.
///
/// `Clone` copies the pixels. An empty buffer (0x0) is valid and holds nothing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImageBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Buffer of `width * height` transparent black samples.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::TRANSPARENT; width as usize * height as usize],
        }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ImageError> {
        let path = path.as_ref();
        let img = image::open(path)?;
        let buffer = Self::from_image(&img);
        log::debug!(
            "loaded {} ({}x{})",
            path.display(),
            buffer.width,
            buffer.height
        );
        Ok(buffer)
    }

    pub fn from_image(img: &image::DynamicImage) -> Self {
        let rgba = img.to_rgba8();
        let pixels = rgba.pixels().map(|p| Color::from_rgba8(p.0)).collect();
        Self {
            width: rgba.width(),
            height: rgba.height(),
            pixels,
        }
    }

    /// Copies a decoded surface, splitting each packed pixel into its four
    /// bytes in memory order.
    pub fn from_bitmap(bitmap: &RawBitmap) -> Self {
        let (width, height) = (bitmap.width(), bitmap.height());
        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                let value = bitmap.pixel(x, y).unwrap_or_default();
                pixels.push(Color::from_rgba8(value.to_ne_bytes()));
            }
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> Option<&Color> {
        self.index(x, y).map(|i| &self.pixels[i])
    }

    /// Nearest sample at texture coordinates `uv`, origin at the top-left.
    /// Coordinates wrap, so `1.25` reads the same column as `0.25`.
    pub fn sample(&self, uv: Vec2) -> Option<Color> {
        if self.is_empty() {
            return None;
        }
        let x = (uv.x * self.width as f32).floor() as i64;
        let y = (uv.y * self.height as f32).floor() as i64;
        let x = x.rem_euclid(self.width as i64) as u32;
        let y = y.rem_euclid(self.height as i64) as u32;
        self.get_pixel(x, y).copied()
    }

    /// Writes one sample. Coordinates outside the buffer are ignored and
    /// reported by returning `false`.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Color) -> bool {
        match self.index(x, y) {
            Some(i) => {
                self.pixels[i] = color;
                true
            }
            None => {
                log::trace!(
                    "ignoring write at ({}, {}) in a {}x{} image",
                    x,
                    y,
                    self.width,
                    self.height
                );
                false
            }
        }
    }

    /// Opaque black everywhere.
    pub fn fill_black(&mut self) {
        self.pixels.fill(Color::BLACK);
    }

    /// Blends from `top` on the first row to `bottom` on the last one.
    pub fn fill_vertical_gradient(&mut self, top: Color, bottom: Color) {
        let span = self.height.saturating_sub(1).max(1) as f32;
        let width = self.width as usize;
        if width == 0 {
            return;
        }
        for (y, row) in self.pixels.chunks_mut(width).enumerate() {
            let t = y as f32 / span;
            row.fill(top * (1.0 - t) + bottom * t);
        }
    }

    /// `width * height * 4` bytes, RGBA per pixel in row-major order. Alpha is
    /// always written as 255.
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 4);
        for pixel in self.pixels.iter() {
            let [r, g, b, _] = pixel.to_rgba8();
            bytes.extend_from_slice(&[r, g, b, 255]);
        }
        bytes
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        if x < self.width && y < self.height {
            Some(x as usize + y as usize * self.width as usize)
        } else {
            None
        }
    }
}
