// Lets `#[derive(Interpolate)]` refer to `::shaded_raster` from inside this crate too.
extern crate self as shaded_raster;

pub mod image_buffer;
pub mod rasterizer;

pub use image_buffer::{ImageBuffer, ImageError, RawBitmap};
pub use rasterizer::*;
pub use shaded_raster_macros::Interpolate;

pub mod math_prelude {
    pub use glam::{Vec2, Vec2Swizzles, Vec3, Vec3Swizzles, Vec4, Vec4Swizzles};
}
