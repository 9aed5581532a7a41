use itertools::Itertools;
use shaded_raster::math_prelude::*;
use shaded_raster::{Color, ImageBuffer, ShadedVertex};

/// Triangle mesh already placed in screen space.
pub struct Mesh {
    pub vertices: Vec<ShadedVertex>,
    pub indices: Vec<usize>,
}

/// A dome `z = 0.5 * (1 - x^2 - y^2)` over `[-1, 1]^2`, tessellated into a
/// `resolution` x `resolution` grid of quads and mapped orthographically onto
/// a `width` x `height` screen. Vertex colors come from `texture` when given,
/// from a position ramp otherwise.
pub fn dome(resolution: usize, width: u32, height: u32, texture: Option<&ImageBuffer>) -> Mesh {
    let resolution = resolution.max(1);
    let side = resolution + 1;
    let step = 2.0 / resolution as f32;
    let (max_x, max_y) = ((width.max(1) - 1) as f32, (height.max(1) - 1) as f32);

    let vertices = (0..side)
        .cartesian_product(0..side)
        .map(|(row, col)| {
            let x = -1.0 + col as f32 * step;
            let y = 1.0 - row as f32 * step;
            let z = 0.5 * (1.0 - x * x - y * y);
            let uv = Vec2::new((x + 1.0) / 2.0, (1.0 - y) / 2.0);

            let color = texture
                .and_then(|t| t.sample(uv))
                .map(|c| Color::rgb(c.r * 255.0, c.g * 255.0, c.b * 255.0))
                .unwrap_or_else(|| Color::rgb(uv.x * 255.0, 96.0, uv.y * 255.0));

            ShadedVertex::new(
                // closer to the viewer means smaller depth
                Vec3::new(uv.x * max_x, uv.y * max_y, 1.0 - z),
                Vec3::new(x, y, z),
                Vec3::new(x, y, 1.0).normalize(),
                color,
            )
        })
        .collect();

    let indices = (0..resolution)
        .cartesian_product(0..resolution)
        .flat_map(|(row, col)| {
            let i = row * side + col;
            [i, i + 1, i + side, i + 1, i + side + 1, i + side]
        })
        .collect();

    Mesh { vertices, indices }
}
