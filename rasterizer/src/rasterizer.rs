mod barycentric;
mod bounding_box;
mod color;
mod config;
mod framebuffer;
mod interpolate;
mod lighting;

pub use barycentric::{Barycentric, EdgeFunctions};
pub use bounding_box::BoundingBox;
pub use color::Color;
pub use config::RasterConfig;
pub use framebuffer::{Framebuffer, ScreenTarget};
pub use interpolate::Interpolate;
pub use lighting::{vertex_intensity, Light, LightingMode, Material};

use std::ops::{AddAssign, RangeInclusive};

use shaded_raster_macros::Interpolate;

use itertools::Itertools;
use rayon::prelude::*;

use crate::math_prelude::*;

/// A vertex after projection.
///
/// `screen.xy()` is the pixel position and `screen.z` the depth; `position`
/// and `normal` stay in world space for lighting.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ShadedVertex {
    pub screen: Vec3,
    pub position: Vec3,
    pub normal: Vec3,
    pub color: Color,
}

impl ShadedVertex {
    pub fn new(screen: Vec3, position: Vec3, normal: Vec3, color: Color) -> Self {
        Self {
            screen,
            position,
            normal,
            color,
        }
    }
}

/// A covered pixel, ready to be handed to a [`ScreenTarget`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Fragment {
    pub x: i32,
    pub y: i32,
    pub depth: f32,
    pub color: Color,
    // interpolated world position
    pub position: Vec3,
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct DrawStats {
    pub fragments: usize,
    pub rows: usize,
}

impl AddAssign for DrawStats {
    fn add_assign(&mut self, rhs: DrawStats) {
        self.fragments += rhs.fragments;
        self.rows += rhs.rows;
    }
}

// Per-vertex values blended across the triangle
#[derive(Debug, Copy, Clone, Interpolate)]
struct Varyings {
    color: Color,
    intensity: f32,
    position: Vec3,
    depth: f32,
}

/// Borrowed view of three caller-owned vertices and the lights shining on them.
#[derive(Debug, Copy, Clone)]
pub struct RenderTriangle<'a> {
    vertices: [&'a ShadedVertex; 3],
    lights: &'a [Light],
}

impl<'a> RenderTriangle<'a> {
    pub fn new(vertices: &'a [ShadedVertex; 3], lights: &'a [Light]) -> Self {
        Self::from_refs([&vertices[0], &vertices[1], &vertices[2]], lights)
    }

    pub fn from_refs(vertices: [&'a ShadedVertex; 3], lights: &'a [Light]) -> Self {
        Self { vertices, lights }
    }

    /// Triangle over three entries of a vertex buffer, `None` if an index is out of range.
    pub fn from_indices(
        buffer: &'a [ShadedVertex],
        indices: [usize; 3],
        lights: &'a [Light],
    ) -> Option<Self> {
        let [i0, i1, i2] = indices;
        Some(Self::from_refs(
            [buffer.get(i0)?, buffer.get(i1)?, buffer.get(i2)?],
            lights,
        ))
    }

    pub fn vertices(&self) -> [&'a ShadedVertex; 3] {
        self.vertices
    }

    pub fn lights(&self) -> &'a [Light] {
        self.lights
    }

    pub fn edge_functions(&self, epsilon: f32) -> EdgeFunctions {
        let [v0, v1, v2] = self.vertices;
        EdgeFunctions::new(v0.screen.xy(), v1.screen.xy(), v2.screen.xy(), epsilon)
    }

    /// Barycentric ratios of `point` using the default degeneracy tolerance.
    pub fn weight(&self, point: Vec2) -> Barycentric {
        self.edge_functions(RasterConfig::DEFAULT_DEGENERATE_EPSILON)
            .weights(point)
    }

    pub fn vertex_intensities(&self, config: &RasterConfig) -> [f32; 3] {
        self.vertices.map(|v| {
            vertex_intensity(
                v,
                self.lights,
                &config.material,
                config.eye,
                config.lighting,
            )
        })
    }

    /// Rasterizes the triangle into `target`.
    ///
    /// Degenerate triangles and triangles outside the target's bounds write
    /// nothing. Each pixel is written at most once per call.
    pub fn draw<T: ScreenTarget + ?Sized>(
        &self,
        target: &mut T,
        config: &RasterConfig,
    ) -> DrawStats {
        let edges = self.edge_functions(config.degenerate_epsilon);
        if edges.is_degenerate() {
            log::trace!("skipping degenerate triangle (det = {})", edges.det());
            return DrawStats::default();
        }

        let [v0, v1, v2] = self.vertices;
        let mut bounding_box =
            BoundingBox::from_points(v0.screen.xy(), v1.screen.xy(), v2.screen.xy());
        if let Some(bounds) = target.bounds() {
            match bounding_box.overlap(&bounds) {
                Some(clipped) => bounding_box = clipped,
                None => return DrawStats::default(),
            }
        }

        let intensities = self.vertex_intensities(config);
        let varyings = [0, 1, 2].map(|i| {
            let vertex = self.vertices[i];
            Varyings {
                color: vertex.color,
                intensity: intensities[i],
                position: vertex.position,
                depth: vertex.screen.z,
            }
        });

        let mut stats = DrawStats::default();
        if config.parallel_rows {
            let rows: Vec<Vec<Fragment>> = bounding_box
                .rows()
                .into_par_iter()
                .map(|y| {
                    let mut row = Vec::new();
                    scan_row(y, bounding_box.columns(), &edges, &varyings, |f| row.push(f));
                    row
                })
                .collect();
            for row in rows {
                stats.rows += 1;
                stats.fragments += row.len();
                row.iter().for_each(|f| target.set_fragment(f));
            }
        } else {
            for y in bounding_box.rows() {
                stats.rows += 1;
                scan_row(y, bounding_box.columns(), &edges, &varyings, |f| {
                    stats.fragments += 1;
                    target.set_fragment(&f);
                });
            }
        }
        stats
    }
}

// Walks one row left to right. A convex triangle covers a single run per row,
// so the scan stops at the first miss after a hit.
fn scan_row<F: FnMut(Fragment)>(
    y: i32,
    columns: RangeInclusive<i32>,
    edges: &EdgeFunctions,
    varyings: &[Varyings; 3],
    mut emit: F,
) {
    let mut inside = false;
    for x in columns {
        let weights = edges.weights(Vec2::new(x as f32, y as f32));
        if !weights.is_inside() {
            if inside {
                break;
            }
            continue;
        }
        inside = true;

        let [r0, r1, r2] = weights.ratios();
        let v = Varyings::interpolate(&varyings[0], &varyings[1], &varyings[2], r0, r1, r2);
        let intensity = v.intensity.max(0.0);
        emit(Fragment {
            x,
            y,
            depth: v.depth,
            color: v.color.map_rgb(|c| shade_channel(c, intensity)),
            position: v.position,
        });
    }
}

/// Scales a 0-255 channel by a light intensity, saturating at 255.
///
/// A channel strictly above `255 / intensity` becomes 255; at or below it is
/// multiplied. Zero or negative intensity yields black.
pub fn shade_channel(channel: f32, intensity: f32) -> f32 {
    if intensity <= 0.0 {
        0.0
    } else if channel > 255.0 / intensity {
        255.0
    } else {
        channel * intensity
    }
}

/// Rasterizes an indexed triangle list. Index triples that reach past the
/// vertex buffer are skipped, as are trailing indices that do not form a triple.
pub fn draw_indexed<T: ScreenTarget + ?Sized>(
    vertices: &[ShadedVertex],
    indices: &[usize],
    lights: &[Light],
    target: &mut T,
    config: &RasterConfig,
) -> DrawStats {
    let mut stats = DrawStats::default();
    for (i0, i1, i2) in indices.iter().copied().tuples() {
        match RenderTriangle::from_indices(vertices, [i0, i1, i2], lights) {
            Some(triangle) => stats += triangle.draw(target, config),
            None => log::warn!(
                "skipping triangle ({}, {}, {}): vertex buffer holds {} vertices",
                i0,
                i1,
                i2,
                vertices.len()
            ),
        }
    }
    if indices.len() % 3 != 0 {
        log::warn!("ignoring {} trailing indices", indices.len() % 3);
    }
    log::debug!(
        "drew {} triangles: {} fragments over {} rows",
        indices.len() / 3,
        stats.fragments,
        stats.rows
    );
    stats
}

/// Owns a framebuffer and the config used to draw into it.
pub struct Rasterizer {
    framebuffer: Framebuffer,
    config: RasterConfig,
    stats: DrawStats,
}

impl Rasterizer {
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_config(width, height, RasterConfig::default())
    }

    pub fn with_config(width: u32, height: u32, config: RasterConfig) -> Self {
        Self {
            framebuffer: Framebuffer::new(width, height),
            config,
            stats: DrawStats::default(),
        }
    }

    pub fn render_mesh(
        &mut self,
        vertices: &[ShadedVertex],
        indices: &[usize],
        lights: &[Light],
    ) -> DrawStats {
        let stats = draw_indexed(vertices, indices, lights, &mut self.framebuffer, &self.config);
        self.stats += stats;
        stats
    }

    pub fn width(&self) -> u32 {
        self.framebuffer.width()
    }

    pub fn height(&self) -> u32 {
        self.framebuffer.height()
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    pub fn config(&self) -> &RasterConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut RasterConfig {
        &mut self.config
    }

    /// Totals since the last clear.
    pub fn stats(&self) -> &DrawStats {
        &self.stats
    }

    pub fn clear(&mut self) {
        self.clear_color(Color::default())
    }

    pub fn clear_color(&mut self, color: Color) {
        self.framebuffer.clear_color(color);
        self.stats = DrawStats::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const RED: Color = Color::rgb(255.0, 0.0, 0.0);

    #[derive(Default)]
    struct RecordingTarget {
        writes: Vec<(i32, i32, f32, Color)>,
    }

    impl RecordingTarget {
        fn by_pixel(&self) -> HashMap<(i32, i32), (f32, Color)> {
            self.writes
                .iter()
                .map(|(x, y, d, c)| ((*x, *y), (*d, *c)))
                .collect()
        }
    }

    impl ScreenTarget for RecordingTarget {
        fn set_pixel(&mut self, x: i32, y: i32, depth: f32, color: &Color) {
            self.writes.push((x, y, depth, *color));
        }
    }

    fn vertex(x: f32, y: f32, z: f32, color: Color) -> ShadedVertex {
        ShadedVertex::new(Vec3::new(x, y, z), Vec3::new(x, y, z), Vec3::Z, color)
    }

    fn unit_light() -> [Light; 1] {
        [Light::new(Vec3::new(0.0, 0.0, 10.0), 1.0, 0.0, 0.0)]
    }

    #[test]
    fn solid_right_triangle_covers_expected_pixels() {
        let vertices = [
            vertex(0.0, 0.0, 0.0, RED),
            vertex(4.0, 0.0, 0.0, RED),
            vertex(0.0, 4.0, 0.0, RED),
        ];
        let lights = unit_light();
        let mut target = RecordingTarget::default();
        let stats =
            RenderTriangle::new(&vertices, &lights).draw(&mut target, &RasterConfig::default());

        let expected: Vec<(i32, i32)> = (0..=4)
            .flat_map(|y| (0..=4 - y).map(move |x| (x, y)))
            .collect();
        assert_eq!(target.writes.len(), expected.len());
        assert_eq!(stats.fragments, expected.len());
        assert_eq!(stats.rows, 5);

        let pixels = target.by_pixel();
        for p in expected {
            let (depth, color) = pixels[&p];
            assert_eq!(depth, 0.0);
            assert_eq!(color, RED);
        }
    }

    #[test]
    fn depth_is_linear_in_screen_space() {
        let vertices = [
            vertex(0.0, 0.0, 0.0, RED),
            vertex(3.0, 0.0, 1.0, RED),
            vertex(0.0, 3.0, 2.0, RED),
        ];
        let lights = unit_light();
        let triangle = RenderTriangle::new(&vertices, &lights);
        let mut target = RecordingTarget::default();
        triangle.draw(&mut target, &RasterConfig::default());

        let ratios = triangle.weight(Vec2::new(1.0, 1.0)).ratios();
        for r in ratios {
            assert!((r - 1.0 / 3.0).abs() < 1e-5);
        }
        let (depth, _) = target.by_pixel()[&(1, 1)];
        assert!((depth - 1.0).abs() < 1e-5);
    }

    #[test]
    fn channel_scaling_saturates_above_the_threshold() {
        // 200 > 255 / 2, 100 <= 255 / 2
        assert_eq!(shade_channel(200.0, 2.0), 255.0);
        assert_eq!(shade_channel(100.0, 2.0), 200.0);
        // exactly at the threshold is multiplied, not clamped
        assert_eq!(shade_channel(127.5, 2.0), 255.0);
        assert_eq!(shade_channel(255.0, 1.0), 255.0);
        assert_eq!(shade_channel(80.0, 0.5), 40.0);
        assert_eq!(shade_channel(80.0, 0.0), 0.0);
        assert_eq!(shade_channel(80.0, -1.0), 0.0);
    }

    #[test]
    fn degenerate_triangle_writes_nothing() {
        let vertices = [
            vertex(0.0, 0.0, 0.0, RED),
            vertex(2.0, 2.0, 0.0, RED),
            vertex(4.0, 4.0, 0.0, RED),
        ];
        let lights = unit_light();
        let mut target = RecordingTarget::default();
        let stats =
            RenderTriangle::new(&vertices, &lights).draw(&mut target, &RasterConfig::default());
        assert!(target.writes.is_empty());
        assert_eq!(stats, DrawStats::default());
    }

    #[test]
    fn winding_does_not_change_coverage() {
        let a = vertex(1.0, 1.0, 0.0, RED);
        let b = vertex(9.0, 2.0, 0.0, RED);
        let c = vertex(4.0, 8.0, 0.0, RED);
        let lights = unit_light();
        let config = RasterConfig::default();

        let mut ccw = RecordingTarget::default();
        RenderTriangle::from_refs([&a, &b, &c], &lights).draw(&mut ccw, &config);
        let mut cw = RecordingTarget::default();
        RenderTriangle::from_refs([&a, &c, &b], &lights).draw(&mut cw, &config);

        let mut ccw_pixels: Vec<_> = ccw.writes.iter().map(|w| (w.0, w.1)).collect();
        let mut cw_pixels: Vec<_> = cw.writes.iter().map(|w| (w.0, w.1)).collect();
        ccw_pixels.sort();
        cw_pixels.sort();
        assert!(!ccw_pixels.is_empty());
        assert_eq!(ccw_pixels, cw_pixels);
    }

    #[test]
    fn every_pixel_is_written_once() {
        let vertices = [
            vertex(0.5, 0.5, 0.0, RED),
            vertex(30.2, 4.0, 0.0, RED),
            vertex(12.0, 25.7, 0.0, RED),
        ];
        let lights = unit_light();
        let mut target = RecordingTarget::default();
        RenderTriangle::new(&vertices, &lights).draw(&mut target, &RasterConfig::default());
        assert_eq!(target.by_pixel().len(), target.writes.len());
    }

    #[test]
    fn half_intensity_darkens_color() {
        let color = Color::rgb(200.0, 100.0, 50.0);
        let vertices = [
            vertex(0.0, 0.0, 0.0, color),
            vertex(4.0, 0.0, 0.0, color),
            vertex(0.0, 4.0, 0.0, color),
        ];
        let lights = [Light::ambient_only(0.5)];
        let mut target = RecordingTarget::default();
        RenderTriangle::new(&vertices, &lights).draw(&mut target, &RasterConfig::default());
        let (_, c) = target.by_pixel()[&(0, 0)];
        assert_eq!(c, Color::rgb(100.0, 50.0, 25.0));
    }

    #[test]
    fn negative_intensity_clamps_to_black_but_keeps_alpha() {
        let vertices = [
            vertex(0.0, 0.0, 0.0, RED),
            vertex(4.0, 0.0, 0.0, RED),
            vertex(0.0, 4.0, 0.0, RED),
        ];
        // light sits behind the surface, diffuse goes negative
        let lights = [Light::new(Vec3::new(0.0, 0.0, -50.0), 0.0, 1.0, 0.0)];
        let mut target = RecordingTarget::default();
        RenderTriangle::new(&vertices, &lights).draw(&mut target, &RasterConfig::default());
        assert!(!target.writes.is_empty());
        for (_, _, _, c) in target.writes {
            assert_eq!(c, Color::new(0.0, 0.0, 0.0, 255.0));
        }
    }

    #[test]
    fn parallel_rows_match_serial_scan() {
        let vertices = [
            ShadedVertex::new(
                Vec3::new(3.0, 2.0, 0.1),
                Vec3::new(-1.0, 1.0, -2.0),
                Vec3::new(0.0, 0.6, 0.8),
                Color::rgb(255.0, 40.0, 0.0),
            ),
            ShadedVertex::new(
                Vec3::new(61.0, 17.0, 0.5),
                Vec3::new(1.0, 1.0, -2.5),
                Vec3::Z,
                Color::rgb(0.0, 255.0, 90.0),
            ),
            ShadedVertex::new(
                Vec3::new(20.0, 55.0, 0.9),
                Vec3::new(0.0, -1.0, -3.0),
                Vec3::new(0.6, 0.0, 0.8),
                Color::rgb(10.0, 10.0, 255.0),
            ),
        ];
        let lights = [
            Light::new(Vec3::new(2.0, 3.0, 1.0), 0.2, 0.7, 0.4),
            Light::new(Vec3::new(-4.0, 0.0, 2.0), 0.1, 0.5, 0.2),
        ];
        let triangle = RenderTriangle::new(&vertices, &lights);

        let mut serial = RecordingTarget::default();
        let serial_stats = triangle.draw(&mut serial, &RasterConfig::default());
        let mut parallel = RecordingTarget::default();
        let parallel_stats =
            triangle.draw(&mut parallel, &RasterConfig::default().with_parallel_rows(true));

        assert_eq!(serial_stats, parallel_stats);
        assert_eq!(serial.writes, parallel.writes);
    }

    #[test]
    fn clipping_to_target_bounds_keeps_on_screen_pixels() {
        let vertices = [
            vertex(-5.0, -5.0, 0.2, RED),
            vertex(12.0, -2.0, 0.4, RED),
            vertex(3.0, 14.0, 0.6, RED),
        ];
        let lights = unit_light();
        let triangle = RenderTriangle::new(&vertices, &lights);
        let config = RasterConfig::default();

        let mut unclipped = RecordingTarget::default();
        triangle.draw(&mut unclipped, &config);
        let mut fb = Framebuffer::new(8, 8);
        triangle.draw(&mut fb, &config);

        let on_screen: Vec<_> = unclipped
            .writes
            .iter()
            .filter(|(x, y, _, _)| (0..8).contains(x) && (0..8).contains(y))
            .collect();
        assert!(!on_screen.is_empty());
        for (x, y, depth, color) in &on_screen {
            assert_eq!(fb.get_color(*x as u32, *y as u32), Some(color));
            assert_eq!(fb.get_depth(*x as u32, *y as u32), Some(depth));
        }
        let written = fb.depth().filter(|(_, _, d)| **d != f32::MAX).count();
        assert_eq!(written, on_screen.len());
    }

    #[test]
    fn triangle_outside_target_is_skipped() {
        let vertices = [
            vertex(20.0, 20.0, 0.0, RED),
            vertex(30.0, 20.0, 0.0, RED),
            vertex(20.0, 30.0, 0.0, RED),
        ];
        let lights = unit_light();
        let mut fb = Framebuffer::new(8, 8);
        let stats = RenderTriangle::new(&vertices, &lights).draw(&mut fb, &RasterConfig::default());
        assert_eq!(stats, DrawStats::default());
    }

    #[test]
    fn from_indices_rejects_out_of_range() {
        let vertices = [vertex(0.0, 0.0, 0.0, RED), vertex(1.0, 0.0, 0.0, RED)];
        assert!(RenderTriangle::from_indices(&vertices, [0, 1, 2], &[]).is_none());
        assert!(RenderTriangle::from_indices(&vertices, [0, 1, 1], &[]).is_some());
    }

    #[test]
    fn indexed_draw_skips_bad_triangles() {
        let vertices = [
            vertex(0.0, 0.0, 0.0, RED),
            vertex(4.0, 0.0, 0.0, RED),
            vertex(0.0, 4.0, 0.0, RED),
            vertex(4.0, 4.0, 0.0, RED),
        ];
        let lights = unit_light();
        let mut target = RecordingTarget::default();
        let indices = [0, 1, 2, 1, 9, 2, 0, 1];
        let stats = draw_indexed(
            &vertices,
            &indices,
            &lights,
            &mut target,
            &RasterConfig::default(),
        );
        assert_eq!(stats.fragments, 15);
        assert_eq!(target.writes.len(), 15);
    }

    #[test]
    fn rasterizer_accumulates_stats_until_clear() {
        let vertices = [
            vertex(0.0, 0.0, 0.5, RED),
            vertex(4.0, 0.0, 0.5, RED),
            vertex(0.0, 4.0, 0.5, RED),
            vertex(4.0, 4.0, 0.5, RED),
        ];
        let lights = unit_light();
        let mut rasterizer = Rasterizer::new(8, 8);
        rasterizer.render_mesh(&vertices, &[0, 1, 2], &lights);
        rasterizer.render_mesh(&vertices, &[1, 3, 2], &lights);
        assert_eq!(rasterizer.stats().fragments, 30);
        assert_eq!(rasterizer.framebuffer().get_color(4, 4), Some(&RED));

        rasterizer.clear();
        assert_eq!(rasterizer.stats(), &DrawStats::default());
        assert_eq!(rasterizer.framebuffer().get_color(4, 4), Some(&Color::default()));
    }
}
