use crate::math_prelude::*;

use super::ShadedVertex;

/// Point light with separate ambient, diffuse and specular strengths.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Light {
    pub position: Vec3,
    pub ambient: f32,
    pub diffuse: f32,
    pub specular: f32,
}

impl Light {
    pub fn new(position: Vec3, ambient: f32, diffuse: f32, specular: f32) -> Self {
        Self {
            position,
            ambient,
            diffuse,
            specular,
        }
    }

    /// A light that only contributes its ambient term.
    pub fn ambient_only(ambient: f32) -> Self {
        Self::new(Vec3::ZERO, ambient, 0.0, 0.0)
    }
}

/// Surface reflectance shared by every triangle drawn with a given config.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Material {
    pub ambient: f32,
    pub diffuse: f32,
    pub specular: f32,
    pub brilliance: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient: 1.0,
            diffuse: 1.0,
            specular: 1.0,
            brilliance: 8.0,
        }
    }
}

/// How the terms of several lights combine.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum LightingMode {
    /// Every light adds its ambient, diffuse and specular terms.
    #[default]
    Accumulate,
    /// Each light replaces the previous one's terms; only the last light counts.
    LastLightOnly,
}

/// Scalar light intensity at a vertex.
///
/// The result multiplies all color channels uniformly. Diffuse may go
/// negative for surfaces facing away from a light; the rasterizer clamps the
/// interpolated value, not this one.
pub fn vertex_intensity(
    vertex: &ShadedVertex,
    lights: &[Light],
    material: &Material,
    eye: Vec3,
    mode: LightingMode,
) -> f32 {
    let mut ambient = 0.0;
    let mut diffuse = 0.0;
    let mut specular = 0.0;

    for light in lights {
        let to_light = (light.position - vertex.position).normalize_or_zero();
        let n_dot_l = to_light.dot(vertex.normal);

        let eye_to_pixel = vertex.position - eye;
        let reflection = 2.0 * vertex.normal.dot(to_light) * vertex.normal - to_light;
        let highlight = reflection.dot(eye_to_pixel).max(0.0);

        let a = light.ambient * material.ambient;
        let d = light.diffuse * material.diffuse * n_dot_l;
        let s = light.specular * material.specular * highlight.powf(material.brilliance);

        match mode {
            LightingMode::Accumulate => {
                ambient += a;
                diffuse += d;
                specular += s;
            }
            LightingMode::LastLightOnly => {
                ambient = a;
                diffuse = d;
                specular = s;
            }
        }
    }

    ambient + diffuse + specular
}
