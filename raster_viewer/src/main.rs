pub mod ppm;
pub mod scene;

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::info;

use ppm::PpmImage;
use shaded_raster::math_prelude::*;
use shaded_raster::{ImageBuffer, Light, LightingMode, RasterConfig, Rasterizer};

/// Renders a lit, Gouraud-shaded dome with the software rasterizer and writes
/// the frame as a PPM image.
#[derive(Parser, Debug)]
#[command(name = "raster_viewer", version)]
struct Args {
    #[arg(long, default_value_t = 640)]
    width: u32,

    #[arg(long, default_value_t = 480)]
    height: u32,

    /// Where to write the rendered frame
    #[arg(short, long, default_value = "output.ppm")]
    output: PathBuf,

    /// Quads per side of the dome mesh
    #[arg(long, default_value_t = 24)]
    resolution: usize,

    /// Image whose samples color the mesh vertices
    #[arg(short, long)]
    texture: Option<PathBuf>,

    /// Write the loaded texture back out as PPM
    #[arg(long, requires = "texture")]
    texture_output: Option<PathBuf>,

    /// Light position as `x,y,z`; repeat for several lights
    #[arg(long = "light", value_parser = parse_vec3)]
    lights: Vec<Vec3>,

    #[arg(long, default_value_t = 0.2)]
    ambient: f32,

    #[arg(long, default_value_t = 0.8)]
    diffuse: f32,

    #[arg(long, default_value_t = 0.3)]
    specular: f32,

    /// Let only the last light contribute
    #[arg(long)]
    last_light_only: bool,

    /// Scan triangle rows on all cores
    #[arg(long)]
    parallel: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn parse_vec3(s: &str) -> Result<Vec3> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<f32>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .with_context(|| format!("invalid vector '{}'", s))?;
    match parts.as_slice() {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        _ => bail!("expected three comma separated numbers, got '{}'", s),
    }
}

fn write_ppm(path: &Path, image: &PpmImage) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    image
        .write_to(BufWriter::new(file))
        .with_context(|| format!("writing {}", path.display()))
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp_millis()
        .init();

    let texture = match &args.texture {
        Some(path) => {
            let texture = ImageBuffer::load(path)
                .with_context(|| format!("loading texture {}", path.display()))?;
            info!(
                "texture {} is {}x{}",
                path.display(),
                texture.width(),
                texture.height()
            );
            Some(texture)
        }
        None => None,
    };

    if let (Some(texture), Some(path)) = (&texture, &args.texture_output) {
        let image =
            PpmImage::from_rgba(texture.width(), texture.height(), &texture.to_rgba_bytes());
        write_ppm(path, &image)?;
        info!("wrote texture copy to {}", path.display());
    }

    let positions = if args.lights.is_empty() {
        vec![Vec3::new(-1.5, 1.5, 2.0)]
    } else {
        args.lights.clone()
    };
    let lights: Vec<Light> = positions
        .into_iter()
        .map(|p| Light::new(p, args.ambient, args.diffuse, args.specular))
        .collect();

    let lighting = if args.last_light_only {
        LightingMode::LastLightOnly
    } else {
        LightingMode::Accumulate
    };
    let config = RasterConfig::default()
        .with_lighting(lighting)
        .with_parallel_rows(args.parallel);

    let mesh = scene::dome(args.resolution, args.width, args.height, texture.as_ref());
    let mut rasterizer = Rasterizer::with_config(args.width, args.height, config);

    let start = std::time::Instant::now();
    let stats = rasterizer.render_mesh(&mesh.vertices, &mesh.indices, &lights);
    info!(
        "rasterized {} triangles into {} fragments in {:?}",
        mesh.indices.len() / 3,
        stats.fragments,
        start.elapsed()
    );

    let framebuffer = rasterizer.framebuffer();
    let image = PpmImage::from_rgba(
        framebuffer.width(),
        framebuffer.height(),
        &framebuffer.to_rgba8(),
    );
    write_ppm(&args.output, &image)?;
    info!(
        "wrote {}x{} frame to {}",
        image.width(),
        image.height(),
        args.output.display()
    );

    Ok(())
}
