use std::io::Write;

/// Plain-text (P3) PPM image built from RGBA bytes. Alpha is dropped.
pub struct PpmImage {
    width: u32,
    height: u32,
    pixels: Vec<[u8; 3]>,
}

impl PpmImage {
    pub fn from_rgba(width: u32, height: u32, rgba: &[u8]) -> Self {
        let pixels = rgba
            .chunks_exact(4)
            .take(width as usize * height as usize)
            .map(|p| [p[0], p[1], p[2]])
            .collect();
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

    pub fn write_to<W: Write>(&self, mut w: W) -> std::io::Result<()> {
        write!(w, "P3\n{} {}\n255\n", self.width, self.height)?;
        if self.width == 0 {
            return Ok(());
        }
        for row in self.pixels.chunks(self.width as usize) {
            let line = row
                .iter()
                .map(|[r, g, b]| format!("{} {} {}", r, g, b))
                .collect::<Vec<_>>()
                .join(" ");
            writeln!(w, "{}", line)?;
        }
        w.flush()
    }
}
