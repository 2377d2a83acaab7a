/// Immutable RGBA image. Produced once at startup (from disk via the
/// filters, or from the bitmap font) and shared read-only afterwards.

use super::color::Rgba;

#[derive(Clone, PartialEq, Debug)]
pub struct Sprite {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl Sprite {
    /// Build from row-major pixels. Returns `None` if the length does not
    /// match `width * height`.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Rgba>) -> Option<Self> {
        if pixels.len() != (width as usize) * (height as usize) {
            return None;
        }
        Some(Sprite { width, height, pixels })
    }

    /// Uniformly colored rectangle.
    pub fn filled(width: u32, height: u32, color: Rgba) -> Self {
        Sprite {
            width,
            height,
            pixels: vec![color; width as usize * height as usize],
        }
    }

    /// Build from an ASCII picture: `'#'` is `color`, anything else is
    /// transparent. Rows shorter than the widest one are padded.
    #[cfg(test)]
    pub fn from_art(rows: &[&str], color: Rgba) -> Self {
        let height = rows.len() as u32;
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0) as u32;
        let mut pixels = vec![Rgba::TRANSPARENT; width as usize * height as usize];
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                if ch == '#' {
                    pixels[y * width as usize + x] = color;
                }
            }
        }
        Sprite { width, height, pixels }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        self.pixels[(y * self.width + x) as usize]
    }

    #[cfg(test)]
    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }
}
