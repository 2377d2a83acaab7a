/// Frame canvas: an opaque RGBA buffer at the logical screen resolution.
///
/// Every draw call is clipped to the canvas; callers pass signed pixel
/// coordinates and never check bounds themselves. Alpha in the source
/// color is honored with source-over blending.

use super::color::Rgba;
use super::sprite::Sprite;

pub struct Canvas {
    width: usize,
    height: usize,
    pixels: Vec<Rgba>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Canvas {
            width,
            height,
            pixels: vec![Rgba::BLACK; width * height],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Rgba {
        self.pixels[y * self.width + x]
    }

    pub fn clear(&mut self, color: Rgba) {
        self.pixels.fill(color.with_alpha(255));
    }

    #[inline]
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: Rgba) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let idx = y as usize * self.width + x as usize;
        self.pixels[idx] = self.pixels[idx].blend(color);
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Rgba) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + w).min(self.width as i32);
        let y1 = (y + h).min(self.height as i32);
        for py in y0..y1 {
            for px in x0..x1 {
                self.blend_pixel(px, py, color);
            }
        }
    }

    /// Filled disc; a pixel is covered when its center lies within `r`.
    pub fn fill_circle(&mut self, cx: f32, cy: f32, r: f32, color: Rgba) {
        if r <= 0.0 {
            return;
        }
        let r2 = r * r;
        let x0 = (cx - r).floor() as i32;
        let x1 = (cx + r).ceil() as i32;
        let y0 = (cy - r).floor() as i32;
        let y1 = (cy + r).ceil() as i32;
        for py in y0..=y1 {
            for px in x0..=x1 {
                let dx = px as f32 + 0.5 - cx;
                let dy = py as f32 + 0.5 - cy;
                if dx * dx + dy * dy <= r2 {
                    self.blend_pixel(px, py, color);
                }
            }
        }
    }

    /// Draw `sprite` with its top-left corner at (x, y).
    pub fn blit(&mut self, sprite: &Sprite, x: i32, y: i32) {
        self.blit_with(sprite, x, y, |c| c);
    }

    /// Draw `sprite` pulled towards `tint`'s RGB by `tint.a / 255`.
    pub fn blit_tinted(&mut self, sprite: &Sprite, x: i32, y: i32, tint: Rgba) {
        let t = tint.a as f32 / 255.0;
        self.blit_with(sprite, x, y, |c| c.mix(tint, t));
    }

    fn blit_with(&mut self, sprite: &Sprite, x: i32, y: i32, shade: impl Fn(Rgba) -> Rgba) {
        for sy in 0..sprite.height() {
            let py = y + sy as i32;
            if py < 0 || py as usize >= self.height {
                continue;
            }
            for sx in 0..sprite.width() {
                let src = sprite.pixel(sx, sy);
                if src.a == 0 {
                    continue;
                }
                self.blend_pixel(x + sx as i32, py, shade(src));
            }
        }
    }

    /// Blend one translucent color over the whole canvas.
    pub fn overlay(&mut self, color: Rgba) {
        if color.a == 0 {
            return;
        }
        for px in &mut self.pixels {
            *px = px.blend(color);
        }
    }

    /// Blend black using a per-pixel alpha map of the canvas' size.
    pub fn darken(&mut self, alpha: &[u8]) {
        for (px, &a) in self.pixels.iter_mut().zip(alpha) {
            if a > 0 {
                *px = px.blend(Rgba::BLACK.with_alpha(a));
            }
        }
    }
}
