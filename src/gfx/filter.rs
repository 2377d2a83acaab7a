/// One-shot sprite preprocessing, run once per sprite before the loop starts.
///
/// Each filter takes a decoded RGBA image and returns a new one; alpha is
/// always carried through untouched. The per-tick path never calls into
/// this module.

use image::imageops::{self, FilterType};
use image::RgbaImage;
use serde::Deserialize;

use super::color::Rgba;
use super::sprite::Sprite;

/// Named preprocessing effect with its numeric parameter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Effect {
    #[default]
    None,
    /// Raise the HSV value channel by `amount`, saturating at 255.
    Brighten { amount: u8 },
    /// Sinusoidal remap with the given displacement in pixels.
    Wave { intensity: f32 },
}

/// Apply `effect`, then scale to exactly `width` × `height`.
pub fn preprocess(img: &RgbaImage, effect: Effect, width: u32, height: u32) -> Sprite {
    let filtered = match effect {
        Effect::None => img.clone(),
        Effect::Brighten { amount } => brighten(img, amount),
        Effect::Wave { intensity } => wave_distort(img, intensity),
    };
    let scaled = if filtered.dimensions() == (width, height) {
        filtered
    } else {
        imageops::resize(&filtered, width, height, FilterType::Triangle)
    };
    to_sprite(&scaled)
}

/// Value boost in HSV space. Hue and saturation are unchanged, so the
/// channels scale together by `v' / v`; a pure black pixel becomes grey.
pub fn brighten(img: &RgbaImage, amount: u8) -> RgbaImage {
    let mut out = img.clone();
    for px in out.pixels_mut() {
        let [r, g, b, a] = px.0;
        let v = r.max(g).max(b);
        let boosted = v.saturating_add(amount);
        px.0 = if v == 0 {
            [boosted, boosted, boosted, a]
        } else {
            let k = boosted as f32 / v as f32;
            let scale = |c: u8| (c as f32 * k).round().min(255.0) as u8;
            [scale(r), scale(g), scale(b), a]
        };
    }
    out
}

/// Wave remap: destination (x, y) samples the source at
/// `(x + sin(y / 10) * k, y + sin(x / 10) * k)` with bilinear filtering
/// and mirrored borders.
pub fn wave_distort(img: &RgbaImage, intensity: f32) -> RgbaImage {
    let (w, h) = img.dimensions();
    RgbaImage::from_fn(w, h, |x, y| {
        let sx = x as f32 + (y as f32 / 10.0).sin() * intensity;
        let sy = y as f32 + (x as f32 / 10.0).sin() * intensity;
        image::Rgba(sample_bilinear(img, sx, sy))
    })
}

fn sample_bilinear(img: &RgbaImage, fx: f32, fy: f32) -> [u8; 4] {
    let (w, h) = img.dimensions();
    let x0 = fx.floor();
    let y0 = fy.floor();
    let tx = fx - x0;
    let ty = fy - y0;
    let (x0, y0) = (x0 as i64, y0 as i64);

    let at = |x: i64, y: i64| img.get_pixel(reflect(x, w), reflect(y, h)).0;
    let p00 = at(x0, y0);
    let p10 = at(x0 + 1, y0);
    let p01 = at(x0, y0 + 1);
    let p11 = at(x0 + 1, y0 + 1);

    let mut out = [0u8; 4];
    for c in 0..4 {
        let top = p00[c] as f32 * (1.0 - tx) + p10[c] as f32 * tx;
        let bot = p01[c] as f32 * (1.0 - tx) + p11[c] as f32 * tx;
        out[c] = (top * (1.0 - ty) + bot * ty).round().clamp(0.0, 255.0) as u8;
    }
    out
}

/// Mirror an out-of-range index back into `0..n` (`fedcba|abcdef|fedcba`).
fn reflect(i: i64, n: u32) -> u32 {
    let n = n as i64;
    if n <= 1 {
        return 0;
    }
    let p = i.rem_euclid(2 * n);
    (if p >= n { 2 * n - 1 - p } else { p }) as u32
}

pub fn to_sprite(img: &RgbaImage) -> Sprite {
    let (w, h) = img.dimensions();
    let pixels = img
        .pixels()
        .map(|p| Rgba::new(p.0[0], p.0[1], p.0[2], p.0[3]))
        .collect();
    // Dimensions come from the image itself, so the length always matches.
    Sprite::from_pixels(w, h, pixels).unwrap_or_else(|| Sprite::filled(w, h, Rgba::TRANSPARENT))
}
