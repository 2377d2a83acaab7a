/// RGBA color and the few color-space helpers the effects need.

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);
    #[cfg(test)]
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Rgba { r, g, b, a }
    }

    /// Fully opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Rgba { r, g, b, a: 255 }
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Rgba { a, ..self }
    }

    /// Scale alpha by `factor` in 0.0..=1.0.
    pub fn fade(self, factor: f32) -> Self {
        let a = (self.a as f32 * factor.clamp(0.0, 1.0)).round() as u8;
        self.with_alpha(a)
    }

    /// Source-over blend of `src` onto `self`. Result keeps `self`'s alpha
    /// when the destination is opaque (the canvas always is).
    #[inline]
    pub fn blend(self, src: Rgba) -> Rgba {
        match src.a {
            0 => self,
            255 => src,
            alpha => {
                let alpha = alpha as u16;
                Rgba {
                    r: blend_channel(src.r, self.r, alpha),
                    g: blend_channel(src.g, self.g, alpha),
                    b: blend_channel(src.b, self.b, alpha),
                    a: self.a.max(src.a),
                }
            }
        }
    }

    /// Linear interpolation towards `other` by `t` in 0.0..=1.0 (alpha untouched).
    pub fn mix(self, other: Rgba, t: f32) -> Rgba {
        let t = t.clamp(0.0, 1.0);
        let lerp = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgba {
            r: lerp(self.r, other.r),
            g: lerp(self.g, other.g),
            b: lerp(self.b, other.b),
            a: self.a,
        }
    }
}

/// x * alpha + y * (255 - alpha), divided by 255 with the usual
/// `(v + 1 + (v >> 8)) >> 8` approximation.
#[inline]
fn blend_channel(src: u8, dst: u8, alpha: u16) -> u8 {
    let v = src as u16 * alpha + dst as u16 * (255 - alpha);
    ((v + 1 + (v >> 8)) >> 8) as u8
}

/// HSV → opaque RGB. `h` in degrees (any value, wrapped), `s`/`v` in 0.0..=1.0.
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Rgba {
    let h = h.rem_euclid(360.0);
    let s = s.clamp(0.0, 1.0);
    let v = v.clamp(0.0, 1.0);
    let c = v * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;
    let (r, g, b) = match (h / 60.0) as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let to_u8 = |f: f32| ((f + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    Rgba::rgb(to_u8(r), to_u8(g), to_u8(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_extremes() {
        let dst = Rgba::rgb(10, 20, 30);
        assert_eq!(dst.blend(Rgba::TRANSPARENT), dst);
        assert_eq!(dst.blend(Rgba::rgb(200, 100, 50)), Rgba::rgb(200, 100, 50));
    }

    #[test]
    fn blend_half_alpha_is_midpoint() {
        let out = Rgba::rgb(0, 0, 0).blend(Rgba::new(255, 255, 255, 128));
        assert!((127..=129).contains(&out.r));
        assert_eq!(out.a, 255);
    }

    #[test]
    fn hsv_primaries() {
        assert_eq!(hsv_to_rgb(0.0, 1.0, 1.0), Rgba::rgb(255, 0, 0));
        assert_eq!(hsv_to_rgb(120.0, 1.0, 1.0), Rgba::rgb(0, 255, 0));
        assert_eq!(hsv_to_rgb(240.0, 1.0, 1.0), Rgba::rgb(0, 0, 255));
        // wraps
        assert_eq!(hsv_to_rgb(360.0, 1.0, 1.0), Rgba::rgb(255, 0, 0));
        // zero saturation is grey
        assert_eq!(hsv_to_rgb(77.0, 0.0, 1.0), Rgba::WHITE);
    }

    #[test]
    fn fade_scales_alpha() {
        assert_eq!(Rgba::rgb(1, 2, 3).fade(0.0).a, 0);
        assert_eq!(Rgba::rgb(1, 2, 3).fade(1.0).a, 255);
        assert_eq!(Rgba::new(1, 2, 3, 100).fade(0.5).a, 50);
    }
}
