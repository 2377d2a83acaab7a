/// Collision mask: one bit per pixel, set where the sprite is opaque.
///
/// Built from a sprite frame and never mutated afterwards; an entity that
/// changes frame builds a new mask instead.

use crate::gfx::Sprite;

/// Alpha strictly above this counts as opaque.
pub const ALPHA_THRESHOLD: u8 = 127;

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct CollisionMask {
    width: u32,
    height: u32,
    words_per_row: usize,
    bits: Vec<u64>,
}

impl CollisionMask {
    pub fn from_sprite(sprite: &Sprite) -> Self {
        let (w, h) = (sprite.width(), sprite.height());
        let mut mask = CollisionMask::empty(w, h);
        for y in 0..h {
            for x in 0..w {
                if sprite.pixel(x, y).a > ALPHA_THRESHOLD {
                    mask.set(x, y);
                }
            }
        }
        mask
    }

    pub fn empty(width: u32, height: u32) -> Self {
        let words_per_row = (width as usize).div_ceil(64);
        CollisionMask {
            width,
            height,
            words_per_row,
            bits: vec![0; words_per_row * height as usize],
        }
    }

    #[cfg(test)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[cfg(test)]
    pub fn height(&self) -> u32 {
        self.height
    }

    fn set(&mut self, x: u32, y: u32) {
        let idx = y as usize * self.words_per_row + (x as usize >> 6);
        self.bits[idx] |= 1u64 << (x & 63);
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let idx = y as usize * self.words_per_row + (x as usize >> 6);
        self.bits[idx] & (1u64 << (x & 63)) != 0
    }

    /// Number of opaque pixels.
    #[cfg(test)]
    pub fn count(&self) -> u32 {
        self.bits.iter().map(|w| w.count_ones()).sum()
    }

    /// Does `other`, placed with its top-left at (`dx`, `dy`) relative to
    /// this mask's top-left, share at least one opaque pixel with it?
    pub fn overlaps_at(&self, other: &CollisionMask, dx: i32, dy: i32) -> bool {
        let (dx, dy) = (dx as i64, dy as i64);
        let x0 = dx.max(0);
        let y0 = dy.max(0);
        let x1 = (dx + other.width as i64).min(self.width as i64);
        let y1 = (dy + other.height as i64).min(self.height as i64);
        if x0 >= x1 || y0 >= y1 {
            return false;
        }
        for y in y0..y1 {
            for x in x0..x1 {
                if self.get(x as u32, y as u32) && other.get((x - dx) as u32, (y - dy) as u32) {
                    return true;
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::Rgba;

    fn mask(rows: &[&str]) -> CollisionMask {
        CollisionMask::from_sprite(&Sprite::from_art(rows, Rgba::BLACK))
    }

    #[test]
    fn from_sprite_respects_alpha_threshold() {
        let px = vec![
            Rgba::new(0, 0, 0, 0),
            Rgba::new(0, 0, 0, 127),
            Rgba::new(0, 0, 0, 128),
            Rgba::new(0, 0, 0, 255),
        ];
        let s = Sprite::from_pixels(4, 1, px).unwrap();
        let m = CollisionMask::from_sprite(&s);
        assert!(!m.get(0, 0));
        assert!(!m.get(1, 0));
        assert!(m.get(2, 0));
        assert!(m.get(3, 0));
        assert_eq!(m.count(), 2);
    }

    #[test]
    fn wide_masks_span_several_words() {
        let row = "#".repeat(130);
        let m = mask(&[&row]);
        assert_eq!(m.count(), 130);
        assert!(m.get(64, 0));
        assert!(m.get(129, 0));
        assert!(!m.get(130, 0));
    }

    #[test]
    fn bounding_boxes_overlap_but_pixels_do_not() {
        // Two diagonal halves of a 3x3 square
        let a = mask(&["#..", "##.", "###"]);
        let b = mask(&[".##", "..#", "..."]);
        assert!(!a.overlaps_at(&b, 0, 0));
        assert!(a.overlaps_at(&b, -1, 1));
    }

    #[test]
    fn disjoint_rectangles_never_overlap() {
        let a = mask(&["##", "##"]);
        assert!(!a.overlaps_at(&a, 2, 0));
        assert!(!a.overlaps_at(&a, 0, -2));
        assert!(a.overlaps_at(&a, 1, 1));
        assert!(a.overlaps_at(&a, -1, -1));
    }
}
