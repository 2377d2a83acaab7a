/// Pixel-accurate hit test between two entities.
///
/// The offset between the two top-left corners is truncated to whole
/// pixels, then the opaque bits of both masks are intersected. Swapping
/// the arguments negates the offset and gives the same answer.

use super::entity::Entity;
use super::mask::CollisionMask;

pub fn overlaps(a: &impl Entity, b: &impl Entity) -> bool {
    masks_overlap(a.mask(), a.position(), b.mask(), b.position())
}

/// Mask-level form of [`overlaps`], for callers holding raw positions.
pub fn masks_overlap(
    a: &CollisionMask,
    a_pos: (f32, f32),
    b: &CollisionMask,
    b_pos: (f32, f32),
) -> bool {
    let dx = (b_pos.0 - a_pos.0) as i32;
    let dy = (b_pos.1 - a_pos.1) as i32;
    a.overlaps_at(b, dx, dy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::{test_sprites, Player};
    use crate::domain::obstacle::Obstacle;
    use crate::gfx::{Rgba, Sprite};
    use proptest::prelude::*;

    fn arb_mask() -> impl Strategy<Value = CollisionMask> {
        (1u32..12, 1u32..12).prop_flat_map(|(w, h)| {
            proptest::collection::vec(any::<bool>(), (w * h) as usize).prop_map(move |bits| {
                let px = bits
                    .into_iter()
                    .map(|on| if on { Rgba::BLACK } else { Rgba::TRANSPARENT })
                    .collect();
                let sprite = Sprite::from_pixels(w, h, px).unwrap();
                CollisionMask::from_sprite(&sprite)
            })
        })
    }

    /// Straightforward reference: compare every pair of opaque pixels.
    fn brute_force(a: &CollisionMask, b: &CollisionMask, dx: i32, dy: i32) -> bool {
        for ay in 0..a.height() {
            for ax in 0..a.width() {
                if !a.get(ax, ay) {
                    continue;
                }
                let bx = ax as i32 - dx;
                let by = ay as i32 - dy;
                if bx >= 0 && by >= 0 && b.get(bx as u32, by as u32) {
                    return true;
                }
            }
        }
        false
    }

    proptest! {
        #[test]
        fn overlap_is_symmetric(
            a in arb_mask(),
            b in arb_mask(),
            ax in -20.0f32..20.0, ay in -20.0f32..20.0,
            bx in -20.0f32..20.0, by in -20.0f32..20.0,
        ) {
            prop_assert_eq!(
                masks_overlap(&a, (ax, ay), &b, (bx, by)),
                masks_overlap(&b, (bx, by), &a, (ax, ay))
            );
        }

        #[test]
        fn overlap_matches_brute_force(
            a in arb_mask(),
            b in arb_mask(),
            dx in -14i32..14, dy in -14i32..14,
        ) {
            prop_assert_eq!(a.overlaps_at(&b, dx, dy), brute_force(&a, &b, dx, dy));
        }
    }

    #[test]
    fn player_and_cactus_far_apart_do_not_collide() {
        let sprites = test_sprites();
        let p = Player::new(sprites.player.clone());
        let [cactus, bird] = Obstacle::spawn_pair(&sprites);
        assert!(!overlaps(&p, &cactus));
        assert!(!overlaps(&p, &bird));
    }

    #[test]
    fn player_and_cactus_touching_collide() {
        let sprites = test_sprites();
        let p = Player::new(sprites.player.clone());
        let [mut cactus, _] = Obstacle::spawn_pair(&sprites);
        let (_, cy) = cactus.position();
        cactus.set_position(p.x + 59.0, cy);
        assert!(overlaps(&p, &cactus));
        assert!(overlaps(&cactus, &p));
        cactus.set_position(p.x + 60.0, cy);
        assert!(!overlaps(&p, &cactus));
    }

    #[test]
    fn fractional_offsets_truncate() {
        let a = CollisionMask::from_sprite(&Sprite::filled(2, 1, Rgba::BLACK));
        // 1.9 px to the right truncates to 1: still sharing column 1
        assert!(masks_overlap(&a, (0.0, 0.0), &a, (1.9, 0.0)));
        assert!(!masks_overlap(&a, (0.0, 0.0), &a, (2.0, 0.0)));
    }
}
