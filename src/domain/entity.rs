/// Entities: the shared capability trait and the Player.
///
/// Every on-screen actor exposes the same four capabilities:
///   advance(time_scale) → one tick of motion
///   mask()              → current collision mask
///   bounds()            → integer top-left + size of the visible frame
///   render()            → draw the visible frame
///
/// Obstacles live in `obstacle.rs` as a tagged variant (Ground | Flying).

use std::rc::Rc;

use rand::Rng;

use super::mask::CollisionMask;
use super::particle::Particles;
use super::GROUND_Y;
use crate::gfx::{Canvas, Rgba, Sprite};

/// Target sprite sizes (the preprocessing pass scales to these).
pub const PLAYER_SIZE: (u32, u32) = (60, 60);
pub const CACTUS_SIZE: (u32, u32) = (40, 60);
pub const BIRD_SIZE: (u32, u32) = (46, 32);

pub const PLAYER_X: f32 = 50.0;
pub const GRAVITY: f32 = 1.0;
pub const JUMP_FORCE: f32 = -15.0;
/// Ticks the damage flag stays set (2 s).
pub const DAMAGE_TICKS: u32 = 2 * super::TICKS_PER_SECOND;

const SHADOW: Rgba = Rgba::new(0, 0, 0, 50);
const SHADOW_OFFSET: i32 = 5;
const DAMAGE_TINT: Rgba = Rgba::new(255, 40, 40, 140);

/// What happened to an entity during one `advance`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Step {
    Moved,
    /// Player touched down after being airborne.
    Landed,
    /// Obstacle left the screen and was recycled.
    Passed,
}

/// Integer placement of an entity's visible frame.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Bounds {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

pub trait Entity {
    fn advance(&mut self, time_scale: f32, rng: &mut impl Rng) -> Step;
    fn mask(&self) -> &CollisionMask;
    /// Real-valued top-left corner.
    fn position(&self) -> (f32, f32);
    fn sprite(&self) -> &Sprite;

    fn bounds(&self) -> Bounds {
        let (x, y) = self.position();
        let s = self.sprite();
        Bounds { x: x as i32, y: y as i32, w: s.width(), h: s.height() }
    }

    fn render(&self, canvas: &mut Canvas) {
        let b = self.bounds();
        canvas.blit(self.sprite(), b.x, b.y);
    }
}

/// Handles to the preprocessed sprites; cloned into entities on spawn.
#[derive(Clone, Debug)]
pub struct SpriteSet {
    pub player: Rc<Sprite>,
    pub cactus: Rc<Sprite>,
    pub bird: [Rc<Sprite>; 2],
}

// ══════════════════════════════════════════════════════════════
// Player
// ══════════════════════════════════════════════════════════════

#[derive(Clone, PartialEq, Debug)]
pub struct Player {
    pub x: f32,
    pub y: f32,
    pub vel_y: f32,
    pub gravity: f32,
    pub jump_force: f32,
    pub jumping: bool,
    pub damaged: bool,
    pub damage_ticks: u32,
    /// Landing dust; owned here, updated by the step function.
    pub dust: Particles,
    sprite: Rc<Sprite>,
    mask: CollisionMask,
}

impl Player {
    pub fn new(sprite: Rc<Sprite>) -> Self {
        // Single static frame: the mask is built once, here.
        let mask = CollisionMask::from_sprite(&sprite);
        let y = GROUND_Y - sprite.height() as f32;
        Player {
            x: PLAYER_X,
            y,
            vel_y: 0.0,
            gravity: GRAVITY,
            jump_force: JUMP_FORCE,
            jumping: false,
            damaged: false,
            damage_ticks: 0,
            dust: Particles::new(),
            sprite,
            mask,
        }
    }

    /// Highest `y` the player may have: feet on the ground line.
    pub fn ground_y(&self) -> f32 {
        GROUND_Y - self.sprite.height() as f32
    }

    #[cfg(test)]
    pub fn on_ground(&self) -> bool {
        !self.jumping && self.y >= self.ground_y()
    }

    /// Start a jump. Returns false (and changes nothing) while airborne.
    pub fn jump(&mut self) -> bool {
        if self.jumping {
            return false;
        }
        self.vel_y = self.jump_force;
        self.jumping = true;
        true
    }

    pub fn take_hit(&mut self) {
        self.damaged = true;
        self.damage_ticks = 0;
    }

    /// Bottom-center of the sprite, where dust is kicked up.
    fn base(&self) -> (f32, f32) {
        (self.x + self.sprite.width() as f32 / 2.0, self.y + self.sprite.height() as f32)
    }

    pub fn center(&self) -> (f32, f32) {
        (
            self.x + self.sprite.width() as f32 / 2.0,
            self.y + self.sprite.height() as f32 / 2.0,
        )
    }
}

impl Entity for Player {
    fn advance(&mut self, time_scale: f32, rng: &mut impl Rng) -> Step {
        if self.damaged {
            self.damage_ticks += 1;
            if self.damage_ticks >= DAMAGE_TICKS {
                self.damaged = false;
                self.damage_ticks = 0;
            }
        }

        self.vel_y += self.gravity * time_scale;
        self.y += self.vel_y * time_scale;

        let floor = self.ground_y();
        if self.y >= floor {
            self.y = floor;
            self.vel_y = 0.0;
            if self.jumping {
                self.jumping = false;
                let (bx, by) = self.base();
                self.dust.spawn_dust(bx, by, rng);
                return Step::Landed;
            }
        }
        Step::Moved
    }

    fn mask(&self) -> &CollisionMask {
        &self.mask
    }

    fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    fn sprite(&self) -> &Sprite {
        &self.sprite
    }

    fn render(&self, canvas: &mut Canvas) {
        let b = self.bounds();
        canvas.fill_rect(b.x + SHADOW_OFFSET, b.y + SHADOW_OFFSET, b.w as i32, b.h as i32, SHADOW);
        if self.damaged {
            canvas.blit_tinted(&self.sprite, b.x, b.y, DAMAGE_TINT);
        } else {
            canvas.blit(&self.sprite, b.x, b.y);
        }
    }
}

/// Plain sprites of the production sizes, for tests across the crate.
#[cfg(test)]
pub fn test_sprites() -> SpriteSet {
    let solid = |(w, h): (u32, u32)| Rc::new(Sprite::filled(w, h, Rgba::BLACK));
    // Wings up / wings down: different silhouettes so the mask changes.
    let (bw, bh) = BIRD_SIZE;
    let up = Sprite::from_pixels(
        bw,
        bh,
        (0..bw * bh)
            .map(|i| if i / bw < bh / 2 { Rgba::BLACK } else { Rgba::TRANSPARENT })
            .collect(),
    )
    .unwrap();
    let down = Sprite::from_pixels(
        bw,
        bh,
        (0..bw * bh)
            .map(|i| if i / bw >= bh / 2 { Rgba::BLACK } else { Rgba::TRANSPARENT })
            .collect(),
    )
    .unwrap();
    SpriteSet {
        player: solid(PLAYER_SIZE),
        cactus: solid(CACTUS_SIZE),
        bird: [Rc::new(up), Rc::new(down)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::particle::DUST_PER_LANDING;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const SCALE: f32 = 1.075;

    fn player() -> Player {
        Player::new(test_sprites().player)
    }

    #[test]
    fn spawns_on_the_ground() {
        let p = player();
        assert_eq!(p.y, GROUND_Y - PLAYER_SIZE.1 as f32);
        assert!(p.on_ground());
        assert_eq!(p.mask().count(), PLAYER_SIZE.0 * PLAYER_SIZE.1);
    }

    #[test]
    fn jump_is_rejected_while_airborne() {
        let mut p = player();
        assert!(p.jump());
        assert_eq!(p.vel_y, JUMP_FORCE);
        let mut rng = Pcg32::seed_from_u64(1);
        p.advance(SCALE, &mut rng);
        let vel = p.vel_y;
        assert!(!p.jump());
        assert_eq!(p.vel_y, vel);
    }

    #[test]
    fn full_jump_lands_once_with_five_dust() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut p = player();
        let floor = p.ground_y();
        p.jump();
        let mut landings = 0;
        let mut peak = floor;
        for _ in 0..120 {
            if p.advance(SCALE, &mut rng) == Step::Landed {
                landings += 1;
                assert!(!p.jumping);
                assert_eq!(p.dust.len(), DUST_PER_LANDING);
            }
            assert!(p.y <= floor);
            peak = peak.min(p.y);
        }
        assert_eq!(landings, 1);
        assert!(peak < floor - 80.0, "jump too low: peak {peak}");
        assert!(p.on_ground());
    }

    #[test]
    fn idle_player_stays_put_and_never_dusts() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut p = player();
        for _ in 0..30 {
            assert_eq!(p.advance(SCALE, &mut rng), Step::Moved);
        }
        assert_eq!(p.y, p.ground_y());
        assert!(p.dust.is_empty());
    }

    #[test]
    fn damage_clears_after_two_seconds() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut p = player();
        p.take_hit();
        for _ in 0..DAMAGE_TICKS - 1 {
            p.advance(SCALE, &mut rng);
            assert!(p.damaged);
            assert!(p.damage_ticks < DAMAGE_TICKS);
        }
        p.advance(SCALE, &mut rng);
        assert!(!p.damaged);
        assert_eq!(p.damage_ticks, 0);
    }

    #[test]
    fn bounds_truncate_position() {
        let mut p = player();
        p.x = 50.9;
        p.y = 12.2;
        assert_eq!(p.bounds(), Bounds { x: 50, y: 12, w: 60, h: 60 });
    }
}
