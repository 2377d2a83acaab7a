/// Obstacles: a tagged variant over the two kinds.
///
///   - **Ground**: cactus on the ground line. Constant speed; when it is
///     fully off the left edge it is recycled to the right with a random
///     gap and reports `Step::Passed` (one point).
///   - **Flying**: bird in an altitude band. Two-frame wing animation on
///     a fixed tick interval (not scaled by time-scale); rebuilds its mask
///     on every frame change. Recycled with a random gap and altitude.
///     Never scores.

use std::rc::Rc;

use rand::Rng;

use super::entity::{Entity, SpriteSet, Step};
use super::mask::CollisionMask;
use super::{GROUND_Y, SCREEN_W};
use crate::gfx::Sprite;

pub const GROUND_SPEED: f32 = 8.0;
/// Re-spawn gap to the right of the screen edge, `[min, max)`.
pub const GROUND_GAP: (f32, f32) = (200.0, 600.0);

pub const FLYING_SPEED: f32 = 7.0;
pub const FLYING_SPAWN_X: f32 = SCREEN_W + 700.0;
pub const FLYING_SPAWN_Y: f32 = 170.0;
pub const FLYING_GAP: (f32, f32) = (400.0, 900.0);
/// Altitude band for the top edge, inclusive.
pub const FLYING_BAND: (f32, f32) = (140.0, 200.0);
/// Ticks between wing frames.
pub const FLAP_TICKS: u32 = 10;

#[derive(Clone, PartialEq, Debug)]
pub struct GroundObstacle {
    pub x: f32,
    pub y: f32,
    pub speed: f32,
    sprite: Rc<Sprite>,
    mask: CollisionMask,
}

impl GroundObstacle {
    pub fn new(sprite: Rc<Sprite>) -> Self {
        let mask = CollisionMask::from_sprite(&sprite);
        GroundObstacle {
            x: SCREEN_W,
            y: GROUND_Y - sprite.height() as f32,
            speed: GROUND_SPEED,
            sprite,
            mask,
        }
    }

    fn advance(&mut self, time_scale: f32, rng: &mut impl Rng) -> Step {
        self.x -= self.speed * time_scale;
        if self.x < -(self.sprite.width() as f32) {
            self.x = SCREEN_W + rng.random_range(GROUND_GAP.0..GROUND_GAP.1);
            return Step::Passed;
        }
        Step::Moved
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct FlyingObstacle {
    pub x: f32,
    pub y: f32,
    pub speed: f32,
    pub frame: usize,
    pub anim_ticks: u32,
    frames: [Rc<Sprite>; 2],
    mask: CollisionMask,
}

impl FlyingObstacle {
    pub fn new(frames: [Rc<Sprite>; 2]) -> Self {
        let mask = CollisionMask::from_sprite(&frames[0]);
        FlyingObstacle {
            x: FLYING_SPAWN_X,
            y: FLYING_SPAWN_Y,
            speed: FLYING_SPEED,
            frame: 0,
            anim_ticks: 0,
            frames,
            mask,
        }
    }

    fn advance(&mut self, time_scale: f32, rng: &mut impl Rng) -> Step {
        self.x -= self.speed * time_scale;

        self.anim_ticks += 1;
        if self.anim_ticks >= FLAP_TICKS {
            self.anim_ticks = 0;
            self.frame = (self.frame + 1) % self.frames.len();
            self.mask = CollisionMask::from_sprite(&self.frames[self.frame]);
        }

        if self.x < -(self.sprite().width() as f32) {
            self.x = SCREEN_W + rng.random_range(FLYING_GAP.0..FLYING_GAP.1);
            self.y = rng.random_range(FLYING_BAND.0..=FLYING_BAND.1);
        }
        Step::Moved
    }
}

#[derive(Clone, PartialEq, Debug)]
pub enum Obstacle {
    Ground(GroundObstacle),
    Flying(FlyingObstacle),
}

impl Obstacle {
    /// The fixed pair every run starts with.
    pub fn spawn_pair(sprites: &SpriteSet) -> [Obstacle; 2] {
        [
            Obstacle::Ground(GroundObstacle::new(Rc::clone(&sprites.cactus))),
            Obstacle::Flying(FlyingObstacle::new(sprites.bird.clone())),
        ]
    }

    #[cfg(test)]
    pub fn set_position(&mut self, x: f32, y: f32) {
        match self {
            Obstacle::Ground(g) => {
                g.x = x;
                g.y = y;
            }
            Obstacle::Flying(f) => {
                f.x = x;
                f.y = y;
            }
        }
    }
}

impl Entity for Obstacle {
    fn advance(&mut self, time_scale: f32, rng: &mut impl Rng) -> Step {
        match self {
            Obstacle::Ground(g) => g.advance(time_scale, rng),
            Obstacle::Flying(f) => f.advance(time_scale, rng),
        }
    }

    fn mask(&self) -> &CollisionMask {
        match self {
            Obstacle::Ground(g) => &g.mask,
            Obstacle::Flying(f) => &f.mask,
        }
    }

    fn position(&self) -> (f32, f32) {
        match self {
            Obstacle::Ground(g) => (g.x, g.y),
            Obstacle::Flying(f) => (f.x, f.y),
        }
    }

    fn sprite(&self) -> &Sprite {
        match self {
            Obstacle::Ground(g) => &g.sprite,
            Obstacle::Flying(f) => f.sprite(),
        }
    }
}

impl FlyingObstacle {
    fn sprite(&self) -> &Sprite {
        &self.frames[self.frame]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::{test_sprites, CACTUS_SIZE};
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn ground_spawns_at_right_edge_on_ground_line() {
        let [ground, _] = Obstacle::spawn_pair(&test_sprites());
        assert!(matches!(ground, Obstacle::Ground(_)));
        assert_eq!(ground.position(), (SCREEN_W, GROUND_Y - CACTUS_SIZE.1 as f32));
    }

    #[test]
    fn ground_moves_at_scaled_speed() {
        let mut rng = Pcg32::seed_from_u64(0);
        let mut g = GroundObstacle::new(test_sprites().cactus);
        g.advance(0.5, &mut rng);
        assert_eq!(g.x, SCREEN_W - GROUND_SPEED * 0.5);
    }

    #[test]
    fn flying_never_reports_passed() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut o = Obstacle::spawn_pair(&test_sprites())[1].clone();
        let mut recycled = 0;
        let mut last_x = o.position().0;
        for _ in 0..2000 {
            assert_eq!(o.advance(1.075, &mut rng), Step::Moved);
            let (x, y) = o.position();
            if x > last_x {
                recycled += 1;
                assert!(x >= SCREEN_W + FLYING_GAP.0 && x < SCREEN_W + FLYING_GAP.1);
                assert!(y >= FLYING_BAND.0 && y <= FLYING_BAND.1);
            }
            last_x = x;
        }
        assert!(recycled > 0);
    }

    #[test]
    fn flap_is_tick_based_and_rebuilds_mask() {
        let mut rng = Pcg32::seed_from_u64(6);
        let sprites = test_sprites();
        let mut f = FlyingObstacle::new(sprites.bird.clone());
        let mask0 = f.mask.clone();
        // time-scale does not stretch the animation
        for _ in 0..FLAP_TICKS - 1 {
            f.advance(0.01, &mut rng);
        }
        assert_eq!(f.frame, 0);
        f.advance(0.01, &mut rng);
        assert_eq!(f.frame, 1);
        assert_ne!(f.mask, mask0);
        assert_eq!(f.mask, CollisionMask::from_sprite(&sprites.bird[1]));
        for _ in 0..FLAP_TICKS {
            f.advance(0.01, &mut rng);
        }
        assert_eq!(f.frame, 0);
        assert_eq!(f.mask, mask0);
    }

    proptest! {
        #[test]
        fn ground_recycles_once_per_crossing_into_gap(seed in any::<u64>(), scale in 0.5f32..2.0) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut g = GroundObstacle::new(test_sprites().cactus);
            let w = CACTUS_SIZE.0 as f32;
            let mut passes = 0;
            let mut crossings = 0;
            for _ in 0..1500 {
                let before = g.x;
                let step = g.advance(scale, &mut rng);
                if before - g.speed * scale < -w {
                    crossings += 1;
                    prop_assert_eq!(step, Step::Passed);
                    prop_assert!(g.x >= SCREEN_W + GROUND_GAP.0 && g.x < SCREEN_W + GROUND_GAP.1);
                }
                if step == Step::Passed {
                    passes += 1;
                }
            }
            prop_assert!(crossings > 0);
            prop_assert_eq!(passes, crossings);
        }
    }
}
