/// Short-lived point sprites.
///
/// Two producers share one particle type:
///   - **Dust**: kicked up when the player lands. Grows and drifts
///     straight down while it fades over a fixed timer.
///   - **Debris**: the game-over explosion. Flies out radially; speed
///     and size shrink by a per-particle decay factor, so a burst thins
///     out unevenly.
///
/// Opacity is always `life / max_life`. A particle is dropped from its
/// collection on the first update that leaves it with `life <= 0` or
/// `size <= 0`, and is never drawn after that.

use std::f32::consts::TAU;

use rand::Rng;

use crate::gfx::Rgba;

// ── Dust ──

pub const DUST_PER_LANDING: usize = 5;
pub const DUST_RADIUS: f32 = 3.0;
pub const DUST_TICKS: i32 = 20;
pub const DUST_GROWTH: f32 = 0.15;
pub const DUST_DRIFT: f32 = 0.5;
pub const DUST_JITTER: f32 = 10.0;
pub const DUST_COLOR: Rgba = Rgba::rgb(120, 120, 120);

// ── Debris ──

pub const DEBRIS_COUNT: usize = 40;
const DEBRIS_SIZE: (f32, f32) = (3.0, 8.0);
const DEBRIS_LIFE: (i32, i32) = (30, 60);
const DEBRIS_SPEED: (f32, f32) = (2.0, 8.0);
const DEBRIS_DECAY: (f32, f32) = (0.90, 0.98);
pub const DEBRIS_PALETTE: [Rgba; 4] = [
    Rgba::rgb(255, 80, 0),
    Rgba::rgb(255, 160, 0),
    Rgba::rgb(255, 220, 60),
    Rgba::rgb(220, 40, 20),
];

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Motion {
    /// Straight down at a fixed rate; size grows.
    Drift,
    /// Along `angle` at `speed`; speed and size shrink by `decay` per tick.
    Radial { angle: f32, speed: f32, decay: f32 },
}

#[derive(Clone, PartialEq, Debug)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    /// Radius for dust, edge length for debris.
    pub size: f32,
    pub life: i32,
    pub max_life: i32,
    pub color: Rgba,
    pub motion: Motion,
}

impl Particle {
    pub fn dust(x: f32, y: f32) -> Self {
        Particle {
            x,
            y,
            size: DUST_RADIUS,
            life: DUST_TICKS,
            max_life: DUST_TICKS,
            color: DUST_COLOR,
            motion: Motion::Drift,
        }
    }

    pub fn debris(x: f32, y: f32, rng: &mut impl Rng) -> Self {
        let life = rng.random_range(DEBRIS_LIFE.0..DEBRIS_LIFE.1);
        Particle {
            x,
            y,
            size: rng.random_range(DEBRIS_SIZE.0..DEBRIS_SIZE.1),
            life,
            max_life: life,
            color: DEBRIS_PALETTE[rng.random_range(0..DEBRIS_PALETTE.len())],
            motion: Motion::Radial {
                angle: rng.random_range(0.0..TAU),
                speed: rng.random_range(DEBRIS_SPEED.0..DEBRIS_SPEED.1),
                decay: rng.random_range(DEBRIS_DECAY.0..DEBRIS_DECAY.1),
            },
        }
    }

    /// Advance one tick.
    pub fn update(&mut self) {
        match &mut self.motion {
            Motion::Drift => {
                self.size += DUST_GROWTH;
                self.y += DUST_DRIFT;
            }
            Motion::Radial { angle, speed, decay } => {
                self.x += angle.cos() * *speed;
                self.y += angle.sin() * *speed;
                *speed *= *decay;
                self.size *= *decay;
            }
        }
        self.life -= 1;
    }

    pub fn is_alive(&self) -> bool {
        self.life > 0 && self.size > 0.0
    }

    /// 0.0 (gone) ..= 1.0 (fresh).
    pub fn opacity(&self) -> f32 {
        if self.max_life <= 0 {
            return 0.0;
        }
        (self.life as f32 / self.max_life as f32).clamp(0.0, 1.0)
    }

    /// Color with the lifetime-derived opacity applied.
    pub fn shaded(&self) -> Rgba {
        self.color.fade(self.opacity())
    }
}

/// A particle collection owned by exactly one producer.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct Particles {
    items: Vec<Particle>,
}

impl Particles {
    pub fn new() -> Self {
        Particles { items: Vec::new() }
    }

    #[cfg(test)]
    pub fn push(&mut self, p: Particle) {
        self.items.push(p);
    }

    /// Dust puff at a point on the ground (the player's base).
    pub fn spawn_dust(&mut self, x: f32, y: f32, rng: &mut impl Rng) {
        for _ in 0..DUST_PER_LANDING {
            let jitter = rng.random_range(-DUST_JITTER..DUST_JITTER);
            self.items.push(Particle::dust(x + jitter, y));
        }
    }

    /// Radial burst centered on (x, y).
    pub fn spawn_explosion(&mut self, x: f32, y: f32, rng: &mut impl Rng) {
        self.items.reserve(DEBRIS_COUNT);
        for _ in 0..DEBRIS_COUNT {
            self.items.push(Particle::debris(x, y, rng));
        }
    }

    /// Advance every particle, then drop the expired ones.
    pub fn update(&mut self) {
        for p in &mut self.items {
            p.update();
        }
        self.items.retain(Particle::is_alive);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.items.iter()
    }
}
