/// WorldState: everything that a Reset throws away.
///
/// ## Phases
///
///   Playing ──hit──▶ SlowMotion ──30 ticks──▶ GameOver ──restart──▶ Playing
///
/// The world exclusively owns the player (and its dust), both obstacles,
/// the explosion debris and the effect timers. Nothing outlives a reset:
/// `reset()` replaces the whole struct with a freshly spawned one.
///
/// Sprites and the RNG are not part of the world. Sprites are immutable
/// and shared; the RNG is injected into `step()` by the caller.

use crate::domain::effects::EffectState;
use crate::domain::entity::{Player, SpriteSet};
use crate::domain::obstacle::Obstacle;
use crate::domain::particle::Particles;

/// Physics multiplier while playing. Tuned against the fixed 60 Hz tick.
pub const TIME_SCALE_NORMAL: f32 = 1.075;
/// While the hit lingers, nothing moves.
pub const TIME_SCALE_FROZEN: f32 = 0.0;
/// Length of the post-hit beat before the game-over screen.
pub const SLOW_MOTION_TICKS: u32 = 30;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Playing,
    SlowMotion,
    GameOver,
}

#[derive(Clone, PartialEq, Debug)]
pub struct WorldState {
    pub phase: Phase,
    pub score: u32,
    /// Multiplier applied to every physics update this tick.
    pub time_scale: f32,
    /// Ticks spent in SlowMotion so far.
    pub slowmo_ticks: u32,
    /// Ticks since spawn/reset.
    pub tick: u64,

    pub player: Player,
    pub obstacles: [Obstacle; 2],
    /// Game-over debris; empty outside GameOver.
    pub explosion: Particles,
    /// Shake / hue timers; only advanced during GameOver.
    pub effects: EffectState,
}

impl WorldState {
    pub fn new(sprites: &SpriteSet) -> Self {
        WorldState {
            phase: Phase::Playing,
            score: 0,
            time_scale: TIME_SCALE_NORMAL,
            slowmo_ticks: 0,
            tick: 0,
            player: Player::new(sprites.player.clone()),
            obstacles: Obstacle::spawn_pair(sprites),
            explosion: Particles::new(),
            effects: EffectState::default(),
        }
    }

    /// Back to a fresh run, atomically.
    pub fn reset(&mut self, sprites: &SpriteSet) {
        *self = WorldState::new(sprites);
    }

    /// SlowMotion progress, 0.0 at the hit → 1.0 at game over.
    pub fn slowmo_progress(&self) -> f32 {
        (self.slowmo_ticks as f32 / SLOW_MOTION_TICKS as f32).clamp(0.0, 1.0)
    }
}
