/// The step function: advances the world by one tick.
///
/// Processing order per phase:
///   Playing
///     1. Jump request
///     2. Physics (player → obstacles), scaled by `time_scale`
///     3. Collision against each obstacle
///     4. Dust particles
///   SlowMotion
///     1. Countdown only; entities stay frozen where they were hit
///   GameOver
///     1. Explosion debris
///     2. Shake / hue timers
///
/// Transitions fire their side effects (events, explosion) exactly once:
/// each `enter_*` is a no-op unless the world is in the phase it leaves.

use rand::Rng;

use super::event::GameEvent;
use super::world::{Phase, WorldState, SLOW_MOTION_TICKS, TIME_SCALE_FROZEN};
use crate::domain::collision;
use crate::domain::entity::{Entity, Step};

/// Input observed for one tick. Restart and quit are handled by the
/// frame driver at the tick boundary and never reach the step function.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameInput {
    pub jump: bool,
}

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut WorldState, input: FrameInput, rng: &mut impl Rng) -> Vec<GameEvent> {
    let mut events = Vec::new();
    world.tick += 1;

    match world.phase {
        Phase::Playing => step_playing(world, input, rng, &mut events),
        Phase::SlowMotion => step_slow_motion(world, rng, &mut events),
        Phase::GameOver => step_game_over(world, rng),
    }

    events
}

// ══════════════════════════════════════════════════════════════
// Playing
// ══════════════════════════════════════════════════════════════

fn step_playing(
    world: &mut WorldState,
    input: FrameInput,
    rng: &mut impl Rng,
    events: &mut Vec<GameEvent>,
) {
    if input.jump && world.player.jump() {
        events.push(GameEvent::Jumped);
    }

    let scale = world.time_scale;
    if world.player.advance(scale, rng) == Step::Landed {
        events.push(GameEvent::Landed);
    }
    for obstacle in &mut world.obstacles {
        if obstacle.advance(scale, rng) == Step::Passed {
            world.score += 1;
            events.push(GameEvent::Scored { score: world.score });
        }
    }

    if world.obstacles.iter().any(|o| collision::overlaps(&world.player, o)) {
        enter_slow_motion(world, events);
    }

    world.player.dust.update();
}

fn enter_slow_motion(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    if world.phase != Phase::Playing {
        return;
    }
    world.phase = Phase::SlowMotion;
    world.time_scale = TIME_SCALE_FROZEN;
    world.slowmo_ticks = 0;
    world.player.take_hit();
    events.push(GameEvent::Hit);
    log::info!("hit at tick {} with score {}", world.tick, world.score);
}

// ══════════════════════════════════════════════════════════════
// SlowMotion
// ══════════════════════════════════════════════════════════════

fn step_slow_motion(world: &mut WorldState, rng: &mut impl Rng, events: &mut Vec<GameEvent>) {
    world.slowmo_ticks += 1;
    if world.slowmo_ticks >= SLOW_MOTION_TICKS {
        enter_game_over(world, rng, events);
    }
}

fn enter_game_over(world: &mut WorldState, rng: &mut impl Rng, events: &mut Vec<GameEvent>) {
    if world.phase != Phase::SlowMotion {
        return;
    }
    world.phase = Phase::GameOver;
    let (x, y) = world.player.center();
    world.explosion.clear();
    world.explosion.spawn_explosion(x, y, rng);
    world.effects = Default::default();
    events.push(GameEvent::GameOver { x, y, score: world.score });
    log::info!("game over, final score {}", world.score);
}

// ══════════════════════════════════════════════════════════════
// GameOver
// ══════════════════════════════════════════════════════════════

fn step_game_over(world: &mut WorldState, rng: &mut impl Rng) {
    world.explosion.update();
    world.effects.advance(rng);
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
