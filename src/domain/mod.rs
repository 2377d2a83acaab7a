/// Pure game rules: entities, particles, masks and effect timers.
/// Nothing here touches the terminal, audio or the clock.

pub mod collision;
pub mod effects;
pub mod entity;
pub mod mask;
pub mod obstacle;
pub mod particle;

/// Logical screen size in pixels.
pub const SCREEN_W: f32 = 800.0;
pub const SCREEN_H: f32 = 400.0;
/// Y of the ground line; entities rest with their bottom edge on it.
pub const GROUND_Y: f32 = 300.0;
/// Logical tick rate the physics constants are tuned against.
pub const TICKS_PER_SECOND: u32 = 60;
