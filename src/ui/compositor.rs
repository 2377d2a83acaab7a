/// Layered render pass: turns a `WorldState` into a finished canvas.
///
/// Back to front:
///   1. Background fill + ground line
///   2. Entities (player with shadow, then obstacles)
///   3. Particles (landing dust, explosion debris)
///   4. Full-screen overlay: hit flash (SlowMotion) or color cycle (GameOver)
///   5. Text: score, game-over message; both translated by the shake offset
///   6. Vignette, every frame, in every phase
///
/// The compositor never mutates the world. Shake and hue come from the
/// world's `EffectState`, which the step function advances.

use crate::domain::entity::Entity;
use crate::domain::particle::{Motion, Particle};
use crate::domain::{GROUND_Y, SCREEN_H, SCREEN_W};
use crate::gfx::color::hsv_to_rgb;
use crate::gfx::font::{draw_text, text_height, text_width};
use crate::gfx::{Canvas, Rgba};
use crate::sim::world::{Phase, WorldState};

// ── Palette ──

const BACKGROUND: Rgba = Rgba::rgb(240, 240, 240);
const GROUND_LINE: Rgba = Rgba::rgb(83, 83, 83);
const SCORE_COLOR: Rgba = Rgba::rgb(0, 0, 0);
const MESSAGE_COLOR: Rgba = Rgba::rgb(200, 0, 0);

// ── Overlays ──

/// Peak alpha of the red hit flash, reached at the end of SlowMotion.
const HIT_FLASH_ALPHA: f32 = 120.0;
const HIT_FLASH: Rgba = Rgba::rgb(255, 0, 0);
const CYCLE_SATURATION: f32 = 0.35;
const CYCLE_ALPHA: u8 = 48;

/// Darkening starts at this fraction of the half-diagonal.
const VIGNETTE_START: f32 = 0.55;
const VIGNETTE_MAX_ALPHA: f32 = 150.0;

// ── Text ──

const SCORE_POS: (i32, i32) = (10, 10);
const SCORE_SCALE: i32 = 3;
const MESSAGE_SCALE: i32 = 3;
pub const GAME_OVER_MESSAGE: &str = "Game Over - Press R to Restart";

pub struct Compositor {
    canvas: Canvas,
    /// Per-pixel black alpha, computed once.
    vignette: Vec<u8>,
}

impl Compositor {
    pub fn new() -> Self {
        let (w, h) = (SCREEN_W as usize, SCREEN_H as usize);
        Compositor {
            canvas: Canvas::new(w, h),
            vignette: vignette_map(w, h),
        }
    }

    pub fn compose(&mut self, world: &WorldState) -> &Canvas {
        let canvas = &mut self.canvas;

        // 1. Background
        canvas.clear(BACKGROUND);
        canvas.fill_rect(0, GROUND_Y as i32, SCREEN_W as i32, 2, GROUND_LINE);

        // 2. Entities
        world.player.render(canvas);
        for obstacle in &world.obstacles {
            obstacle.render(canvas);
        }

        // 3. Particles
        for p in world.player.dust.iter().chain(world.explosion.iter()) {
            draw_particle(canvas, p);
        }

        // 4. Overlay
        match world.phase {
            Phase::Playing => {}
            Phase::SlowMotion => {
                let a = (HIT_FLASH_ALPHA * world.slowmo_progress()).round() as u8;
                canvas.overlay(HIT_FLASH.with_alpha(a));
            }
            Phase::GameOver => {
                let tint = hsv_to_rgb(world.effects.hue, CYCLE_SATURATION, 1.0);
                canvas.overlay(tint.with_alpha(CYCLE_ALPHA));
            }
        }

        // 5. Text
        let (sx, sy) = world.effects.shake;
        let score = format!("Score: {}", world.score);
        draw_text(canvas, SCORE_POS.0 + sx, SCORE_POS.1 + sy, &score, SCORE_SCALE, SCORE_COLOR);
        if world.phase == Phase::GameOver {
            let (mx, my) = message_origin();
            draw_text(canvas, mx + sx, my + sy, GAME_OVER_MESSAGE, MESSAGE_SCALE, MESSAGE_COLOR);
        }

        // 6. Vignette
        canvas.darken(&self.vignette);

        &self.canvas
    }

    /// A plain black frame, shown once when a run is restarted.
    pub fn blackout(&mut self) -> &Canvas {
        self.canvas.clear(Rgba::BLACK);
        &self.canvas
    }
}

/// Horizontally centered, top edge on the screen's midline.
fn message_origin() -> (i32, i32) {
    let w = text_width(GAME_OVER_MESSAGE, MESSAGE_SCALE);
    let x = SCREEN_W as i32 / 2 - w / 2;
    let y = SCREEN_H as i32 / 2;
    debug_assert!(y + text_height(MESSAGE_SCALE) < SCREEN_H as i32);
    (x, y)
}

fn draw_particle(canvas: &mut Canvas, p: &Particle) {
    let color = p.shaded();
    match p.motion {
        Motion::Drift => canvas.fill_circle(p.x, p.y, p.size, color),
        Motion::Radial { .. } => {
            let s = p.size.max(1.0) as i32;
            canvas.fill_rect(p.x as i32 - s / 2, p.y as i32 - s / 2, s, s, color);
        }
    }
}

/// Black alpha per pixel: zero inside `VIGNETTE_START` of the half-diagonal,
/// then easing quadratically up to `VIGNETTE_MAX_ALPHA` at the corners.
fn vignette_map(w: usize, h: usize) -> Vec<u8> {
    let (cx, cy) = (w as f32 / 2.0, h as f32 / 2.0);
    let half_diag = (cx * cx + cy * cy).sqrt();
    let mut map = Vec::with_capacity(w * h);
    for y in 0..h {
        for x in 0..w {
            let dx = x as f32 + 0.5 - cx;
            let dy = y as f32 + 0.5 - cy;
            let d = (dx * dx + dy * dy).sqrt() / half_diag;
            let t = ((d - VIGNETTE_START) / (1.0 - VIGNETTE_START)).clamp(0.0, 1.0);
            map.push((VIGNETTE_MAX_ALPHA * t * t).round() as u8);
        }
    }
    map
}
