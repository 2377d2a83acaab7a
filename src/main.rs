/// Entry point and frame driver.

mod config;
mod domain;
mod gfx;
mod sim;
mod ui;

use std::fs::File;
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand_pcg::Pcg32;

use config::GameConfig;
use domain::entity::SpriteSet;
use domain::TICKS_PER_SECOND;
use sim::event::GameEvent;
use sim::step::{self, FrameInput};
use sim::world::{Phase, WorldState};
use ui::assets;
use ui::compositor::Compositor;
use ui::gamepad::GamepadState;
use ui::input::{InputEvent, InputState};
use ui::renderer::Renderer;
use ui::sound::SoundEngine;

const LOG_ENV: &str = "DINORUN_LOG";
const DEFAULT_LOG_PATH: &str = "dinorun.log";

fn main() {
    init_logging();
    let config = GameConfig::load();

    let sprites = match assets::load_sprites(&config.assets) {
        Ok(s) => s,
        Err(e) => {
            log::error!("{e}");
            eprintln!("dinorun: {e}");
            std::process::exit(1);
        }
    };

    let seed = config.general.seed.unwrap_or_else(rand::random);
    log::info!("rng seed {seed}");
    let mut session = Session::new(sprites, Pcg32::seed_from_u64(seed));

    let mut renderer = Renderer::new();

    if let Err(e) = renderer.init() {
        // Raw mode may already be on.
        let _ = renderer.cleanup();
        log::error!("terminal init failed: {e}");
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = if config.general.sound {
        SoundEngine::new()
    } else {
        None
    };

    let result = game_loop(&mut session, &mut renderer, sound.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        log::error!("game error: {e}");
        eprintln!("Game error: {e}");
    }

    println!("Final Score: {}", session.world.score);
}

/// Log to a file: the terminal belongs to the renderer.
fn init_logging() {
    let path = std::env::var(LOG_ENV).unwrap_or_else(|_| DEFAULT_LOG_PATH.into());
    match File::create(&path) {
        Ok(file) => {
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
                .target(env_logger::Target::Pipe(Box::new(file)))
                .init();
        }
        Err(e) => eprintln!("Warning: logging disabled, cannot open {path}: {e}"),
    }
}

// ══════════════════════════════════════════════════════════════
// Session: the per-process game context
// ══════════════════════════════════════════════════════════════

/// Everything one tick needs, constructed once and owned by the driver.
struct Session {
    sprites: SpriteSet,
    world: WorldState,
    rng: Pcg32,
}

/// What the driver should do after a tick.
#[derive(Debug, PartialEq)]
enum Tick {
    Quit,
    /// World was replaced; nothing was simulated this tick.
    Restarted,
    Stepped(Vec<GameEvent>),
}

impl Session {
    fn new(sprites: SpriteSet, rng: Pcg32) -> Self {
        let world = WorldState::new(&sprites);
        Session { sprites, world, rng }
    }

    /// One logical tick. Quit and restart are handled here, at the tick
    /// boundary; only the jump request reaches the state machine.
    fn tick(&mut self, inputs: &[InputEvent]) -> Tick {
        if inputs.contains(&InputEvent::Quit) {
            return Tick::Quit;
        }
        if self.world.phase == Phase::GameOver && inputs.contains(&InputEvent::Restart) {
            log::info!("restart after score {}", self.world.score);
            self.world.reset(&self.sprites);
            return Tick::Restarted;
        }
        let input = FrameInput {
            jump: inputs.contains(&InputEvent::Jump),
        };
        Tick::Stepped(step::step(&mut self.world, input, &mut self.rng))
    }
}

// ══════════════════════════════════════════════════════════════
// Frame driver
// ══════════════════════════════════════════════════════════════

fn game_loop(
    session: &mut Session,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    kb.honor_release = renderer.keyboard_enhanced();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    let mut compositor = Compositor::new();

    let tick_rate = tick_rate();
    let mut next_tick = Instant::now();

    loop {
        let mut inputs = kb.drain_events().to_vec();
        inputs.extend(gp.update());

        let frame = match session.tick(&inputs) {
            Tick::Quit => break,
            // One black frame between runs.
            Tick::Restarted => compositor.blackout(),
            Tick::Stepped(events) => {
                process_events(sound, &events);
                compositor.compose(&session.world)
            }
        };
        renderer.present(frame)?;

        // Wait for the next tick boundary; drop missed ticks instead of
        // bursting to catch up.
        next_tick += tick_rate;
        let now = Instant::now();
        if next_tick > now {
            std::thread::sleep(next_tick - now);
        } else {
            next_tick = now;
        }
    }

    Ok(())
}

/// Tick durations everywhere are counted at this fixed rate.
fn tick_rate() -> Duration {
    Duration::from_secs(1) / TICKS_PER_SECOND
}

fn process_events(sound: Option<&SoundEngine>, events: &[GameEvent]) {
    for event in events {
        match *event {
            GameEvent::Jumped => {
                if let Some(sfx) = sound {
                    sfx.play_jump();
                }
            }
            GameEvent::Hit => {
                if let Some(sfx) = sound {
                    sfx.play_hit();
                }
            }
            GameEvent::GameOver { x, y, score } => {
                log::debug!("explosion at ({x:.0}, {y:.0}), score {score}");
                if let Some(sfx) = sound {
                    sfx.play_game_over();
                }
            }
            GameEvent::Scored { score } => log::debug!("score {score}"),
            GameEvent::Landed => log::debug!("landed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::test_sprites;

    fn session() -> Session {
        Session::new(test_sprites(), Pcg32::seed_from_u64(77))
    }

    fn drive_to_game_over(s: &mut Session) {
        let (px, py) = (s.world.player.x, s.world.player.y);
        s.world.obstacles[0].set_position(px, py);
        while s.world.phase != Phase::GameOver {
            s.tick(&[]);
        }
    }

    #[test]
    fn quit_wins_over_everything() {
        let mut s = session();
        let tick = s.world.tick;
        assert_eq!(s.tick(&[InputEvent::Jump, InputEvent::Quit]), Tick::Quit);
        assert_eq!(s.world.tick, tick);
    }

    #[test]
    fn jump_reaches_the_state_machine() {
        let mut s = session();
        assert_eq!(s.tick(&[InputEvent::Jump]), Tick::Stepped(vec![GameEvent::Jumped]));
        assert!(s.world.player.jumping);
    }

    #[test]
    fn restart_is_ignored_while_playing() {
        let mut s = session();
        s.world.score = 3;
        assert!(matches!(s.tick(&[InputEvent::Restart]), Tick::Stepped(_)));
        assert_eq!(s.world.score, 3);
        assert_eq!(s.world.tick, 1);
    }

    #[test]
    fn restart_in_game_over_resets_without_stepping() {
        let mut s = session();
        drive_to_game_over(&mut s);
        s.tick(&[]);
        assert!(!s.world.explosion.is_empty());

        assert_eq!(s.tick(&[InputEvent::Restart]), Tick::Restarted);
        assert_eq!(s.world, WorldState::new(&s.sprites));

        // and the new run plays normally
        assert!(matches!(s.tick(&[]), Tick::Stepped(_)));
        assert_eq!(s.world.phase, Phase::Playing);
    }

    #[test]
    fn tick_rate_is_sixty_hertz() {
        assert_eq!(tick_rate().as_nanos(), 16_666_666);
    }

    #[test]
    fn repeated_restarts_stay_flat() {
        let mut s = session();
        for _ in 0..20 {
            drive_to_game_over(&mut s);
            assert_eq!(s.tick(&[InputEvent::Restart]), Tick::Restarted);
            assert_eq!(s.world.phase, Phase::Playing);
        }
    }
}
