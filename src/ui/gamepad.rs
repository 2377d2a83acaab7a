/// Gamepad actions via gilrs, reported as the same `InputEvent`s the
/// keyboard produces.
///
/// Default bindings (overridable in `[gamepad]` of config.toml):
///   A / B / D-pad up / left stick up  →  Jump
///   Start                             →  Restart
///   Select                            →  Quit
///
/// Every action is edge-triggered: holding a button fires once.

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use super::input::InputEvent;
use crate::config::GamepadConfig;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.5;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Btn {
    A,
    B,
    X,
    Y,
    L1,
    R1,
    Start,
    Select,
    Up,
    /// Left stick pushed past the deadzone. Not bindable by name.
    StickUp,
}

/// Config names, upper-cased, for each bindable button.
const NAMES: &[(&[&str], Btn)] = &[
    (&["A", "SOUTH"], Btn::A),
    (&["B", "EAST"], Btn::B),
    (&["X", "WEST"], Btn::X),
    (&["Y", "NORTH"], Btn::Y),
    (&["L1", "LB"], Btn::L1),
    (&["R1", "RB"], Btn::R1),
    (&["START"], Btn::Start),
    (&["SELECT", "BACK"], Btn::Select),
    (&["UP", "DPADUP"], Btn::Up),
];

impl Btn {
    fn bit(self) -> u16 {
        1 << self as u16
    }

    fn from_name(name: &str) -> Option<Btn> {
        let upper = name.to_uppercase();
        NAMES
            .iter()
            .find(|(aliases, _)| aliases.contains(&upper.as_str()))
            .map(|&(_, btn)| btn)
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        Some(match btn {
            Button::South => Btn::A,
            Button::East => Btn::B,
            Button::West => Btn::X,
            Button::North => Btn::Y,
            Button::LeftTrigger => Btn::L1,
            Button::RightTrigger => Btn::R1,
            Button::Start => Btn::Start,
            Button::Select => Btn::Select,
            Button::DPadUp => Btn::Up,
            _ => return None,
        })
    }
}

/// Bitmask per action; a press of any set button triggers it.
#[derive(Debug, PartialEq)]
struct Bindings {
    jump: u16,
    restart: u16,
    quit: u16,
}

impl Default for Bindings {
    fn default() -> Self {
        Bindings {
            jump: Btn::A.bit() | Btn::B.bit() | Btn::Up.bit() | Btn::StickUp.bit(),
            restart: Btn::Start.bit(),
            quit: Btn::Select.bit(),
        }
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,
    held: u16,
    /// Rising edges since the last `update`.
    pressed: u16,
    bindings: Bindings,
}

impl GamepadState {
    pub fn new() -> Self {
        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: open_gilrs(),
            held: 0,
            pressed: 0,
            bindings: Bindings::default(),
        }
    }

    /// Replace bindings from config. A list with no recognized names keeps
    /// the default for that action. The stick always jumps.
    pub fn load_button_config(&mut self, cfg: &GamepadConfig) {
        fn mask(names: &[String]) -> u16 {
            names
                .iter()
                .filter_map(|n| Btn::from_name(n))
                .fold(0, |m, b| m | b.bit())
        }
        let b = &mut self.bindings;
        for (slot, names) in [(&mut b.jump, &cfg.jump), (&mut b.restart, &cfg.restart), (&mut b.quit, &cfg.quit)] {
            let m = mask(names);
            if m != 0 {
                *slot = m;
            }
        }
        b.jump |= Btn::StickUp.bit();
    }

    /// Poll the pad and return the actions pressed since the last call.
    pub fn update(&mut self) -> Vec<InputEvent> {
        self.pressed = 0;
        #[cfg(feature = "gamepad")]
        self.poll();
        self.pressed_events()
    }

    #[cfg(feature = "gamepad")]
    fn poll(&mut self) {
        let Some(gilrs) = self.gilrs.as_mut() else {
            return;
        };
        let events: Vec<EventType> = std::iter::from_fn(|| gilrs.next_event())
            .map(|e| e.event)
            .collect();

        for event in events {
            match event {
                EventType::ButtonPressed(b, _) | EventType::ButtonReleased(b, _) => {
                    if let Some(btn) = Btn::from_gilrs(b) {
                        self.set(btn, matches!(event, EventType::ButtonPressed(..)));
                    }
                }
                EventType::AxisChanged(Axis::LeftStickY, y, _) => {
                    self.set(Btn::StickUp, y > STICK_DEADZONE);
                }
                EventType::Connected => log::info!("gamepad connected"),
                EventType::Disconnected => {
                    log::info!("gamepad disconnected");
                    self.held = 0;
                }
                _ => {}
            }
        }
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn set(&mut self, btn: Btn, down: bool) {
        let bit = btn.bit();
        if down && self.held & bit == 0 {
            self.pressed |= bit;
        }
        if down {
            self.held |= bit;
        } else {
            self.held &= !bit;
        }
    }

    fn pressed_events(&self) -> Vec<InputEvent> {
        let b = &self.bindings;
        [(b.quit, InputEvent::Quit), (b.restart, InputEvent::Restart), (b.jump, InputEvent::Jump)]
            .into_iter()
            .filter(|&(mask, _)| self.pressed & mask != 0)
            .map(|(_, ev)| ev)
            .collect()
    }
}

#[cfg(feature = "gamepad")]
fn open_gilrs() -> Option<Gilrs> {
    match Gilrs::new() {
        Ok(g) => {
            if g.gamepads().next().is_some() {
                log::info!("gamepad detected");
            }
            Some(g)
        }
        Err(e) => {
            log::warn!("gamepad support unavailable: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pad() -> GamepadState {
        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: None,
            held: 0,
            pressed: 0,
            bindings: Bindings::default(),
        }
    }

    #[test]
    fn button_names_parse_case_insensitively() {
        assert_eq!(Btn::from_name("south"), Some(Btn::A));
        assert_eq!(Btn::from_name("Back"), Some(Btn::Select));
        assert_eq!(Btn::from_name("dpadup"), Some(Btn::Up));
        assert_eq!(Btn::from_name("turbo"), None);
        assert_eq!(Btn::from_name("StickUp"), None);
    }

    #[test]
    fn config_overrides_only_recognized_lists() {
        let mut p = pad();
        let cfg = GamepadConfig {
            jump: vec!["X".into(), "bogus".into()],
            restart: vec![],
            quit: vec!["nothing".into()],
        };
        p.load_button_config(&cfg);
        assert_eq!(p.bindings.jump, Btn::X.bit() | Btn::StickUp.bit());
        assert_eq!(p.bindings.restart, Btn::Start.bit());
        assert_eq!(p.bindings.quit, Btn::Select.bit());
    }

    #[test]
    fn held_button_fires_once() {
        let mut p = pad();
        p.set(Btn::A, true);
        assert_eq!(p.pressed_events(), vec![InputEvent::Jump]);
        p.pressed = 0;
        p.set(Btn::A, true);
        assert!(p.pressed_events().is_empty());
        p.set(Btn::A, false);
        p.set(Btn::A, true);
        assert_eq!(p.pressed_events(), vec![InputEvent::Jump]);
    }

    #[test]
    fn stick_up_jumps() {
        let mut p = pad();
        p.set(Btn::StickUp, true);
        assert_eq!(p.pressed_events(), vec![InputEvent::Jump]);
    }

    #[test]
    fn start_and_select_map_to_restart_and_quit() {
        let mut p = pad();
        p.set(Btn::Start, true);
        p.set(Btn::Select, true);
        assert_eq!(p.pressed_events(), vec![InputEvent::Quit, InputEvent::Restart]);
    }
}
