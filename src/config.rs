/// `config.toml` loading: RNG seed, sound switch, sprite sources with
/// their preprocessing effects, and gamepad bindings.
///
/// Every key has a default, so a missing or partial file still yields a
/// complete `GameConfig`.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::gfx::filter::Effect;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub general: GeneralConfig,
    pub assets: AssetConfig,
    pub gamepad: GamepadConfig,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GeneralConfig {
    /// Fixed RNG seed; `None` seeds from the OS.
    pub seed: Option<u64>,
    pub sound: bool,
}

/// One source image plus the preprocessing it gets at startup.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SpriteSource {
    pub path: PathBuf,
    #[serde(default)]
    pub effect: Effect,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AssetConfig {
    /// Resolved assets directory; sprite paths are relative to it.
    pub dir: PathBuf,
    pub player: SpriteSource,
    pub cactus: SpriteSource,
    pub bird: [SpriteSource; 2],
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub jump: Vec<String>,
    pub restart: Vec<String>,
    pub quit: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    general: TomlGeneral,
    #[serde(default)]
    assets: TomlAssets,
    #[serde(default)]
    gamepad: TomlGamepad,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default = "default_sound")]
    sound: bool,
}

#[derive(Deserialize, Debug)]
struct TomlAssets {
    #[serde(default = "default_assets_dir")]
    dir: String,
    #[serde(default = "default_player")]
    player: SpriteSource,
    #[serde(default = "default_cactus")]
    cactus: SpriteSource,
    #[serde(default = "default_bird_up")]
    bird_up: SpriteSource,
    #[serde(default = "default_bird_down")]
    bird_down: SpriteSource,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_jump")]
    jump: Vec<String>,
    #[serde(default = "default_restart")]
    restart: Vec<String>,
    #[serde(default = "default_quit")]
    quit: Vec<String>,
}

// ── Defaults ──

fn default_sound() -> bool {
    true
}
fn default_assets_dir() -> String {
    "assets".into()
}

fn default_player() -> SpriteSource {
    SpriteSource { path: "dino.png".into(), effect: Effect::Brighten { amount: 70 } }
}
fn default_cactus() -> SpriteSource {
    SpriteSource { path: "cactus.png".into(), effect: Effect::Wave { intensity: 4.0 } }
}
fn default_bird_up() -> SpriteSource {
    SpriteSource { path: "bird1.png".into(), effect: Effect::None }
}
fn default_bird_down() -> SpriteSource {
    SpriteSource { path: "bird2.png".into(), effect: Effect::None }
}

fn default_jump() -> Vec<String> {
    vec!["A".into(), "B".into(), "Up".into()]
}
fn default_restart() -> Vec<String> {
    vec!["Start".into()]
}
fn default_quit() -> Vec<String> {
    vec!["Select".into()]
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            seed: None,
            sound: default_sound(),
        }
    }
}

impl Default for TomlAssets {
    fn default() -> Self {
        TomlAssets {
            dir: default_assets_dir(),
            player: default_player(),
            cactus: default_cactus(),
            bird_up: default_bird_up(),
            bird_down: default_bird_down(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            jump: default_jump(),
            restart: default_restart(),
            quit: default_quit(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// First `config.toml` found in the exe dir, the CWD, then
    /// `~/.local/share/dinorun`. The same dirs anchor a relative asset dir.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);
        Self::resolve(toml_cfg, &search_dirs)
    }

    /// Parse a config document. Relative asset dirs are kept relative.
    #[cfg(test)]
    fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        let cfg = toml::from_str::<TomlConfig>(text)?;
        Ok(Self::resolve(cfg, &[]))
    }

    fn resolve(toml_cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        let assets = toml_cfg.assets;
        let dir = resolve_dir(&assets.dir, search_dirs);

        GameConfig {
            general: GeneralConfig {
                seed: toml_cfg.general.seed,
                sound: toml_cfg.general.sound,
            },
            assets: AssetConfig {
                dir,
                player: assets.player,
                cactus: assets.cactus,
                bird: [assets.bird_up, assets.bird_down],
            },
            gamepad: GamepadConfig {
                jump: toml_cfg.gamepad.jump,
                restart: toml_cfg.gamepad.restart,
                quit: toml_cfg.gamepad.quit,
            },
        }
    }
}

/// Absolute dirs are used as-is; relative ones are looked up in each
/// candidate dir, defaulting to relative-to-CWD.
fn resolve_dir(dir: &str, search_dirs: &[PathBuf]) -> PathBuf {
    if Path::new(dir).is_absolute() {
        return PathBuf::from(dir);
    }
    search_dirs
        .iter()
        .map(|d| d.join(dir))
        .find(|p| p.is_dir())
        .unwrap_or_else(|| PathBuf::from(dir))
}

/// Exe dir, CWD and XDG data home, deduplicated, in search order.
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        // Resolve symlinks so a linked binary still finds data
        // relative to the real one.
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home (~/.local/share/dinorun)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/dinorun");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    // 4. Fallback
    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => {
                        log::info!("config: loaded {}", path.display());
                        return cfg;
                    }
                    Err(e) => {
                        log::warn!("config: {} parse error, using defaults: {e}", path.display());
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    log::warn!("config: could not read {}: {e}", path.display());
                }
            }
        }
    }
    log::info!("config: no config.toml found, using defaults");
    TomlConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let cfg = GameConfig::from_toml("").unwrap();
        assert_eq!(cfg.general, GeneralConfig { seed: None, sound: true });
        assert_eq!(cfg.assets.dir, PathBuf::from("assets"));
        assert_eq!(cfg.assets.player, default_player());
        assert_eq!(cfg.assets.bird[1].path, PathBuf::from("bird2.png"));
        assert_eq!(cfg.gamepad.restart, vec!["Start".to_string()]);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = GameConfig::from_toml(
            r#"
            [general]
            seed = 42

            [assets]
            dir = "/opt/dino"
            cactus = { path = "c.png", effect = { kind = "brighten", amount = 10 } }
            bird_up = { path = "b.png" }
            "#,
        )
        .unwrap();
        assert_eq!(cfg.general.seed, Some(42));
        assert_eq!(cfg.assets.dir, PathBuf::from("/opt/dino"));
        assert_eq!(cfg.assets.cactus.effect, Effect::Brighten { amount: 10 });
        assert_eq!(cfg.assets.bird[0].effect, Effect::None);
        assert_eq!(cfg.assets.player, default_player());
    }

    #[test]
    fn frame_rate_is_not_configurable() {
        // Durations are counted in ticks, so the rate is fixed; a stale
        // `fps` key is ignored rather than rejected.
        let cfg = GameConfig::from_toml("[general]\nfps = 30\nseed = 7").unwrap();
        assert_eq!(cfg.general, GeneralConfig { seed: Some(7), sound: true });
    }

    #[test]
    fn unknown_effect_is_a_parse_error() {
        let doc = "[assets]\nplayer = { path = \"p.png\", effect = { kind = \"blur\" } }";
        assert!(GameConfig::from_toml(doc).is_err());
    }
}
