/// Sprite loading: decode each configured image, run its one-shot filter,
/// scale to the entity's size and hand back shared, immutable sprites.
///
/// Any failure here is fatal; the caller reports it and exits before the
/// terminal is touched.

use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::config::{AssetConfig, SpriteSource};
use crate::domain::entity::{SpriteSet, BIRD_SIZE, CACTUS_SIZE, PLAYER_SIZE};
use crate::gfx::filter;
use crate::gfx::Sprite;

#[derive(Debug)]
pub enum AssetError {
    NotFound { path: PathBuf },
    Decode { path: PathBuf, source: image::ImageError },
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { path } => write!(f, "sprite not found: {}", path.display()),
            Self::Decode { path, source } => {
                write!(f, "cannot decode sprite {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for AssetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NotFound { .. } => None,
            Self::Decode { source, .. } => Some(source),
        }
    }
}

pub fn load_sprites(cfg: &AssetConfig) -> Result<SpriteSet, AssetError> {
    let load = |src: &SpriteSource, size: (u32, u32)| load_sprite(&cfg.dir, src, size).map(Rc::new);
    Ok(SpriteSet {
        player: load(&cfg.player, PLAYER_SIZE)?,
        cactus: load(&cfg.cactus, CACTUS_SIZE)?,
        bird: [load(&cfg.bird[0], BIRD_SIZE)?, load(&cfg.bird[1], BIRD_SIZE)?],
    })
}

fn load_sprite(dir: &Path, src: &SpriteSource, (w, h): (u32, u32)) -> Result<Sprite, AssetError> {
    let path = dir.join(&src.path);
    if !path.is_file() {
        return Err(AssetError::NotFound { path });
    }
    let img = match image::open(&path) {
        Ok(img) => img.to_rgba8(),
        Err(source) => return Err(AssetError::Decode { path, source }),
    };
    log::info!(
        "asset: {} {}x{} -> {w}x{h} ({:?})",
        path.display(),
        img.width(),
        img.height(),
        src.effect
    );
    Ok(filter::preprocess(&img, src.effect, w, h))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::filter::Effect;
    use image::RgbaImage;
    use std::error::Error;

    /// Fresh scratch dir per test under the system temp dir.
    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("dinorun-assets-{}-{name}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn source(path: &str) -> SpriteSource {
        SpriteSource { path: path.into(), effect: Effect::None }
    }

    fn config(dir: PathBuf) -> AssetConfig {
        AssetConfig {
            dir,
            player: SpriteSource { path: "p.png".into(), effect: Effect::Brighten { amount: 70 } },
            cactus: SpriteSource { path: "c.png".into(), effect: Effect::Wave { intensity: 4.0 } },
            bird: [source("b1.png"), source("b2.png")],
        }
    }

    fn write_png(dir: &Path, name: &str, w: u32, h: u32) {
        RgbaImage::from_pixel(w, h, image::Rgba([10, 120, 30, 255]))
            .save(dir.join(name))
            .unwrap();
    }

    #[test]
    fn loads_and_scales_every_sprite() {
        let dir = scratch("ok");
        for name in ["p.png", "c.png", "b1.png", "b2.png"] {
            write_png(&dir, name, 16, 12);
        }
        let set = load_sprites(&config(dir)).unwrap();
        assert_eq!((set.player.width(), set.player.height()), PLAYER_SIZE);
        assert_eq!((set.cactus.width(), set.cactus.height()), CACTUS_SIZE);
        assert_eq!((set.bird[1].width(), set.bird[1].height()), BIRD_SIZE);
        // alpha carried through the filters
        assert!(set.cactus.pixels().iter().all(|p| p.a == 255));
    }

    #[test]
    fn missing_file_is_reported_with_its_path() {
        let dir = scratch("missing");
        write_png(&dir, "p.png", 4, 4);
        let err = load_sprites(&config(dir.clone())).unwrap_err();
        match &err {
            AssetError::NotFound { path } => assert_eq!(path, &dir.join("c.png")),
            other => panic!("unexpected {other:?}"),
        }
        assert!(err.to_string().contains("c.png"));
        assert!(err.source().is_none());
    }

    #[test]
    fn corrupt_file_chains_the_decoder_error() {
        let dir = scratch("corrupt");
        std::fs::write(dir.join("p.png"), b"definitely not a png").unwrap();
        let err = load_sprites(&config(dir)).unwrap_err();
        assert!(matches!(err, AssetError::Decode { .. }));
        assert!(err.source().is_some());
    }
}
