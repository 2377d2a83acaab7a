/// Software pixel pipeline: colors, immutable sprites, the frame canvas,
/// and the one-shot sprite filters applied before the game starts.

pub mod canvas;
pub mod color;
pub mod filter;
pub mod font;
pub mod sprite;

pub use canvas::Canvas;
pub use color::Rgba;
pub use sprite::Sprite;
