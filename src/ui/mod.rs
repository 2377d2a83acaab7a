pub mod assets;
pub mod compositor;
pub mod gamepad;
pub mod input;
pub mod renderer;
pub mod sound;
