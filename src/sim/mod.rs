/// Game state and the one-tick step function.

pub mod event;
pub mod step;
pub mod world;
