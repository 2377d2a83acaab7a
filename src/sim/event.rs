/// Events emitted during a simulation step.
/// The frame driver consumes these for audio cues and logging.

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GameEvent {
    Jumped,
    Landed,
    Scored { score: u32 },
    /// Player touched an obstacle; slow motion begins.
    Hit,
    /// Slow motion ran out: explosion spawned at (x, y), game over.
    GameOver { x: f32, y: f32, score: u32 },
}
