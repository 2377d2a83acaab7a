/// Per-tick timers behind the game-over presentation.
///
/// The compositor only reads this state; all randomness and time
/// advancement happen here, inside the tick.

use rand::Rng;

use super::TICKS_PER_SECOND;

/// Peak shake amplitude in pixels.
pub const SHAKE_MAX: f32 = 8.0;
/// Shake decays to zero over the first 2 s of game over.
pub const SHAKE_TICKS: u32 = 2 * TICKS_PER_SECOND;
/// Hue advance per tick, degrees.
pub const HUE_STEP: f32 = 3.0;

#[derive(Clone, PartialEq, Debug, Default)]
pub struct EffectState {
    /// Ticks since the effects were started.
    pub elapsed: u32,
    /// Text translation for this tick.
    pub shake: (i32, i32),
    /// Color-cycle hue in degrees, `0.0..360.0`.
    pub hue: f32,
}

impl EffectState {
    pub fn advance(&mut self, rng: &mut impl Rng) {
        self.elapsed = self.elapsed.saturating_add(1);
        self.hue = (self.hue + HUE_STEP) % 360.0;
        let amp = shake_amplitude(self.elapsed);
        self.shake = if amp > 0 {
            (rng.random_range(-amp..=amp), rng.random_range(-amp..=amp))
        } else {
            (0, 0)
        };
    }
}

/// Linear decay from `SHAKE_MAX` at tick 0 to 0 at `SHAKE_TICKS`.
pub fn shake_amplitude(elapsed: u32) -> i32 {
    let remaining = SHAKE_TICKS.saturating_sub(elapsed) as f32;
    (SHAKE_MAX * remaining / SHAKE_TICKS as f32).round() as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn amplitude_decays_linearly_to_zero() {
        assert_eq!(shake_amplitude(0), SHAKE_MAX as i32);
        assert_eq!(shake_amplitude(SHAKE_TICKS / 2), (SHAKE_MAX / 2.0) as i32);
        assert_eq!(shake_amplitude(SHAKE_TICKS), 0);
        assert_eq!(shake_amplitude(SHAKE_TICKS * 10), 0);
        let mut prev = i32::MAX;
        for t in 0..=SHAKE_TICKS {
            let a = shake_amplitude(t);
            assert!(a <= prev);
            prev = a;
        }
    }

    #[test]
    fn shake_stays_in_band_then_stops() {
        let mut rng = Pcg32::seed_from_u64(9);
        let mut fx = EffectState::default();
        let mut moved = false;
        for _ in 0..SHAKE_TICKS + 30 {
            fx.advance(&mut rng);
            let amp = shake_amplitude(fx.elapsed);
            assert!(fx.shake.0.abs() <= amp && fx.shake.1.abs() <= amp);
            moved |= fx.shake != (0, 0);
        }
        assert!(moved);
        assert_eq!(fx.shake, (0, 0));
    }

    #[test]
    fn hue_advances_and_wraps() {
        let mut rng = Pcg32::seed_from_u64(0);
        let mut fx = EffectState::default();
        fx.advance(&mut rng);
        assert_eq!(fx.hue, HUE_STEP);
        for _ in 0..200 {
            fx.advance(&mut rng);
            assert!((0.0..360.0).contains(&fx.hue));
        }
    }
}
