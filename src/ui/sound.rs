/// Audio cues for jump, hit and game over.
///
/// Each cue is synthesized once at startup and encoded as a 16-bit mono
/// WAV buffer; playing it decodes the buffer into a detached rodio sink.
/// Without the `sound` feature `SoundEngine` is an inert stub.

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    use super::synth;
    use super::wav::encode;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        jump: Arc<Vec<u8>>,
        hit: Arc<Vec<u8>>,
        boom: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        /// `None` when no output device can be opened.
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    log::warn!("no audio output, running silent: {e}");
                    return None;
                }
            };
            log::info!("audio output opened");

            Some(SoundEngine {
                _stream: stream,
                handle,
                jump: Arc::new(encode(&synth::jump())),
                hit: Arc::new(encode(&synth::hit())),
                boom: Arc::new(encode(&synth::boom())),
            })
        }

        fn play(&self, wav: &Arc<Vec<u8>>) {
            let Ok(sink) = Sink::try_new(&self.handle) else {
                return;
            };
            match rodio::Decoder::new(Cursor::new(wav.as_ref().clone())) {
                Ok(src) => {
                    sink.append(src);
                    sink.detach();
                }
                Err(e) => log::debug!("cue decode failed: {e}"),
            }
        }

        pub fn play_jump(&self) {
            self.play(&self.jump);
        }
        pub fn play_hit(&self) {
            self.play(&self.hit);
        }
        pub fn play_game_over(&self) {
            self.play(&self.boom);
        }
    }
}

/// Cue generators. Each returns mono samples in [-1, 1] at `SAMPLE_RATE`.
#[cfg_attr(not(feature = "sound"), allow(dead_code))]
mod synth {
    use std::f32::consts::TAU;

    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use super::wav::SAMPLE_RATE;

    fn samples(seconds: f32) -> usize {
        (SAMPLE_RATE as f32 * seconds) as usize
    }

    /// Rising two-harmonic chirp, 380 Hz to 900 Hz.
    pub fn jump() -> Vec<f32> {
        let n = samples(0.12);
        let mut phase = 0.0_f32;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                phase += (380.0 + 520.0 * t) / SAMPLE_RATE as f32;
                let tone = 0.7 * (phase * TAU).sin() + 0.3 * (3.0 * phase * TAU).sin();
                0.25 * tone * (1.0 - t).powf(0.7)
            })
            .collect()
    }

    /// Falling thud mixed with noise.
    pub fn hit() -> Vec<f32> {
        let n = samples(0.25);
        let mut rng = Pcg32::seed_from_u64(0x4849);
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let secs = i as f32 / SAMPLE_RATE as f32;
                let tone = (secs * (180.0 - 120.0 * t) * TAU).sin();
                let noise: f32 = rng.random_range(-1.0..1.0);
                0.35 * (0.6 * tone + 0.4 * noise) * (1.0 - t).powf(1.5)
            })
            .collect()
    }

    /// Low-passed noise whose cutoff closes as it fades.
    pub fn boom() -> Vec<f32> {
        let n = samples(0.7);
        let mut rng = Pcg32::seed_from_u64(0x424f);
        let mut low = 0.0_f32;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let noise: f32 = rng.random_range(-1.0..1.0);
                low += (noise - low) * (0.25 - 0.2 * t);
                0.8 * low * (1.0 - t) * (1.0 - t)
            })
            .collect()
    }

}

/// 16-bit PCM mono WAV encoding.
#[cfg_attr(not(feature = "sound"), allow(dead_code))]
mod wav {
    pub const SAMPLE_RATE: u32 = 22050;

    const CHANNELS: u16 = 1;
    const BITS: u16 = 16;
    const HEADER_LEN: usize = 44;

    pub fn encode(samples: &[f32]) -> Vec<u8> {
        let block_align = CHANNELS * BITS / 8;
        let data_len = samples.len() as u32 * block_align as u32;

        let mut out = Vec::with_capacity(HEADER_LEN + data_len as usize);
        let mut put = |bytes: &[u8]| out.extend_from_slice(bytes);

        put(b"RIFF");
        put(&(HEADER_LEN as u32 - 8 + data_len).to_le_bytes());
        put(b"WAVE");

        put(b"fmt ");
        put(&16u32.to_le_bytes());
        put(&1u16.to_le_bytes()); // PCM
        put(&CHANNELS.to_le_bytes());
        put(&SAMPLE_RATE.to_le_bytes());
        put(&(SAMPLE_RATE * block_align as u32).to_le_bytes());
        put(&block_align.to_le_bytes());
        put(&BITS.to_le_bytes());

        put(b"data");
        put(&data_len.to_le_bytes());

        for &s in samples {
            put(&((s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16).to_le_bytes());
        }
        out
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn header_matches_payload() {
            let wav = encode(&[0.0, 1.0, -1.0, 2.0]);
            assert_eq!(wav.len(), 44 + 8);
            assert_eq!(&wav[0..4], b"RIFF");
            assert_eq!(u32::from_le_bytes([wav[4], wav[5], wav[6], wav[7]]), 36 + 8);
            assert_eq!(&wav[36..40], b"data");
            // clamped to full scale
            assert_eq!(i16::from_le_bytes([wav[46], wav[47]]), 32767);
            assert_eq!(i16::from_le_bytes([wav[50], wav[51]]), 32767);
            assert_eq!(i16::from_le_bytes([wav[48], wav[49]]), -32767);
        }
    }
}

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> {
        Some(SoundEngine)
    }

    pub fn play_jump(&self) {}

    pub fn play_hit(&self) {}

    pub fn play_game_over(&self) {}
}
