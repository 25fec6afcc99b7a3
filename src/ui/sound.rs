/// Sound engine: procedural 8-bit style cues via rodio.
///
/// All sounds are generated as in-memory WAV buffers at init time.
/// Playback is fire-and-forget (non-blocking) via rodio's Sink.
///
/// Compile with `--no-default-features` to disable audio entirely
/// (the stub SoundEngine does nothing).

use crate::sim::event::GameEvent;

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    use super::synth;

    /// Pre-generated WAV buffers for each cue.
    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_spawn: Arc<Vec<u8>>,
        sfx_waypoint: Arc<Vec<u8>>,
        sfx_win: Arc<Vec<u8>>,
        sfx_lose: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = OutputStream::try_default().ok()?;
            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_spawn: Arc::new(synth::make_wav(&synth::gen_spawn())),
                sfx_waypoint: Arc::new(synth::make_wav(&synth::gen_waypoint())),
                sfx_win: Arc::new(synth::make_wav(&synth::gen_win())),
                sfx_lose: Arc::new(synth::make_wav(&synth::gen_lose())),
            })
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach(); // fire-and-forget
                }
            }
        }

        pub fn play_spawn(&self) { self.play(&self.sfx_spawn); }
        pub fn play_waypoint(&self) { self.play(&self.sfx_waypoint); }
        pub fn play_win(&self) { self.play(&self.sfx_win); }
        pub fn play_lose(&self) { self.play(&self.sfx_lose); }
    }
}

// ════════════════════════════════════════════════════════════
//  Synthesis: waveform generators and the WAV encoder
// ════════════════════════════════════════════════════════════

#[cfg_attr(not(feature = "sound"), allow(dead_code))]
mod synth {
    use std::f32::consts::TAU;

    pub const SAMPLE_RATE: u32 = 22050;

    fn samples_for(duration: f32) -> usize {
        (SAMPLE_RATE as f32 * duration) as usize
    }

    /// Sequence of notes, each with a linear decay.
    fn notes(freqs: &[f32], note_dur: f32, volume: f32) -> Vec<f32> {
        let mut samples = Vec::new();
        for &freq in freqs {
            let n = samples_for(note_dur);
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32) * 0.4;
                let wave = (t * freq * TAU).sin() * 0.7 + (t * freq * 2.0 * TAU).sin() * 0.3;
                samples.push(wave * env * volume);
            }
        }
        samples
    }

    /// Enemy appears: low rising buzz
    pub fn gen_spawn() -> Vec<f32> {
        let n = samples_for(0.08);
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let freq = 180.0 + t * 140.0;
                let ti = i as f32 / SAMPLE_RATE as f32;
                let square = if (ti * freq * TAU).sin() >= 0.0 { 1.0 } else { -1.0 };
                square * (1.0 - t) * 0.12
            })
            .collect()
    }

    /// Waypoint reached: single soft blip
    pub fn gen_waypoint() -> Vec<f32> {
        let n = samples_for(0.05);
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - i as f32 / n as f32;
                (t * 880.0 * TAU).sin() * env * 0.2
            })
            .collect()
    }

    /// Turtle home: ascending fanfare C5→E5→G5→C6
    pub fn gen_win() -> Vec<f32> {
        notes(&[523.0, 659.0, 784.0, 1047.0], 0.1, 0.3)
    }

    /// Caught: descending A4→F#4→Eb4→C4 with a final fade
    pub fn gen_lose() -> Vec<f32> {
        let mut samples = notes(&[440.0, 370.0, 311.0, 261.0], 0.12, 0.3);
        let total = samples.len();
        let fade_len = total / 4;
        for (i, s) in samples.iter_mut().enumerate().skip(total - fade_len) {
            *s *= (total - i) as f32 / fade_len as f32;
        }
        samples
    }

    /// Wrap mono f32 samples into a 16-bit PCM WAV buffer.
    pub fn make_wav(samples: &[f32]) -> Vec<u8> {
        let num_channels: u16 = 1;
        let bits_per_sample: u16 = 16;
        let byte_rate = SAMPLE_RATE * (num_channels as u32) * (bits_per_sample as u32) / 8;
        let block_align = num_channels * bits_per_sample / 8;
        let data_size = samples.len() as u32 * 2;

        let mut buf = Vec::with_capacity(44 + data_size as usize);
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&(36 + data_size).to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&num_channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());
        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }
        buf
    }
}

// ════════════════════════════════════════════════════════════
//  Public API — compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play_spawn(&self) {}
    pub fn play_waypoint(&self) {}
    pub fn play_win(&self) {}
    pub fn play_lose(&self) {}
}

impl SoundEngine {
    /// Play the cue for one game event.
    pub fn play_event(&self, event: &GameEvent) {
        match event {
            GameEvent::EnemySpawned { .. } => self.play_spawn(),
            GameEvent::WaypointReached => self.play_waypoint(),
            GameEvent::Won => self.play_win(),
            GameEvent::Lost { .. } => self.play_lose(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::synth::*;

    #[test]
    fn wav_header_and_size() {
        let wav = make_wav(&[0.0, 0.5, -0.5, 2.0]);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(wav.len(), 44 + 4 * 2);
        // clamped to full scale
        assert_eq!(i16::from_le_bytes([wav[50], wav[51]]), 32767);
    }

    #[test]
    fn cues_are_short_and_bounded() {
        for cue in [gen_spawn(), gen_waypoint(), gen_win(), gen_lose()] {
            assert!(!cue.is_empty());
            assert!(cue.len() < SAMPLE_RATE as usize);
            assert!(cue.iter().all(|s| s.abs() <= 1.0));
        }
    }

    #[test]
    fn lose_cue_fades_out() {
        let cue = gen_lose();
        assert!(cue.last().map_or(false, |s| s.abs() < 0.01));
    }
}
