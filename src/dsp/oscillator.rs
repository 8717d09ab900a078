use std::f32::consts::{PI, TAU};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Audio Oscillator
================

The oscillator is the synth's sound source: a phase accumulator that walks
around the unit circle once per cycle, and a waveform function that turns
the phase into a sample.

    increment = 2π · frequency / sample_rate     radians per sample
    phase     = (phase + increment) mod 2π

Waveforms for a phase φ in [0, 2π), with t = φ / 2π:

  Sine      sin(φ)              fundamental only, pure and hollow
  Triangle  2·|2t − 1| − 1      odd harmonics falling as 1/n², soft
  Saw       2t − 1              all harmonics falling as 1/n, bright
  Square    +1 if φ < π else −1 odd harmonics falling as 1/n, woody
  Noise     uniform in [−1, 1)  no pitch, ignores the phase entirely

These are the naive (non-band-limited) shapes. Saw and square alias at high
notes; the voice lowpass and the downstream filter node take the edge off,
and the exact ±1 square is easy to verify.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Waveform {
    Sine,
    Triangle,
    #[default]
    Saw,
    Square,
    Noise,
}

impl Waveform {
    pub const ALL: [Waveform; 5] = [
        Waveform::Sine,
        Waveform::Triangle,
        Waveform::Saw,
        Waveform::Square,
        Waveform::Noise,
    ];

    /// Map a published waveform index, clamping out-of-range values.
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index.min(Self::ALL.len() - 1)]
    }

    /// Deterministic waveforms as a function of phase. Noise has no phase
    /// dependence and returns 0.0 here; use [`Oscillator::next_sample`].
    #[inline]
    pub fn evaluate(self, phase: f32) -> f32 {
        match self {
            Waveform::Sine => phase.sin(),
            Waveform::Triangle => {
                let t = phase / TAU;
                2.0 * (2.0 * t - 1.0).abs() - 1.0
            }
            Waveform::Saw => 2.0 * (phase / TAU) - 1.0,
            Waveform::Square => {
                if phase < PI {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Noise => 0.0,
        }
    }
}

/// Phase-accumulating oscillator with its own noise source.
#[derive(Debug, Clone)]
pub struct Oscillator {
    phase: f32,     // radians, 0..TAU
    increment: f32, // radians per sample
    rng: fastrand::Rng,
}

impl Oscillator {
    pub fn new(seed: u64) -> Self {
        Self {
            phase: 0.0,
            increment: 0.0,
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    #[inline]
    pub fn set_frequency(&mut self, frequency_hz: f32, sample_rate: f32) {
        self.increment = TAU * frequency_hz / sample_rate;
    }

    pub fn increment(&self) -> f32 {
        self.increment
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Restart the cycle (used at note-on).
    pub fn reset_phase(&mut self) {
        self.phase = 0.0;
    }

    /// Sample at the current phase, then advance.
    #[inline]
    pub fn next_sample(&mut self, waveform: Waveform) -> f32 {
        let value = match waveform {
            Waveform::Noise => self.rng.f32() * 2.0 - 1.0,
            shape => shape.evaluate(self.phase),
        };

        self.phase += self.increment;
        if self.phase >= TAU {
            self.phase -= TAU;
            // A single subtraction is enough below Nyquist, this guards
            // against absurd increments.
            if self.phase >= TAU {
                self.phase %= TAU;
            }
        }

        value
    }

    pub fn render(&mut self, waveform: Waveform, out: &mut [f32]) {
        for sample in out.iter_mut() {
            *sample = self.next_sample(waveform);
        }
    }
}

/// Convert a MIDI note plus a tuning offset in semitones to Hz.
/// A4 = 440 Hz = MIDI note 69.
#[inline]
pub fn note_to_frequency(note: u8, tune_semitones: f32) -> f32 {
    440.0 * 2.0_f32.powf((note as f32 - 69.0 + tune_semitones) / 12.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const SAMPLE_RATE: f32 = 48_000.0;

    #[test]
    fn valid_sine() {
        let mut osc = Oscillator::new(1);
        let frequency = note_to_frequency(69, 0.0);
        osc.set_frequency(frequency, SAMPLE_RATE);

        let mut buffer = vec![0.0f32; 128];
        osc.render(Waveform::Sine, &mut buffer);

        // sample n should be sin(2pi f n / sr), where f = 440Hz (MIDI 69)
        let sample_index = 12;
        let expected = (TAU * frequency * sample_index as f32 / SAMPLE_RATE).sin();
        let actual = buffer[sample_index];
        assert!(
            (actual - expected).abs() < 1e-5,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn waveform_shapes_at_key_phases() {
        assert_relative_eq!(Waveform::Triangle.evaluate(0.0), 1.0);
        assert_relative_eq!(Waveform::Triangle.evaluate(PI), -1.0);
        assert_relative_eq!(Waveform::Saw.evaluate(0.0), -1.0);
        assert_relative_eq!(Waveform::Saw.evaluate(PI), 0.0);
        assert_eq!(Waveform::Square.evaluate(0.0), 1.0);
        assert_eq!(Waveform::Square.evaluate(PI), -1.0);
    }

    #[test]
    fn all_waveforms_stay_in_range() {
        for waveform in Waveform::ALL {
            let mut osc = Oscillator::new(7);
            osc.set_frequency(1_234.5, SAMPLE_RATE);
            let mut buffer = vec![0.0f32; 4096];
            osc.render(waveform, &mut buffer);

            for &sample in &buffer {
                assert!(
                    (-1.0..=1.0).contains(&sample),
                    "{waveform:?} sample {sample} out of range"
                );
            }
        }
    }

    #[test]
    fn noise_is_not_constant() {
        let mut osc = Oscillator::new(42);
        let mut buffer = vec![0.0f32; 256];
        osc.render(Waveform::Noise, &mut buffer);

        let mean = buffer.iter().sum::<f32>() / buffer.len() as f32;
        let variance = buffer.iter().map(|s| (s - mean).powi(2)).sum::<f32>() / buffer.len() as f32;
        assert!(variance > 0.1, "noise variance too low: {variance}");
    }

    #[test]
    fn phase_wraps() {
        let mut osc = Oscillator::new(3);
        osc.set_frequency(10_000.0, SAMPLE_RATE);
        for _ in 0..10_000 {
            osc.next_sample(Waveform::Sine);
            assert!((0.0..TAU).contains(&osc.phase()));
        }
    }

    #[test]
    fn tune_shifts_by_semitones() {
        assert_relative_eq!(note_to_frequency(69, 12.0), 880.0, epsilon = 1e-3);
        assert_relative_eq!(note_to_frequency(57, 0.0), 220.0, epsilon = 1e-3);
        assert_relative_eq!(note_to_frequency(60, 0.0), 261.6256, epsilon = 1e-3);
    }

    #[test]
    fn from_index_clamps() {
        assert_eq!(Waveform::from_index(0), Waveform::Sine);
        assert_eq!(Waveform::from_index(3), Waveform::Square);
        assert_eq!(Waveform::from_index(99), Waveform::Noise);
    }
}
