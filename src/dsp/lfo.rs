//! Low Frequency Oscillator (LFO).

/*
Low Frequency Oscillators
=========================

An LFO is an oscillator running at sub-audio frequencies. The waveform math
is the same as an audio oscillator, but the output is a control signal that
moves some other parameter over time rather than a sound of its own.

  audio-rate      ~20 Hz to ~20,000 Hz. Produces the sound you hear.
  control-rate    ~0.01 Hz to ~20 Hz. Modulates parameters.
  period          Time for one cycle. At 0.5 Hz: 2 seconds.
  bipolar         Output in [-1.0, +1.0]; the parameter moves above AND below
                  its centre.

The phaser is the only consumer here: a sine LFO sweeps the all-pass break
frequency up and down around a fixed centre. Sine is the classic choice for
a phaser since its rate of change slows at the turning points, so the notches
linger at the extremes of the sweep the way an analog phaser's do.

Phase is kept in cycles (0.0 to 1.0) rather than radians so wrapping is a
single subtraction and the increment is just `frequency / sample_rate`.
*/

use std::f32::consts::TAU;

/// Free-running sine LFO.
#[derive(Debug, Clone, Default)]
pub struct Lfo {
    phase: f32,     // 0.0..1.0
    increment: f32, // cycles per sample
}

impl Lfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the rate. Takes effect on the next sample without a phase jump.
    #[inline]
    pub fn set_rate(&mut self, frequency_hz: f32, sample_rate: f32) {
        self.increment = (frequency_hz / sample_rate).max(0.0);
    }

    /// Current bipolar value, then advance one sample.
    #[inline]
    pub fn next_value(&mut self) -> f32 {
        let value = (self.phase * TAU).sin();
        self.phase += self.increment;
        if self.phase >= 1.0 {
            self.phase -= self.phase.floor();
        }
        value
    }

    /// Advance `samples` without producing output.
    #[inline]
    pub fn skip(&mut self, samples: usize) {
        self.phase += self.increment * samples as f32;
        self.phase -= self.phase.floor();
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}

/// Calculate samples per LFO period.
///
/// # Example
/// ```
/// use next_dsp::dsp::lfo::samples_per_period;
/// let samples = samples_per_period(5.0, 48000.0);
/// assert_eq!(samples, 9600.0); // 5 Hz at 48kHz = 9600 samples
/// ```
#[inline]
pub fn samples_per_period(frequency_hz: f32, sample_rate: f32) -> f32 {
    sample_rate / frequency_hz
}
