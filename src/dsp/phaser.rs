use std::f32::consts::PI;

use crate::dsp::{denormal, lfo::Lfo, mix::crossfade};

/*
Phaser
======

A phaser splits the signal in two, runs one copy through a chain of all-pass
filters and mixes it back with the original. An all-pass filter has flat
magnitude response but a frequency-dependent phase shift; where the chain's
shift reaches 180° the two copies cancel, carving notches into the spectrum.
Sweeping the all-pass break frequency with an LFO moves the notches, which
is the phaser's characteristic swoosh.

                  ┌───────────────────────────────────────┐
                  │ feedback                              │
                  ↓                                       │
  x ──┬──────→ (+) ──→ AP → AP → AP → AP → AP → AP ──┬──┘
      │                                               │ wet
      │ dry                                           ↓
      └────────────────────────────────────→ crossfade(dry, wet, mix) ──→ y

Each stage is a first-order TPT all-pass:

    G  = g / (1 + g),  g = tan(π · f / fs)
    v  = (x − s) · G
    lp = v + s
    s  = lp + v
    ap = 2 · lp − x

Six stages give three notches. The break frequency moves on a logarithmic
scale between 20 Hz and 20 kHz:

    position = clamp(norm(centre) + depth · lfo · 0.5, 0, 1)
    f        = 20 · 1000^position

so depth = 1 sweeps half the audible range either side of the centre, and
depth = 0 parks the notches at the centre frequency.

Feedback routes the previous wet sample back into the chain input. Positive
values sharpen the notches into resonant peaks, negative values shift them.
|feedback| < 1 and unity-gain all-passes keep the loop stable.

Coefficients are refreshed every UPDATE_INTERVAL samples; the LFO moves so
slowly that per-sample `tan` calls buy nothing audible.
*/

pub const NUM_STAGES: usize = 6;
pub const MAX_CHANNELS: usize = 2;

const MIN_FREQUENCY: f32 = 20.0;
const MAX_FREQUENCY: f32 = 20_000.0;
const UPDATE_INTERVAL: usize = 4;

#[derive(Debug, Clone, Copy, Default)]
struct AllPassStage {
    s: f32,
}

impl AllPassStage {
    #[inline]
    fn process(&mut self, x: f32, big_g: f32) -> f32 {
        let v = (x - self.s) * big_g;
        let lp = v + self.s;
        self.s = lp + v;
        2.0 * lp - x
    }
}

#[derive(Debug, Clone)]
pub struct Phaser {
    stages: [[AllPassStage; NUM_STAGES]; MAX_CHANNELS],
    last_output: [f32; MAX_CHANNELS],
    lfo: Lfo,

    sample_rate: f32,
    rate: f32,
    depth: f32,
    feedback: f32,
    mix: f32,
    norm_centre: f32,

    coefficient: f32,
    update_counter: usize,
}

impl Default for Phaser {
    fn default() -> Self {
        Self::new()
    }
}

impl Phaser {
    pub fn new() -> Self {
        let mut phaser = Self {
            stages: [[AllPassStage::default(); NUM_STAGES]; MAX_CHANNELS],
            last_output: [0.0; MAX_CHANNELS],
            lfo: Lfo::new(),
            sample_rate: 44_100.0,
            rate: 1.0,
            depth: 0.5,
            feedback: 0.0,
            mix: 0.5,
            norm_centre: 0.0,
            coefficient: 0.0,
            update_counter: 0,
        };
        phaser.set_centre_frequency(1_200.0);
        phaser.update_coefficient(0.0);
        phaser
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.lfo.set_rate(self.rate, sample_rate);
        self.update_counter = 0;
    }

    pub fn set_rate(&mut self, rate_hz: f32) {
        self.rate = rate_hz;
        self.lfo.set_rate(rate_hz, self.sample_rate);
    }

    pub fn set_depth(&mut self, depth: f32) {
        self.depth = depth.clamp(0.0, 1.0);
    }

    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = feedback.clamp(-0.95, 0.95);
    }

    pub fn set_mix(&mut self, mix: f32) {
        self.mix = mix.clamp(0.0, 1.0);
    }

    pub fn set_centre_frequency(&mut self, centre_hz: f32) {
        let centre = centre_hz.clamp(MIN_FREQUENCY, MAX_FREQUENCY);
        self.norm_centre = (centre / MIN_FREQUENCY).ln() / (MAX_FREQUENCY / MIN_FREQUENCY).ln();
    }

    fn update_coefficient(&mut self, lfo: f32) {
        let position = (self.norm_centre + self.depth * lfo * 0.5).clamp(0.0, 1.0);
        let frequency = MIN_FREQUENCY * (MAX_FREQUENCY / MIN_FREQUENCY).powf(position);
        let frequency = frequency.min(self.sample_rate * 0.49);
        let g = (PI * frequency / self.sample_rate).tan();
        self.coefficient = g / (1.0 + g);
    }

    /// Advance the shared LFO by one sample. Call once per frame before
    /// processing that frame's channels.
    #[inline]
    pub fn advance(&mut self) {
        let lfo = self.lfo.next_value();
        if self.update_counter == 0 {
            self.update_coefficient(lfo);
        }
        self.update_counter = (self.update_counter + 1) % UPDATE_INTERVAL;
    }

    /// Process one sample of `channel` (0 or 1) at the current LFO position.
    #[inline]
    pub fn process_sample(&mut self, channel: usize, dry: f32) -> f32 {
        let channel = channel.min(MAX_CHANNELS - 1);
        let mut wet = dry + self.feedback * self.last_output[channel];
        for stage in self.stages[channel].iter_mut() {
            wet = stage.process(wet, self.coefficient);
        }
        self.last_output[channel] = wet;

        crossfade(dry, wet, self.mix)
    }

    /// Zero all-pass and feedback state that has decayed to nothing.
    pub fn snap_to_zero(&mut self) {
        for channel in self.stages.iter_mut() {
            for stage in channel.iter_mut() {
                stage.s = denormal::snap_to_zero(stage.s);
            }
        }
        for last in self.last_output.iter_mut() {
            *last = denormal::snap_to_zero(*last);
        }
    }

    pub fn reset(&mut self) {
        self.stages = [[AllPassStage::default(); NUM_STAGES]; MAX_CHANNELS];
        self.last_output = [0.0; MAX_CHANNELS];
        self.lfo.reset();
        self.update_counter = 0;
    }

    pub fn mix(&self) -> f32 {
        self.mix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    const SAMPLE_RATE: f32 = 48_000.0;

    fn run_mono(phaser: &mut Phaser, input: &[f32]) -> Vec<f32> {
        input
            .iter()
            .map(|&x| {
                phaser.advance();
                phaser.process_sample(0, x)
            })
            .collect()
    }

    fn configured(depth: f32, rate: f32, feedback: f32, mix: f32) -> Phaser {
        let mut phaser = Phaser::new();
        phaser.set_sample_rate(SAMPLE_RATE);
        phaser.set_centre_frequency(1_200.0);
        phaser.set_depth(depth);
        phaser.set_rate(rate);
        phaser.set_feedback(feedback);
        phaser.set_mix(mix);
        phaser
    }

    #[test]
    fn allpass_chain_preserves_energy() {
        let mut phaser = configured(0.0, 0.5, 0.0, 1.0);
        let input: Vec<f32> = (0..8192)
            .map(|n| (TAU * 440.0 * n as f32 / SAMPLE_RATE).sin())
            .collect();

        let output = run_mono(&mut phaser, &input);

        let energy_in: f32 = input[4096..].iter().map(|x| x * x).sum();
        let energy_out: f32 = output[4096..].iter().map(|x| x * x).sum();
        assert!(
            (energy_out / energy_in - 1.0).abs() < 0.02,
            "all-pass changed magnitude: {}",
            energy_out / energy_in
        );
    }

    #[test]
    fn half_mix_notches_at_centre() {
        // With depth 0 the notches sit still; probe the chain's 180° point.
        let mut phaser = configured(0.0, 0.5, 0.0, 0.5);
        let mut deepest = f32::MAX;
        let mut loudest = 0.0f32;

        for freq in [100.0, 300.0, 600.0, 1_200.0, 2_400.0, 5_000.0, 10_000.0] {
            phaser.reset();
            let input: Vec<f32> = (0..8192)
                .map(|n| (TAU * freq * n as f32 / SAMPLE_RATE).sin())
                .collect();
            let output = run_mono(&mut phaser, &input);
            let peak = output[4096..].iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
            deepest = deepest.min(peak);
            loudest = loudest.max(peak);
        }

        assert!(loudest > deepest * 2.0, "no notch: {deepest} vs {loudest}");
    }

    #[test]
    fn feedback_stays_bounded() {
        let mut phaser = configured(1.0, 5.0, 0.95, 1.0);
        let mut rng = fastrand::Rng::with_seed(9);
        let input: Vec<f32> = (0..48_000).map(|_| rng.f32() * 2.0 - 1.0).collect();

        let output = run_mono(&mut phaser, &input);

        assert!(output.iter().all(|x| x.is_finite() && x.abs() < 100.0));
    }

    #[test]
    fn setters_clamp() {
        let mut phaser = Phaser::new();
        phaser.set_mix(3.0);
        assert_eq!(phaser.mix(), 1.0);
        phaser.set_feedback(-2.0);
        assert_eq!(phaser.feedback, -0.95);
        phaser.set_depth(-1.0);
        assert_eq!(phaser.depth, 0.0);
    }
}
