use std::f32::consts::PI;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::denormal;

/*
TPT State-Variable Filter
=========================

One 2-pole stage of the Zavalishin/Simper topology-preserving transform SVF.
Two trapezoidal integrators share state, so lowpass, bandpass and highpass
come out of the same update:

    g = tan(π · fc / fs)        prewarped integrator gain
    k = 1 / Q                   damping
    h = 1 / (1 + g·(g + k))

    v3 = x − ic2eq
    v1 = h · (ic1eq + g · v3)   bandpass
    v2 = ic2eq + g · v1         lowpass
    hp = x − k·v1 − v2          highpass

    ic1eq = 2·v1 − ic1eq
    ic2eq = 2·v2 − ic2eq

The prewarp puts the analog response exactly at fc, where the lowpass and
highpass gains are both Q (−3 dB for Q = 1/√2). Coefficients can change every
sample without blowing up, which is what the per-sample smoothing path in
FilterNode relies on.

| type      | passes       | rejects      | slope per stage |
| --------- | ------------ | ------------ | --------------- |
| low-pass  | below cutoff | above cutoff | 12 dB/oct       |
| high-pass | above cutoff | below cutoff | 12 dB/oct       |
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterType {
    #[default]
    LowPass,
    HighPass,
}

impl FilterType {
    /// Map a published mode index (0 = lowpass, anything else = highpass).
    pub fn from_index(index: usize) -> Self {
        match index {
            0 => FilterType::LowPass,
            _ => FilterType::HighPass,
        }
    }
}

pub struct FilterOutputs {
    pub lowpass: f32,
    pub bandpass: f32,
    pub highpass: f32,
}

#[derive(Debug, Clone)]
pub struct SVFilter {
    ic1eq: f32, // First integrator's memory
    ic2eq: f32, // Second integrator's memory

    g: f32,
    k: f32,
    h: f32,
    filter_type: FilterType,
}

impl Default for SVFilter {
    fn default() -> Self {
        Self::new(FilterType::LowPass)
    }
}

impl SVFilter {
    pub fn new(filter_type: FilterType) -> Self {
        let mut filter = Self {
            ic1eq: 0.0,
            ic2eq: 0.0,
            g: 0.0,
            k: 0.0,
            h: 0.0,
            filter_type,
        };
        filter.set_coefficients(1_000.0, std::f32::consts::FRAC_1_SQRT_2, 44_100.0);
        filter
    }

    pub fn lowpass() -> Self {
        Self::new(FilterType::LowPass)
    }

    pub fn highpass() -> Self {
        Self::new(FilterType::HighPass)
    }

    /// Integrator gain for a cutoff, clamped just below Nyquist so `tan`
    /// stays finite. A non-positive or non-finite sample rate gives 0.
    #[inline]
    pub fn compute_g(cutoff_hz: f32, sample_rate: f32) -> f32 {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return 0.0;
        }
        let nyquist_guard = sample_rate * 0.49;
        let fc = cutoff_hz.min(nyquist_guard).max(nyquist_guard.min(1.0));
        (PI * fc / sample_rate).tan()
    }

    /// Set coefficients from a precomputed `g` and `q`. Lets a cascade share
    /// one `tan` per sample across all of its stages.
    #[inline]
    pub fn set_g_q(&mut self, g: f32, q: f32) {
        self.g = g;
        self.k = 1.0 / q.max(1.0e-3);
        self.h = 1.0 / (1.0 + g * (g + self.k));
    }

    #[inline]
    pub fn set_coefficients(&mut self, cutoff_hz: f32, q: f32, sample_rate: f32) {
        let g = Self::compute_g(cutoff_hz, sample_rate);
        self.set_g_q(g, q);
    }

    /// Re-point the stage at a different response. State is kept, so the
    /// switch is a discrete step rather than a restart.
    pub fn set_type(&mut self, filter_type: FilterType) {
        self.filter_type = filter_type;
    }

    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }

    #[inline]
    pub fn next_outputs(&mut self, sample: f32) -> FilterOutputs {
        let v3 = sample - self.ic2eq;
        let v1 = self.h * (self.ic1eq + self.g * v3);
        let v2 = self.ic2eq + self.g * v1;

        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;

        FilterOutputs {
            lowpass: v2,
            bandpass: v1,
            highpass: sample - self.k * v1 - v2,
        }
    }

    /// Filter one sample with the current response.
    #[inline]
    pub fn process_sample(&mut self, sample: f32) -> f32 {
        let outputs = self.next_outputs(sample);
        match self.filter_type {
            FilterType::LowPass => outputs.lowpass,
            FilterType::HighPass => outputs.highpass,
        }
    }

    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process_sample(*sample);
        }
    }

    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }

    /// Zero integrator state that has decayed into the denormal range.
    pub fn snap_to_zero(&mut self) {
        self.ic1eq = denormal::snap_to_zero(self.ic1eq);
        self.ic2eq = denormal::snap_to_zero(self.ic2eq);
    }

    /// Integrator state, exposed so callers can verify a stage was untouched.
    pub fn state(&self) -> (f32, f32) {
        (self.ic1eq, self.ic2eq)
    }
}
