//! Smoothed parameter values for zipper-free automation.
//!
//! A control value that jumps between blocks produces an audible click (for
//! gain) or a burst of "zipper" noise (for filter cutoff). `SmoothedValue`
//! ramps linearly from the current value to a new target over a fixed time.
//!
//! ```
//! use next_dsp::dsp::smoother::SmoothedValue;
//!
//! let mut gain = SmoothedValue::new(1.0);
//! gain.reset(44_100.0, 0.020); // 20 ms ramps
//! gain.set_target(0.5);
//!
//! # let mut buffer = [0.0f32; 512];
//! for sample in buffer.iter_mut() {
//!     *sample *= gain.next_value();
//! }
//! ```

/// Linear-ramp smoother. Call [`next_value()`](SmoothedValue::next_value)
/// once per sample while [`is_smoothing()`](SmoothedValue::is_smoothing) is
/// true; once the ramp completes the value is exactly the target.
#[derive(Debug, Clone)]
pub struct SmoothedValue {
    current: f32,
    target: f32,
    step: f32,
    samples_remaining: u32,
    ramp_samples: u32,
}

impl SmoothedValue {
    pub fn new(initial: f32) -> Self {
        Self {
            current: initial,
            target: initial,
            step: 0.0,
            samples_remaining: 0,
            ramp_samples: 0,
        }
    }

    /// Configure the ramp length for a sample rate. Cancels any ramp in
    /// progress by jumping to the target.
    pub fn reset(&mut self, sample_rate: f32, ramp_secs: f32) {
        self.ramp_samples = (ramp_secs * sample_rate).round().max(0.0) as u32;
        self.skip_to_target();
    }

    /// Jump to `value` with no ramp.
    #[inline]
    pub fn set_current_and_target(&mut self, value: f32) {
        self.current = value;
        self.target = value;
        self.step = 0.0;
        self.samples_remaining = 0;
    }

    #[inline]
    pub fn set_target(&mut self, target: f32) {
        if (target - self.target).abs() <= f32::EPSILON * target.abs().max(1.0) {
            return;
        }

        self.target = target;

        if self.ramp_samples == 0 {
            self.set_current_and_target(target);
            return;
        }

        self.samples_remaining = self.ramp_samples;
        self.step = (self.target - self.current) / self.samples_remaining as f32;
    }

    /// Advance one sample and return the new value.
    #[inline]
    pub fn next_value(&mut self) -> f32 {
        if self.samples_remaining == 0 {
            return self.target;
        }

        self.samples_remaining -= 1;
        if self.samples_remaining == 0 {
            // Snap to target when done to avoid floating point drift
            self.current = self.target;
        } else {
            self.current += self.step;
        }

        self.current
    }

    /// Advance `samples` at once. Returns the value after the skip.
    #[inline]
    pub fn skip(&mut self, samples: usize) -> f32 {
        if samples as u64 >= self.samples_remaining as u64 {
            self.skip_to_target();
        } else {
            self.samples_remaining -= samples as u32;
            self.current += self.step * samples as f32;
        }
        self.current
    }

    #[inline]
    pub fn skip_to_target(&mut self) {
        self.current = self.target;
        self.step = 0.0;
        self.samples_remaining = 0;
    }

    #[inline]
    pub fn current(&self) -> f32 {
        self.current
    }

    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    #[inline]
    pub fn is_smoothing(&self) -> bool {
        self.samples_remaining > 0
    }
}

impl Default for SmoothedValue {
    fn default() -> Self {
        Self::new(0.0)
    }
}
