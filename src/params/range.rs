//! Value ranges with a skewed normalised mapping.
//!
//! Hosts and sliders work on a normalised position in `0.0..=1.0`. A linear
//! mapping wastes most of a frequency slider on the top octaves, so ranges
//! carry a skew factor:
//!
//! ```text
//! value    = min + (max − min) · p^(1/skew)
//! position = ((value − min) / (max − min))^skew
//! ```
//!
//! `skew < 1` spreads the low end of the range across more of the slider.
//! [`ParamRange::with_centre`] picks the skew that puts a given value at the
//! slider midpoint.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRange {
    pub min: f32,
    pub max: f32,
    pub skew: f32,
}

impl ParamRange {
    pub const fn linear(min: f32, max: f32) -> Self {
        Self { min, max, skew: 1.0 }
    }

    /// Range whose slider midpoint lands on `centre`.
    pub fn with_centre(min: f32, max: f32, centre: f32) -> Self {
        debug_assert!(max > min, "max must be greater than min");
        debug_assert!(centre > min && centre < max, "centre must lie inside the range");

        let proportion = (centre - min) / (max - min);
        Self {
            min,
            max,
            skew: 0.5_f32.ln() / proportion.ln(),
        }
    }

    /// Clamp into the range. `NaN` passes through; callers decide what it
    /// means.
    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }

    #[inline]
    pub fn contains(&self, value: f32) -> bool {
        (self.min..=self.max).contains(&value)
    }

    /// Value to slider position in `0.0..=1.0`.
    pub fn to_normalized(&self, value: f32) -> f32 {
        let span = self.max - self.min;
        if span <= 0.0 {
            return 0.0;
        }

        let proportion = ((self.clamp(value) - self.min) / span).clamp(0.0, 1.0);
        if self.skew == 1.0 {
            proportion
        } else {
            proportion.powf(self.skew)
        }
    }

    /// Slider position in `0.0..=1.0` to value.
    pub fn from_normalized(&self, position: f32) -> f32 {
        let mut position = position.clamp(0.0, 1.0);
        if self.skew != 1.0 && position > 0.0 {
            position = (position.ln() / self.skew).exp();
        }

        self.clamp(self.min + (self.max - self.min) * position)
    }
}
