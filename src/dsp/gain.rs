//! Decibel to linear gain conversion.

/// Convert decibels to a linear gain factor. Anything at or below
/// `floor_db` maps to exactly zero so a fader pulled all the way down is
/// silent rather than merely quiet.
#[inline]
pub fn decibels_to_gain(db: f32, floor_db: f32) -> f32 {
    if db > floor_db {
        10.0_f32.powf(db * 0.05)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const FLOOR_DB: f32 = -60.0;

    #[test]
    fn unity_and_six_db() {
        assert_relative_eq!(decibels_to_gain(0.0, FLOOR_DB), 1.0);
        assert_relative_eq!(decibels_to_gain(-6.0, FLOOR_DB), 0.501_187, epsilon = 1e-5);
        assert_relative_eq!(decibels_to_gain(6.0, FLOOR_DB), 1.995_262, epsilon = 1e-5);
    }

    #[test]
    fn floor_is_silence() {
        assert_eq!(decibels_to_gain(FLOOR_DB, FLOOR_DB), 0.0);
        assert_eq!(decibels_to_gain(-90.0, FLOOR_DB), 0.0);
        assert!(decibels_to_gain(FLOOR_DB + 0.1, FLOOR_DB) > 0.0);
    }
}
