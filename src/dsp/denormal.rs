//! Denormal protection.
//!
//! Recursive filters decay towards zero exponentially. Once their state drops
//! into the subnormal range every multiply can cost a hundred times more
//! cycles, which shows up as CPU spikes on quiet passages. Nodes call these
//! helpers once per block: `flush` on the output samples and `snap_to_zero`
//! on filter state.

/// Filter state below this magnitude is treated as silence. About -300 dB,
/// far under anything audible but well before the subnormal range.
pub const SNAP_THRESHOLD: f32 = 1.0e-15;

/// Zero a state variable that has decayed below [`SNAP_THRESHOLD`].
#[inline]
pub fn snap_to_zero(value: f32) -> f32 {
    if value.abs() < SNAP_THRESHOLD {
        0.0
    } else {
        value
    }
}

/// Replace every subnormal sample in the buffer with zero.
#[inline]
pub fn flush(buffer: &mut [f32]) {
    for sample in buffer.iter_mut() {
        if sample.is_subnormal() {
            *sample = 0.0;
        }
    }
}
