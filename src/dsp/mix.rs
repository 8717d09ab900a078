//! Signal mixing and crossfading primitives.

/*
Dry/Wet Mixing
==============

Effects blend the unprocessed (dry) signal with the processed (wet) signal
using complementary weights:

    output = dry × (1 − balance) + wet × balance

  balance = 0.0  →  100% dry (the effect is transparent)
  balance = 0.5  →  50% dry, 50% wet
  balance = 1.0  →  100% wet

The weights always sum to 1.0, so two full-scale inputs never exceed full
scale. For a phaser the interesting sound is the interference between the
two paths: at 50/50 the all-pass phase shift cancels the dry signal at the
notch frequencies, which is what carves the moving notches.

This is LINEAR crossfading. Equal-power curves (sqrt or sin/cos weights) keep
perceived loudness constant for uncorrelated signals, but dry and wet here
are strongly correlated, so linear weights give the deepest notches.
*/

/// Linear crossfade between `dry` and `wet`.
///
/// At `balance = 0.0` this returns `dry` bit-for-bit.
#[inline]
pub fn crossfade(dry: f32, wet: f32, balance: f32) -> f32 {
    (dry * (1.0 - balance)) + (wet * balance)
}
