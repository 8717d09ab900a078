//! Low-level DSP primitives used by the plugin nodes.
//!
//! These components are allocation-free and realtime-safe, making them safe to
//! embed directly inside node and voice structs. They stay focused on the
//! signal-processing math; parameter hand-off, smoothing policy and buffer
//! handling live one layer up in `nodes`.

/// Denormal flushing for buffers and filter state.
pub mod denormal;
/// Attack/decay/sustain/release envelope generator.
pub mod envelope;
/// State-variable filter stage with lowpass/highpass responses.
pub mod filter;
/// Decibel and linear gain conversion.
pub mod gain;
/// Control-rate sine oscillator.
pub mod lfo;
/// Linear dry/wet crossfading.
pub mod mix;
/// Audio-rate oscillator waveforms and noise.
pub mod oscillator;
/// All-pass chain phaser.
pub mod phaser;
/// Linear-ramp parameter smoothing.
pub mod smoother;

pub use envelope::EnvelopeStage;
