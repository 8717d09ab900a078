use std::f32::consts::FRAC_1_SQRT_2;

use crate::dsp::{
    envelope::{AdsrParameters, Envelope},
    filter::SVFilter,
    oscillator::{note_to_frequency, Oscillator, Waveform},
};

/*
Voice lifecycle
===============

    Idle ──note-on──→ Sounding ──note-off (key down, same note)──→ Releasing
     ↑                   │                                            │
     │                   └──────────── all sound off ────────────────┤
     └──────────────── envelope finished / all sound off ─────────────┘

A voice only answers to the note it was started with. The owning synth
checks `is_idle()` before starting one; a voice that is already sounding is
never restarted by a new note.
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Idle,      // Available for allocation
    Sounding,  // Key held, envelope in attack/decay/sustain
    Releasing, // Key released, envelope in release
}

/// At or above this cutoff the per-voice lowpass is skipped entirely.
pub const CUTOFF_BYPASS_HZ: f32 = 20_000.0;

/// One monophonic voice: oscillator → envelope × velocity → lowpass.
#[derive(Debug, Clone)]
pub struct Voice {
    state: VoiceState,
    key_down: bool,
    note: u8,
    velocity: f32, // 0.0..=1.0
    sample_rate: f32,

    oscillator: Oscillator,
    envelope: Envelope,
    filter: SVFilter,
    filter_bypassed: bool,
}

impl Voice {
    pub fn new(seed: u64) -> Self {
        Self {
            state: VoiceState::Idle,
            key_down: false,
            note: 0,
            velocity: 0.0,
            sample_rate: 44_100.0,
            oscillator: Oscillator::new(seed),
            envelope: Envelope::new(),
            filter: SVFilter::lowpass(),
            filter_bypassed: true,
        }
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.envelope.set_sample_rate(sample_rate);
    }

    pub fn set_envelope(&mut self, parameters: AdsrParameters) {
        self.envelope.set_parameters(parameters);
    }

    pub fn set_cutoff(&mut self, cutoff_hz: f32) {
        let bypass = cutoff_hz >= CUTOFF_BYPASS_HZ;
        if bypass && !self.filter_bypassed {
            self.filter.reset();
        }
        self.filter_bypassed = bypass;
        if !bypass {
            self.filter
                .set_coefficients(cutoff_hz, FRAC_1_SQRT_2, self.sample_rate);
        }
    }

    /// Recompute the phase increment from the held note and a tuning offset.
    pub fn set_tune(&mut self, tune_semitones: f32) {
        self.oscillator
            .set_frequency(note_to_frequency(self.note, tune_semitones), self.sample_rate);
    }

    /// Start `note` from phase zero and the top of the attack.
    pub fn start(&mut self, note: u8, velocity: u8, tune_semitones: f32) {
        self.note = note;
        self.velocity = velocity.min(127) as f32 / 127.0;
        self.key_down = true;
        self.state = VoiceState::Sounding;

        self.oscillator.reset_phase();
        self.set_tune(tune_semitones);
        self.filter.reset();
        self.envelope.note_on();
    }

    /// Note-off for `note`. Returns true if this voice let go.
    pub fn stop(&mut self, note: u8) -> bool {
        if self.note != note || !self.key_down {
            return false;
        }
        self.release();
        true
    }

    /// Enter the release regardless of which note is held.
    pub fn release(&mut self) {
        if self.state != VoiceState::Sounding {
            return;
        }
        self.key_down = false;
        self.state = VoiceState::Releasing;
        self.envelope.note_off();
    }

    /// Silence immediately.
    pub fn reset(&mut self) {
        self.state = VoiceState::Idle;
        self.key_down = false;
        self.envelope.reset();
        self.filter.reset();
        self.oscillator.reset_phase();
    }

    /// Add this voice into `out`. The envelope is checked after every
    /// sample; once it finishes the voice goes idle and stops writing.
    #[inline]
    pub fn render_add(&mut self, waveform: Waveform, out: &mut [f32]) {
        if self.state == VoiceState::Idle {
            return;
        }

        for sample in out.iter_mut() {
            let level = self.envelope.next_sample();
            let raw = self.oscillator.next_sample(waveform) * level * self.velocity;
            *sample += if self.filter_bypassed {
                raw
            } else {
                self.filter.process_sample(raw)
            };

            if !self.envelope.is_active() {
                self.state = VoiceState::Idle;
                self.key_down = false;
                self.filter.reset();
                break;
            }
        }

        self.filter.snap_to_zero();
    }

    pub fn is_idle(&self) -> bool {
        self.state == VoiceState::Idle
    }

    pub fn is_active(&self) -> bool {
        !self.is_idle()
    }

    pub fn is_key_down(&self) -> bool {
        self.key_down
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }

    pub fn note(&self) -> u8 {
        self.note
    }

    pub fn envelope_level(&self) -> f32 {
        self.envelope.level()
    }
}
