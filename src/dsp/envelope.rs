use crate::MIN_TIME;

/*
ADSR Envelope Implementation
============================

A linear ADSR envelope generator, the synth voice's amplitude control.

Vocabulary
----------

  level       The envelope's current output value (0.0 to 1.0). This multiplies
              the voice's oscillator output.

  stage       Which phase of the envelope we're in: Idle, Attack, Decay,
              Sustain, or Release.

  gate        note_on opens the gate (Attack), note_off closes it (Release).

  rate        How much `level` changes per sample. Derived from the stage
              duration and the sample rate.


The Shape: Linear Ramps
-----------------------

  Level
    1.0 ┐     ╱╲
        │    ╱  ╲___________
    S   │   ╱               ╲
        │  ╱                 ╲
    0.0 └─╱───────────────────╲──→ Time
        Attack Decay  Sustain  Release

  attack_rate  = 1 / (attack · sr)                  0 → 1
  decay_rate   = (1 − sustain) / (decay · sr)       1 → sustain
  release_rate = level_at_note_off / (release · sr) level → 0

The release rate is taken from the level at the moment the gate closes, so a
note released during its attack fades out in exactly `release` seconds
instead of jumping to the sustain level first.


Parameter Changes
-----------------

ADSR times arrive once per block from the synth's parameter snapshot. Rates
are recomputed on every `set_parameters` call, so a change lands on the next
block without restarting the stage. Sustain tracks its parameter live: a
voice holding at sustain follows the new level immediately.


The State Machine
-----------------

    Idle ──note_on──→ Attack ──level=1──→ Decay ──level=S──→ Sustain
     ↑                  │                   │                   │
     │                  └──────note_off─────┴───────note_off────┤
     │                                                          ↓
     └────────────────────────level=0─────────────────────── Release

note_off moves to Release from any stage. Once the release ramp hits zero
the envelope reports inactive, which is the voice's cue to free itself.
*/

/// The current stage of the envelope state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeStage {
    Idle,
    Attack,
    Decay,
    Sustain,
    Release,
}

/// ADSR times in seconds and sustain level in 0.0..=1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdsrParameters {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
}

impl Default for AdsrParameters {
    fn default() -> Self {
        Self {
            attack: 0.01,
            decay: 0.1,
            sustain: 0.8,
            release: 0.3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Envelope {
    parameters: AdsrParameters,
    sample_rate: f32,

    attack_rate: f32,
    decay_rate: f32,
    release_rate: f32,

    stage: EnvelopeStage,
    level: f32,
}

impl Default for Envelope {
    fn default() -> Self {
        Self::new()
    }
}

impl Envelope {
    pub fn new() -> Self {
        let mut env = Self {
            parameters: AdsrParameters::default(),
            sample_rate: 44_100.0,
            attack_rate: 0.0,
            decay_rate: 0.0,
            release_rate: 0.0,
            stage: EnvelopeStage::Idle,
            level: 0.0,
        };
        env.recalculate_rates();
        env
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.recalculate_rates();
    }

    pub fn set_parameters(&mut self, parameters: AdsrParameters) {
        let parameters = AdsrParameters {
            attack: parameters.attack.max(0.0),
            decay: parameters.decay.max(0.0),
            sustain: parameters.sustain.clamp(0.0, 1.0),
            release: parameters.release.max(0.0),
        };
        if parameters == self.parameters {
            return;
        }
        self.parameters = parameters;
        self.recalculate_rates();
    }

    pub fn parameters(&self) -> AdsrParameters {
        self.parameters
    }

    fn rate_for(&self, distance: f32, seconds: f32) -> f32 {
        if seconds <= MIN_TIME {
            // Shorter than a sample: finish the stage in one step
            f32::INFINITY
        } else {
            distance / (seconds * self.sample_rate)
        }
    }

    fn recalculate_rates(&mut self) {
        self.attack_rate = self.rate_for(1.0, self.parameters.attack);
        self.decay_rate = self.rate_for(1.0 - self.parameters.sustain, self.parameters.decay);

        if self.stage == EnvelopeStage::Release {
            self.release_rate = self.rate_for(self.level, self.parameters.release);
        }

        if self.stage == EnvelopeStage::Sustain {
            self.level = self.parameters.sustain;
        }
    }

    /// Gate high: restart from zero at the attack stage.
    pub fn note_on(&mut self) {
        self.level = 0.0;
        self.stage = if self.attack_rate.is_finite() {
            EnvelopeStage::Attack
        } else {
            self.level = 1.0;
            self.first_stage_after_attack()
        };
    }

    /// Gate low: start the release from the current level. From level zero
    /// the release finishes on the next sample.
    pub fn note_off(&mut self) {
        if self.stage == EnvelopeStage::Idle {
            return;
        }

        self.release_rate = self.rate_for(self.level, self.parameters.release);
        self.stage = EnvelopeStage::Release;
    }

    fn first_stage_after_attack(&self) -> EnvelopeStage {
        if self.decay_rate > 0.0 {
            EnvelopeStage::Decay
        } else {
            EnvelopeStage::Sustain
        }
    }

    /// Advance the envelope by one sample and return the new level.
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        match self.stage {
            EnvelopeStage::Idle => {
                self.level = 0.0;
            }

            EnvelopeStage::Attack => {
                self.level += self.attack_rate;

                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.stage = self.first_stage_after_attack();
                }
            }

            EnvelopeStage::Decay => {
                self.level -= self.decay_rate;

                if self.level <= self.parameters.sustain {
                    self.level = self.parameters.sustain;
                    self.stage = EnvelopeStage::Sustain;
                }
            }

            EnvelopeStage::Sustain => {
                self.level = self.parameters.sustain;
            }

            EnvelopeStage::Release => {
                self.level -= self.release_rate;

                if self.level <= 0.0 {
                    self.reset();
                }
            }
        }

        debug_assert!((0.0..=1.0).contains(&self.level));
        self.level
    }

    /// Render a block of envelope values into the buffer.
    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample();
        }
    }

    /// Returns true until the release tail has fully decayed.
    pub fn is_active(&self) -> bool {
        self.stage != EnvelopeStage::Idle
    }

    pub fn reset(&mut self) {
        self.stage = EnvelopeStage::Idle;
        self.level = 0.0;
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn stage(&self) -> EnvelopeStage {
        self.stage
    }
}
