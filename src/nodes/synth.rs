use std::sync::Arc;

use crate::{
    dsp::{
        denormal,
        envelope::AdsrParameters,
        gain::decibels_to_gain,
        oscillator::Waveform,
        smoother::SmoothedValue,
    },
    io::{converter::midi_to_synth, midi::MidiEvent, AudioBuffer},
    nodes::{block_range, AudioNode, NodeKind, ProcessSpec, SMOOTHING_SECS},
    params::{ParamDescriptor, ParamRange, ParameterSet, Unit},
    synth::{message::SynthMessage, voice::Voice},
};

/*
Polyphonic Synth Node
=====================

  MIDI ──→ voice allocation ──→ ┌ voice 0  ┐
                                │ voice 1  │   Σ   ┌────────────┐   ┌──→ L
                                │   ...    │ ────→ │ × gain(dB) │ ──┤
                                └ voice 15 ┘       └────────────┘   └──→ R
                                            mono accumulator

Each block handles its MIDI first, in order, then renders. A note-on takes
the first idle voice in array order; with all sixteen busy the note is
dropped. Nothing is stolen, so a held chord never loses a note to a newer
one.

The voices share a mono accumulator sized at `initialise`. Blocks longer
than that are rendered in accumulator-sized chunks, so the render path never
allocates. The summed signal is scaled by the master level, smoothed over
20 ms, and copied to both output channels.
*/

pub const WAVEFORM: usize = 0;
pub const TUNE: usize = 1;
pub const LEVEL: usize = 2;
pub const ATTACK: usize = 3;
pub const DECAY: usize = 4;
pub const SUSTAIN: usize = 5;
pub const RELEASE: usize = 6;
pub const CUTOFF: usize = 7;

pub const NUM_VOICES: usize = 16;

/// The level parameter's floor. At this setting the synth is silent.
pub const MIN_LEVEL_DB: f32 = -60.0;

pub const WAVEFORM_LABELS: &[&str] = &["Sine", "Triangle", "Saw", "Square", "Noise"];

pub fn parameters() -> [ParamDescriptor; 8] {
    [
        ParamDescriptor::choice("waveform", "Waveform", WAVEFORM_LABELS, 2),
        ParamDescriptor::continuous("tune", "Tune", ParamRange::linear(-24.0, 24.0), 0.0, Unit::Semitones),
        ParamDescriptor::continuous(
            "level",
            "Level",
            ParamRange::linear(MIN_LEVEL_DB, 6.0),
            -6.0,
            Unit::Decibels,
        ),
        ParamDescriptor::continuous(
            "attack",
            "Attack",
            ParamRange::with_centre(0.001, 5.0, 0.25),
            0.01,
            Unit::Seconds,
        ),
        ParamDescriptor::continuous(
            "decay",
            "Decay",
            ParamRange::with_centre(0.001, 5.0, 0.25),
            0.1,
            Unit::Seconds,
        ),
        ParamDescriptor::continuous("sustain", "Sustain", ParamRange::linear(0.0, 1.0), 0.8, Unit::Percent),
        ParamDescriptor::continuous(
            "release",
            "Release",
            ParamRange::with_centre(0.001, 10.0, 0.5),
            0.3,
            Unit::Seconds,
        ),
        ParamDescriptor::continuous(
            "cutoff",
            "Cutoff",
            ParamRange::with_centre(20.0, 20_000.0, 1_000.0),
            20_000.0,
            Unit::Hertz,
        ),
    ]
}

pub struct SynthNode {
    params: Arc<ParameterSet>,
    voices: [Voice; NUM_VOICES],
    accumulator: Vec<f32>,
    gain: SmoothedValue,
    sample_rate: f32,
}

impl Default for SynthNode {
    fn default() -> Self {
        Self::new()
    }
}

impl SynthNode {
    pub fn new() -> Self {
        Self::with_params(Arc::new(ParameterSet::new(parameters())))
    }

    pub fn with_params(params: Arc<ParameterSet>) -> Self {
        let mut node = Self {
            params,
            voices: std::array::from_fn(|index| Voice::new(0x5EED + index as u64)),
            accumulator: Vec::new(),
            gain: SmoothedValue::new(0.0),
            sample_rate: ProcessSpec::default().sample_rate(),
        };
        node.initialise(ProcessSpec::default());
        node
    }

    pub fn active_voice_count(&self) -> usize {
        self.voices.iter().filter(|voice| voice.is_active()).count()
    }

    pub fn voice(&self, index: usize) -> &Voice {
        &self.voices[index]
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    fn level_gain(&self) -> f32 {
        decibels_to_gain(self.params.snapshot(LEVEL), MIN_LEVEL_DB)
    }

    fn tune(&self) -> f32 {
        self.params.snapshot(TUNE).clamp(-24.0, 24.0)
    }

    fn envelope_parameters(&self) -> AdsrParameters {
        AdsrParameters {
            attack: self.params.snapshot(ATTACK),
            decay: self.params.snapshot(DECAY),
            sustain: self.params.snapshot(SUSTAIN),
            release: self.params.snapshot(RELEASE),
        }
    }

    /// Push block-rate parameters into every voice.
    fn update_voices(&mut self) {
        let envelope = self.envelope_parameters();
        let cutoff = self.params.snapshot(CUTOFF);
        let tune = self.tune();

        for voice in self.voices.iter_mut() {
            voice.set_envelope(envelope);
            voice.set_cutoff(cutoff);
            if voice.is_active() {
                voice.set_tune(tune);
            }
        }
    }

    fn handle_message(&mut self, message: SynthMessage) {
        match message {
            SynthMessage::NoteOn { note, velocity } => {
                let tune = self.tune();
                if let Some(voice) = self.voices.iter_mut().find(|voice| voice.is_idle()) {
                    voice.start(note, velocity, tune);
                }
            }
            SynthMessage::NoteOff { note } => {
                if let Some(voice) = self
                    .voices
                    .iter_mut()
                    .find(|voice| voice.is_key_down() && voice.note() == note)
                {
                    voice.stop(note);
                }
            }
            SynthMessage::AllNotesOff => {
                for voice in self.voices.iter_mut() {
                    voice.release();
                }
            }
            SynthMessage::AllSoundOff => {
                for voice in self.voices.iter_mut() {
                    voice.reset();
                }
            }
        }
    }

    /// Feed one message without a render call, e.g. from a host that
    /// delivers events separately from audio.
    pub fn handle_event(&mut self, event: MidiEvent) {
        if let Some(message) = midi_to_synth(event, None) {
            self.handle_message(message);
        }
    }
}

impl AudioNode for SynthNode {
    fn kind(&self) -> NodeKind {
        NodeKind::Synth
    }

    fn params(&self) -> &Arc<ParameterSet> {
        &self.params
    }

    fn initialise(&mut self, spec: ProcessSpec) {
        self.sample_rate = spec.sample_rate();
        self.accumulator.clear();
        self.accumulator.resize(spec.max_block_size().max(1), 0.0);

        self.gain.reset(spec.sample_rate(), SMOOTHING_SECS);
        self.gain.set_current_and_target(self.level_gain());

        for voice in self.voices.iter_mut() {
            voice.set_sample_rate(spec.sample_rate());
        }
        self.update_voices();
        self.reset();

        tracing::debug!(
            sample_rate = spec.sample_rate(),
            max_block_size = spec.max_block_size(),
            voices = NUM_VOICES,
            "synth initialised"
        );
    }

    fn reset(&mut self) {
        for voice in self.voices.iter_mut() {
            voice.reset();
        }
        self.accumulator.fill(0.0);
        self.gain.skip_to_target();
    }

    fn apply_to_buffer(
        &mut self,
        buffer: Option<&mut AudioBuffer>,
        start_sample: usize,
        num_samples: usize,
        midi: &[MidiEvent],
    ) {
        let Some(buffer) = buffer else {
            return;
        };
        if !self.params.is_enabled() {
            return;
        }
        let Some((start, len)) = block_range(buffer, start_sample, num_samples) else {
            return;
        };

        for &event in midi {
            self.handle_event(event);
        }

        self.update_voices();
        self.gain.set_target(self.level_gain());
        let waveform = Waveform::from_index(self.params.snapshot(WAVEFORM) as usize);

        let chunk_size = self.accumulator.len();
        let mut offset = start;
        let end = start + len;

        while offset < end {
            let frames = chunk_size.min(end - offset);
            let mix = &mut self.accumulator[..frames];
            mix.fill(0.0);

            for voice in self.voices.iter_mut() {
                voice.render_add(waveform, mix);
            }

            for sample in mix.iter_mut() {
                *sample *= self.gain.next_value();
            }
            denormal::flush(mix);

            match buffer.stereo_mut() {
                Some((left, right)) => {
                    left[offset..offset + frames].copy_from_slice(mix);
                    right[offset..offset + frames].copy_from_slice(mix);
                }
                None => buffer.channel_mut(0)[offset..offset + frames].copy_from_slice(mix),
            }

            offset += frames;
        }

        for channel in 2..buffer.num_channels() {
            buffer.channel_mut(channel)[start..end].fill(0.0);
        }
    }
}
