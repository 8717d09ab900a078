use std::sync::Arc;

use crate::{
    dsp::{denormal, phaser::Phaser},
    io::{midi::MidiEvent, AudioBuffer},
    nodes::{block_range, AudioNode, NodeKind, ProcessSpec},
    params::{ParamDescriptor, ParamRange, ParameterSet, Unit},
};

pub const DEPTH: usize = 0;
pub const RATE: usize = 1;
pub const FEEDBACK: usize = 2;
pub const MIX: usize = 3;

pub const MAX_CHANNELS: usize = crate::dsp::phaser::MAX_CHANNELS;

/// Fixed centre of the notch sweep.
pub const CENTRE_FREQUENCY: f32 = 1_200.0;

pub fn parameters() -> [ParamDescriptor; 4] {
    [
        ParamDescriptor::continuous("depth", "Depth", ParamRange::linear(0.0, 1.0), 0.5, Unit::Percent),
        ParamDescriptor::continuous(
            "rate",
            "Rate",
            ParamRange::with_centre(0.02, 10.0, 1.0),
            0.5,
            Unit::Hertz,
        ),
        ParamDescriptor::continuous(
            "feedback",
            "Feedback",
            ParamRange::linear(-0.95, 0.95),
            0.0,
            Unit::Percent,
        ),
        ParamDescriptor::continuous("mix", "Mix", ParamRange::linear(0.0, 1.0), 0.5, Unit::Percent),
    ]
}

/// Six-stage phaser. All four parameters are picked up once per block.
pub struct PhaserNode {
    params: Arc<ParameterSet>,
    phaser: Phaser,
}

impl Default for PhaserNode {
    fn default() -> Self {
        Self::new()
    }
}

impl PhaserNode {
    pub fn new() -> Self {
        Self::with_params(Arc::new(ParameterSet::new(parameters())))
    }

    pub fn with_params(params: Arc<ParameterSet>) -> Self {
        let mut node = Self {
            params,
            phaser: Phaser::new(),
        };
        node.initialise(ProcessSpec::default());
        node
    }

    fn apply_parameters(&mut self) {
        self.phaser.set_depth(self.params.snapshot(DEPTH));
        self.phaser.set_rate(self.params.snapshot(RATE).clamp(0.02, 10.0));
        self.phaser.set_feedback(self.params.snapshot(FEEDBACK));
        self.phaser.set_mix(self.params.snapshot(MIX));
    }
}

impl AudioNode for PhaserNode {
    fn kind(&self) -> NodeKind {
        NodeKind::Phaser
    }

    fn params(&self) -> &Arc<ParameterSet> {
        &self.params
    }

    fn initialise(&mut self, spec: ProcessSpec) {
        self.phaser.set_sample_rate(spec.sample_rate());
        self.phaser.set_centre_frequency(CENTRE_FREQUENCY);
        self.apply_parameters();
        self.phaser.reset();

        tracing::debug!(sample_rate = spec.sample_rate(), "phaser initialised");
    }

    fn reset(&mut self) {
        self.phaser.reset();
    }

    fn apply_to_buffer(
        &mut self,
        buffer: Option<&mut AudioBuffer>,
        start_sample: usize,
        num_samples: usize,
        _midi: &[MidiEvent],
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
        let end = start + len;

        self.apply_parameters();

        match buffer.stereo_mut() {
            Some((left, right)) => {
                for (l, r) in left[start..end].iter_mut().zip(right[start..end].iter_mut()) {
                    self.phaser.advance();
                    *l = self.phaser.process_sample(0, *l);
                    *r = self.phaser.process_sample(1, *r);
                }
            }
            None => {
                for sample in buffer.channel_mut(0)[start..end].iter_mut() {
                    self.phaser.advance();
                    *sample = self.phaser.process_sample(0, *sample);
                }
            }
        }

        let num_channels = buffer.num_channels();
        for channel in 0..num_channels.min(MAX_CHANNELS) {
            denormal::flush(&mut buffer.channel_mut(channel)[start..end]);
        }
        self.phaser.snap_to_zero();

        for channel in MAX_CHANNELS..num_channels {
            buffer.channel_mut(channel)[start..end].fill(0.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noise(channels: usize, frames: usize) -> AudioBuffer {
        let mut rng = fastrand::Rng::with_seed(5);
        AudioBuffer::from_channels(
            (0..channels)
                .map(|_| (0..frames).map(|_| rng.f32() * 2.0 - 1.0).collect())
                .collect(),
        )
    }

    #[test]
    fn dry_mix_is_bit_exact_passthrough() {
        let mut node = PhaserNode::new();
        node.params().publish("mix", 0.0);
        node.params().publish("feedback", 0.9);

        let mut buffer = noise(2, 1_024);
        let before = buffer.clone();
        node.apply_to_buffer(Some(&mut buffer), 0, 1_024, &[]);

        assert_eq!(buffer.channel(0), before.channel(0));
        assert_eq!(buffer.channel(1), before.channel(1));
    }

    #[test]
    fn full_wet_changes_the_signal() {
        let mut node = PhaserNode::new();
        node.params().publish("mix", 1.0);
        node.params().publish("rate", 2.0);

        let mut buffer = noise(2, 1_024);
        let before = buffer.clone();
        node.apply_to_buffer(Some(&mut buffer), 0, 1_024, &[]);

        assert_ne!(buffer.channel(0), before.channel(0));
        assert!(buffer.channel(0).iter().all(|s| s.is_finite()));
    }

    #[test]
    fn mono_and_extra_channels() {
        let mut node = PhaserNode::new();

        let mut mono = noise(1, 256);
        let before = mono.clone();
        node.apply_to_buffer(Some(&mut mono), 0, 256, &[]);
        assert_ne!(mono.channel(0), before.channel(0));

        let mut wide = noise(3, 256);
        node.apply_to_buffer(Some(&mut wide), 0, 256, &[]);
        assert!(wide.channel(2).iter().all(|&s| s == 0.0));
    }

    #[test]
    fn disabled_is_a_no_op() {
        let mut node = PhaserNode::new();
        node.params().set_enabled(false);
        let mut buffer = noise(2, 128);
        let before = buffer.clone();
        node.apply_to_buffer(Some(&mut buffer), 0, 128, &[]);
        assert_eq!(buffer.channel(0), before.channel(0));
    }
}
