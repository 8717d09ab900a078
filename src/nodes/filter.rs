use std::sync::Arc;

use crate::{
    dsp::{
        denormal,
        filter::{FilterType, SVFilter},
        smoother::SmoothedValue,
    },
    io::{midi::MidiEvent, AudioBuffer},
    nodes::{block_range, AudioNode, NodeKind, ProcessSpec, SMOOTHING_SECS},
    params::{ParamDescriptor, ParamRange, ParameterSet, Unit},
};

/*
Cascaded Filter Node
====================

Up to four 12 dB/oct SVF stages in series per channel:

  slope   stages   roll-off
  ─────   ──────   ────────
    0       1      12 dB/oct
    1       2      24 dB/oct
    2       3      36 dB/oct
    3       4      48 dB/oct

  x ──→ [SVF 0] ──→ [SVF 1] ──→ [SVF 2] ──→ [SVF 3] ──→ y
                               └─ only the first `slope + 1` run ─┘

Every stage runs at the same cutoff. A plain cascade would multiply the
per-stage gain at cutoff (two Butterworth stages give −6 dB, four give
−12 dB, and four resonant stages at Q = 6 would peak at +62 dB). Each stage
instead gets Q = resonance^(1/stages), so the whole cascade's gain at cutoff
equals `resonance` whatever the slope: −3 dB at the default 0.7071.

Frequency and resonance are smoothed over 20 ms. While either ramp is running
the coefficients are recomputed every sample (slow path); once both have
settled they are set once per block (fast path).

Mode (lowpass/highpass) is discrete. It is compared against the last applied
mode at the top of each block and applied to every stage at most once per
block. A restored session forces one re-apply even if the mode matches.
*/

pub const FREQUENCY: usize = 0;
pub const RESONANCE: usize = 1;
pub const MODE: usize = 2;
pub const SLOPE: usize = 3;

pub const MAX_STAGES: usize = 4;
pub const MAX_CHANNELS: usize = 2;

const MIN_FREQUENCY: f32 = 20.0;
const MAX_FREQUENCY: f32 = 20_000.0;
const MIN_RESONANCE: f32 = 0.3;
const MAX_RESONANCE: f32 = 6.0;

pub const MODE_LABELS: &[&str] = &["Lowpass", "Highpass"];
pub const SLOPE_LABELS: &[&str] = &["12 dB/oct", "24 dB/oct", "36 dB/oct", "48 dB/oct"];

pub fn parameters() -> [ParamDescriptor; 4] {
    [
        ParamDescriptor::continuous(
            "frequency",
            "Frequency",
            ParamRange::with_centre(MIN_FREQUENCY, MAX_FREQUENCY, 1_000.0),
            1_000.0,
            Unit::Hertz,
        ),
        ParamDescriptor::continuous(
            "resonance",
            "Resonance",
            ParamRange::with_centre(MIN_RESONANCE, MAX_RESONANCE, 1.0),
            std::f32::consts::FRAC_1_SQRT_2,
            Unit::Plain,
        ),
        ParamDescriptor::choice("mode", "Mode", MODE_LABELS, 0),
        ParamDescriptor::choice("slope", "Slope", SLOPE_LABELS, 1),
    ]
}

pub struct FilterNode {
    params: Arc<ParameterSet>,
    stages: [[SVFilter; MAX_STAGES]; MAX_CHANNELS],

    frequency: SmoothedValue,
    resonance: SmoothedValue,
    sample_rate: f32,

    applied_mode: FilterType,
    seen_generation: u32,
    active_stages: usize,
    mode_changes: u64,
}

impl Default for FilterNode {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterNode {
    pub fn new() -> Self {
        Self::with_params(Arc::new(ParameterSet::new(parameters())))
    }

    /// Build around an existing parameter set, e.g. one a UI already holds.
    pub fn with_params(params: Arc<ParameterSet>) -> Self {
        let mut node = Self {
            params,
            stages: std::array::from_fn(|_| std::array::from_fn(|_| SVFilter::lowpass())),
            frequency: SmoothedValue::new(1_000.0),
            resonance: SmoothedValue::new(std::f32::consts::FRAC_1_SQRT_2),
            sample_rate: ProcessSpec::default().sample_rate(),
            applied_mode: FilterType::LowPass,
            seen_generation: 0,
            active_stages: 2,
            mode_changes: 0,
        };
        node.initialise(ProcessSpec::default());
        node
    }

    /// Number of times the stages have been re-typed by a mode change or a
    /// restore.
    pub fn mode_changes(&self) -> u64 {
        self.mode_changes
    }

    pub fn active_stages(&self) -> usize {
        self.active_stages
    }

    pub fn stage(&self, channel: usize, index: usize) -> &SVFilter {
        &self.stages[channel][index]
    }

    fn frequency_snapshot(&self) -> f32 {
        self.params
            .snapshot(FREQUENCY)
            .clamp(MIN_FREQUENCY, MAX_FREQUENCY)
    }

    fn resonance_snapshot(&self) -> f32 {
        self.params
            .snapshot(RESONANCE)
            .clamp(MIN_RESONANCE, MAX_RESONANCE)
    }

    fn stages_snapshot(&self) -> usize {
        self.params.snapshot(SLOPE).clamp(0.0, (MAX_STAGES - 1) as f32) as usize + 1
    }

    fn mode_snapshot(&self) -> FilterType {
        FilterType::from_index(self.params.snapshot(MODE) as usize)
    }

    fn retype(&mut self, mode: FilterType) {
        for channel in self.stages.iter_mut() {
            for stage in channel.iter_mut() {
                stage.set_type(mode);
            }
        }
        self.applied_mode = mode;
    }

    #[inline]
    fn set_coefficients(&mut self, num_channels: usize, frequency: f32, resonance: f32) {
        let stages = self.active_stages;
        let g = SVFilter::compute_g(frequency, self.sample_rate);
        let q = resonance.powf(1.0 / stages as f32);
        for channel in self.stages[..num_channels].iter_mut() {
            for stage in channel[..stages].iter_mut() {
                stage.set_g_q(g, q);
            }
        }
    }

    #[inline]
    fn cascade(stages: &mut [SVFilter], sample: f32) -> f32 {
        stages
            .iter_mut()
            .fold(sample, |x, stage| stage.process_sample(x))
    }
}

impl AudioNode for FilterNode {
    fn kind(&self) -> NodeKind {
        NodeKind::Filter
    }

    fn params(&self) -> &Arc<ParameterSet> {
        &self.params
    }

    fn initialise(&mut self, spec: ProcessSpec) {
        self.sample_rate = spec.sample_rate();

        self.frequency.reset(spec.sample_rate(), SMOOTHING_SECS);
        self.frequency.set_current_and_target(self.frequency_snapshot());
        self.resonance.reset(spec.sample_rate(), SMOOTHING_SECS);
        self.resonance.set_current_and_target(self.resonance_snapshot());

        self.active_stages = self.stages_snapshot();
        self.seen_generation = self.params.restore_generation();
        let mode = self.mode_snapshot();
        self.retype(mode);
        self.reset();

        tracing::debug!(
            sample_rate = spec.sample_rate(),
            max_block_size = spec.max_block_size(),
            stages = self.active_stages,
            "filter initialised"
        );
    }

    fn reset(&mut self) {
        for channel in self.stages.iter_mut() {
            for stage in channel.iter_mut() {
                stage.reset();
            }
        }
        self.frequency.skip_to_target();
        self.resonance.skip_to_target();
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

        // Discrete state first, once per block. Generation before mode, so a
        // restore seen here brings its mode with it.
        let generation = self.params.restore_generation();
        let mode = self.mode_snapshot();
        if mode != self.applied_mode || generation != self.seen_generation {
            self.retype(mode);
            self.seen_generation = generation;
            self.mode_changes += 1;
        }

        let stages = self.stages_snapshot();
        if stages > self.active_stages {
            for channel in self.stages.iter_mut() {
                for stage in channel[self.active_stages..stages].iter_mut() {
                    stage.reset();
                }
            }
        }
        self.active_stages = stages;

        self.frequency.set_target(self.frequency_snapshot());
        self.resonance.set_target(self.resonance_snapshot());

        let num_channels = buffer.num_channels().min(MAX_CHANNELS);

        if !self.frequency.is_smoothing() && !self.resonance.is_smoothing() {
            let (frequency, resonance) = (self.frequency.current(), self.resonance.current());
            self.set_coefficients(num_channels, frequency, resonance);

            for channel in 0..num_channels {
                let cascade = &mut self.stages[channel][..stages];
                for sample in buffer.channel_mut(channel)[start..end].iter_mut() {
                    *sample = Self::cascade(cascade, *sample);
                }
            }
        } else {
            for i in start..end {
                let frequency = self.frequency.next_value();
                let resonance = self.resonance.next_value();
                self.set_coefficients(num_channels, frequency, resonance);

                for channel in 0..num_channels {
                    let sample = &mut buffer.channel_mut(channel)[i];
                    *sample = Self::cascade(&mut self.stages[channel][..stages], *sample);
                }
            }
        }

        for channel in 0..num_channels {
            denormal::flush(&mut buffer.channel_mut(channel)[start..end]);
            for stage in self.stages[channel][..stages].iter_mut() {
                stage.snap_to_zero();
            }
        }

        for channel in MAX_CHANNELS..buffer.num_channels() {
            buffer.channel_mut(channel)[start..end].fill(0.0);
        }
    }
}
