//! Plugin-level processors and the lifecycle every host drives them through.
//!
//! ```text
//!   control thread                          render thread
//!   ──────────────                          ─────────────
//!   Node::new(kind) ──→ initialise(spec)
//!   params().publish(..)   ┐
//!   restore_state(..)      ├── atomics ──→  apply_to_buffer(..) per block
//!                          ┘
//!   reset() / deinitialise()  (render thread quiescent)
//! ```

use std::{fmt, str::FromStr, sync::Arc};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    io::{midi::MidiEvent, AudioBuffer},
    params::{ParameterSet, PersistedState},
    MAX_BLOCK_SIZE,
};

pub mod filter;
pub mod phaser;
pub mod synth;

pub use filter::FilterNode;
pub use phaser::PhaserNode;
pub use synth::SynthNode;

/// Ramp time for smoothed continuous parameters.
pub(crate) const SMOOTHING_SECS: f32 = 0.020;

/// Sample rate and the largest block a host will ask for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessSpec {
    sample_rate: f32,
    max_block_size: usize,
}

impl ProcessSpec {
    pub const MIN_SAMPLE_RATE: f32 = 8_000.0;
    pub const MAX_SAMPLE_RATE: f32 = 384_000.0;

    pub fn new(sample_rate: f32, max_block_size: usize) -> Result<Self> {
        if !sample_rate.is_finite()
            || !(Self::MIN_SAMPLE_RATE..=Self::MAX_SAMPLE_RATE).contains(&sample_rate)
        {
            return Err(Error::InvalidSampleRate(sample_rate));
        }

        if !(1..=MAX_BLOCK_SIZE).contains(&max_block_size) {
            return Err(Error::InvalidBlockSize(max_block_size));
        }

        Ok(Self {
            sample_rate,
            max_block_size,
        })
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn max_block_size(&self) -> usize {
        self.max_block_size
    }
}

impl Default for ProcessSpec {
    fn default() -> Self {
        Self {
            sample_rate: 44_100.0,
            max_block_size: 512,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Filter,
    Phaser,
    Synth,
}

impl NodeKind {
    pub const ALL: [NodeKind; 3] = [NodeKind::Filter, NodeKind::Phaser, NodeKind::Synth];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Filter => "filter",
            NodeKind::Phaser => "phaser",
            NodeKind::Synth => "synth",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        NodeKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnknownNodeKind(s.to_string()))
    }
}

/// Lifecycle shared by every node.
///
/// `initialise`, `reset` and `deinitialise` run while the render thread is
/// idle and may allocate. `apply_to_buffer` runs on the render thread and
/// must not allocate, lock, log or fail.
pub trait AudioNode: Send {
    fn kind(&self) -> NodeKind;

    /// Shared parameter storage. Clone the `Arc` to hand it to a control
    /// surface.
    fn params(&self) -> &Arc<ParameterSet>;

    /// Prepare for `spec`. Calling it again re-prepares from scratch.
    fn initialise(&mut self, spec: ProcessSpec);

    /// Silence all internal state. Parameters are untouched.
    fn reset(&mut self);

    fn deinitialise(&mut self) {
        self.reset();
    }

    /// Process `num_samples` frames of `buffer` in place starting at
    /// `start_sample`. `midi` is handled before any audio. A missing buffer,
    /// an empty range or a disabled node makes this a no-op.
    fn apply_to_buffer(
        &mut self,
        buffer: Option<&mut AudioBuffer>,
        start_sample: usize,
        num_samples: usize,
        midi: &[MidiEvent],
    );

    /// Load a persisted state into the parameter set. The next block picks
    /// the values up as if they had been published directly.
    fn restore_state(&self, state: &PersistedState) {
        if state.kind != self.kind() {
            tracing::warn!(
                expected = %self.kind(),
                found = %state.kind,
                "ignoring persisted state for a different node kind"
            );
            return;
        }
        self.params().restore(state);
    }

    fn persisted_state(&self) -> PersistedState {
        self.params().persisted(self.kind())
    }

    /// Host panic button: stop every sound now.
    fn midi_panic(&mut self) {
        self.reset();
    }
}

/// Clip a processing request to the buffer. `None` when there is nothing to
/// do.
#[inline]
pub(crate) fn block_range(
    buffer: &AudioBuffer,
    start_sample: usize,
    num_samples: usize,
) -> Option<(usize, usize)> {
    let frames = buffer.num_frames();
    if num_samples == 0 || start_sample >= frames || buffer.num_channels() == 0 {
        return None;
    }
    Some((start_sample, num_samples.min(frames - start_sample)))
}

/// One of the three processors, chosen at construction.
pub enum Node {
    Filter(FilterNode),
    Phaser(PhaserNode),
    Synth(SynthNode),
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Filter => Node::Filter(FilterNode::new()),
            NodeKind::Phaser => Node::Phaser(PhaserNode::new()),
            NodeKind::Synth => Node::Synth(SynthNode::new()),
        }
    }

    /// Construct the node `state` was saved from and restore it.
    pub fn from_state(state: &PersistedState) -> Self {
        let node = Self::new(state.kind);
        node.restore_state(state);
        node
    }

    fn inner(&self) -> &dyn AudioNode {
        match self {
            Node::Filter(node) => node,
            Node::Phaser(node) => node,
            Node::Synth(node) => node,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn AudioNode {
        match self {
            Node::Filter(node) => node,
            Node::Phaser(node) => node,
            Node::Synth(node) => node,
        }
    }
}

impl AudioNode for Node {
    fn kind(&self) -> NodeKind {
        match self {
            Node::Filter(_) => NodeKind::Filter,
            Node::Phaser(_) => NodeKind::Phaser,
            Node::Synth(_) => NodeKind::Synth,
        }
    }

    fn params(&self) -> &Arc<ParameterSet> {
        self.inner().params()
    }

    fn initialise(&mut self, spec: ProcessSpec) {
        self.inner_mut().initialise(spec);
    }

    fn reset(&mut self) {
        self.inner_mut().reset();
    }

    fn deinitialise(&mut self) {
        self.inner_mut().deinitialise();
    }

    #[inline]
    fn apply_to_buffer(
        &mut self,
        buffer: Option<&mut AudioBuffer>,
        start_sample: usize,
        num_samples: usize,
        midi: &[MidiEvent],
    ) {
        match self {
            Node::Filter(node) => node.apply_to_buffer(buffer, start_sample, num_samples, midi),
            Node::Phaser(node) => node.apply_to_buffer(buffer, start_sample, num_samples, midi),
            Node::Synth(node) => node.apply_to_buffer(buffer, start_sample, num_samples, midi),
        }
    }

    fn restore_state(&self, state: &PersistedState) {
        self.inner().restore_state(state);
    }

    fn midi_panic(&mut self) {
        self.inner_mut().midi_panic();
    }
}
