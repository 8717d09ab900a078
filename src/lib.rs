pub mod dsp;
pub mod error;
pub mod io;
pub mod nodes; // Plugin-level nodes: filter, phaser, synth
pub mod params; // Parameter descriptors and the lock-free hand-off bridge
pub mod synth; // Voice state machine and synth messages

pub use error::{Error, Result};
pub use nodes::{AudioNode, Node, NodeKind, ProcessSpec};
pub use params::{ParameterSet, PersistedState};

/// Largest block a node accepts in one `initialise` call. Longer host blocks
/// are rendered in chunks.
pub const MAX_BLOCK_SIZE: usize = 8192;
pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;
