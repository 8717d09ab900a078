// Purpose: voice state machine and the messages that drive it.
// Voice allocation lives in `nodes::synth`, which owns the fixed voice array.

pub mod message;
pub mod voice;

pub use message::{MessageReceiver, SynthMessage};
pub use voice::{Voice, VoiceState};
