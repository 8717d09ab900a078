#[cfg(feature = "rtrb")]
use rtrb::Consumer;

use crate::io::midi::MidiEvent;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SynthMessage {
    NoteOn { note: u8, velocity: u8 },
    NoteOff { note: u8 },
    /// Release every voice.
    AllNotesOff,
    /// Silence every voice immediately, skipping the release.
    AllSoundOff,
}

/// Source of MIDI events the render thread can drain without blocking.
pub trait MessageReceiver {
    fn pop(&mut self) -> Option<MidiEvent>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<MidiEvent> {
    fn pop(&mut self) -> Option<MidiEvent> {
        Consumer::pop(self).ok()
    }
}
