//! MIDI 1.0 channel voice messages.

use crate::synth::message::MessageReceiver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent {
    NoteOn { channel: u8, key: u8, velocity: u8 },
    NoteOff { channel: u8, key: u8, velocity: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    PitchBend { channel: u8, value: i16 },
    ProgramChange { channel: u8, program: u8 },
}

impl MidiEvent {
    /// Controller number for "all sound off".
    pub const ALL_SOUND_OFF: u8 = 120;
    /// Controller number for "all notes off".
    pub const ALL_NOTES_OFF: u8 = 123;

    /// Parse one channel voice message. A note-on with velocity zero is a
    /// note-off. Running status, system and truncated messages give `None`.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let (&status, data) = bytes.split_first()?;
        if status & 0x80 == 0 {
            return None;
        }

        let channel = status & 0x0F;
        let data1 = || data.first().map(|b| b & 0x7F);
        let data2 = || data.get(1).map(|b| b & 0x7F);

        match status & 0xF0 {
            0x80 => Some(MidiEvent::NoteOff {
                channel,
                key: data1()?,
                velocity: data2()?,
            }),
            0x90 => {
                let key = data1()?;
                let velocity = data2()?;
                Some(if velocity == 0 {
                    MidiEvent::NoteOff {
                        channel,
                        key,
                        velocity: 0,
                    }
                } else {
                    MidiEvent::NoteOn {
                        channel,
                        key,
                        velocity,
                    }
                })
            }
            0xB0 => Some(MidiEvent::ControlChange {
                channel,
                controller: data1()?,
                value: data2()?,
            }),
            0xC0 => Some(MidiEvent::ProgramChange {
                channel,
                program: data1()?,
            }),
            0xE0 => {
                let lsb = data1()? as i16;
                let msb = data2()? as i16;
                Some(MidiEvent::PitchBend {
                    channel,
                    value: ((msb << 7) | lsb) - 8192,
                })
            }
            _ => None,
        }
    }

    pub fn note_on(key: u8, velocity: u8) -> Self {
        MidiEvent::NoteOn {
            channel: 0,
            key,
            velocity,
        }
    }

    pub fn note_off(key: u8) -> Self {
        MidiEvent::NoteOff {
            channel: 0,
            key,
            velocity: 0,
        }
    }

    pub fn control_change(controller: u8, value: u8) -> Self {
        MidiEvent::ControlChange {
            channel: 0,
            controller,
            value,
        }
    }

    pub fn channel(&self) -> u8 {
        match *self {
            MidiEvent::NoteOn { channel, .. }
            | MidiEvent::NoteOff { channel, .. }
            | MidiEvent::ControlChange { channel, .. }
            | MidiEvent::PitchBend { channel, .. }
            | MidiEvent::ProgramChange { channel, .. } => channel,
        }
    }
}

/// Fixed-capacity staging area for one block's MIDI events.
///
/// The render thread drains its ring buffer into a `MidiBlock` and hands
/// [`events()`](MidiBlock::events) to `apply_to_buffer`. Events beyond the
/// capacity stay queued for the next block.
#[derive(Debug, Clone)]
pub struct MidiBlock {
    events: [MidiEvent; Self::CAPACITY],
    len: usize,
}

impl Default for MidiBlock {
    fn default() -> Self {
        Self::new()
    }
}

impl MidiBlock {
    pub const CAPACITY: usize = 256;

    pub fn new() -> Self {
        Self {
            events: [MidiEvent::note_off(0); Self::CAPACITY],
            len: 0,
        }
    }

    /// Returns `false` when full.
    pub fn push(&mut self, event: MidiEvent) -> bool {
        if self.len == Self::CAPACITY {
            return false;
        }
        self.events[self.len] = event;
        self.len += 1;
        true
    }

    /// Replace the contents with whatever `receiver` has pending, up to
    /// capacity.
    pub fn fill_from<R: MessageReceiver + ?Sized>(&mut self, receiver: &mut R) -> &[MidiEvent] {
        self.len = 0;
        while self.len < Self::CAPACITY {
            match receiver.pop() {
                Some(event) => {
                    self.events[self.len] = event;
                    self.len += 1;
                }
                None => break,
            }
        }
        self.events()
    }

    pub fn events(&self) -> &[MidiEvent] {
        &self.events[..self.len]
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
