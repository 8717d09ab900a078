use crate::{io::midi::MidiEvent, synth::message::SynthMessage};

/// Map a MIDI event onto a synth message. `channel_filter` of `None` accepts
/// every channel. Events the synth has no use for give `None`.
pub fn midi_to_synth(midi: MidiEvent, channel_filter: Option<u8>) -> Option<SynthMessage> {
    if channel_filter.is_some_and(|channel| channel != midi.channel()) {
        return None;
    }

    match midi {
        // Running-status senders use velocity 0 for note-off
        MidiEvent::NoteOn { key, velocity: 0, .. } => Some(SynthMessage::NoteOff { note: key }),
        MidiEvent::NoteOn { key, velocity, .. } => Some(SynthMessage::NoteOn {
            note: key,
            velocity,
        }),
        MidiEvent::NoteOff { key, .. } => Some(SynthMessage::NoteOff { note: key }),
        MidiEvent::ControlChange {
            controller: MidiEvent::ALL_SOUND_OFF,
            ..
        } => Some(SynthMessage::AllSoundOff),
        MidiEvent::ControlChange {
            controller: MidiEvent::ALL_NOTES_OFF,
            ..
        } => Some(SynthMessage::AllNotesOff),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notes_map_through() {
        assert_eq!(
            midi_to_synth(MidiEvent::note_on(60, 90), None),
            Some(SynthMessage::NoteOn { note: 60, velocity: 90 })
        );
        assert_eq!(
            midi_to_synth(MidiEvent::note_off(60), None),
            Some(SynthMessage::NoteOff { note: 60 })
        );
    }

    #[test]
    fn zero_velocity_note_on_is_note_off() {
        assert_eq!(
            midi_to_synth(MidiEvent::note_on(60, 0), None),
            Some(SynthMessage::NoteOff { note: 60 })
        );
        let event = MidiEvent::NoteOn {
            channel: 3,
            key: 72,
            velocity: 0,
        };
        assert_eq!(
            midi_to_synth(event, Some(3)),
            Some(SynthMessage::NoteOff { note: 72 })
        );
    }

    #[test]
    fn channel_mode_controllers() {
        assert_eq!(
            midi_to_synth(MidiEvent::control_change(120, 0), None),
            Some(SynthMessage::AllSoundOff)
        );
        assert_eq!(
            midi_to_synth(MidiEvent::control_change(123, 0), None),
            Some(SynthMessage::AllNotesOff)
        );
        assert_eq!(midi_to_synth(MidiEvent::control_change(1, 64), None), None);
    }

    #[test]
    fn channel_filter() {
        let event = MidiEvent::NoteOn {
            channel: 2,
            key: 60,
            velocity: 1,
        };
        assert!(midi_to_synth(event, Some(2)).is_some());
        assert!(midi_to_synth(event, Some(0)).is_none());
    }
}
