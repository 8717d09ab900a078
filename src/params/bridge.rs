use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use atomic_float::AtomicF32;

use crate::{
    error::{Error, Result},
    nodes::NodeKind,
    params::{descriptor::ParamDescriptor, state::PersistedState},
};

/*
Parameter Hand-off
==================

Control thread (UI, host automation)          Render thread (audio callback)
────────────────────────────────────          ──────────────────────────────
  publish("frequency", 2_000.0)                 top of apply_to_buffer:
    │ sanitize: NaN → default,                    snapshot(FREQUENCY)
    │ clamp, round choices                          │ relaxed load
    ↓                                               ↓
  slot[FREQUENCY].store(v, Relaxed) ──────────→ smoother.set_target(v)

Every slot is an independent AtomicF32. Nothing orders one slot against
another, so a block can see a new frequency next to an old resonance. That
is fine: the next block sees both, and the smoothers hide the one-block skew.
Neither side ever blocks or allocates.

Values are sanitized on the writing side, so the render thread can trust
whatever it loads. Choices are stored as whole-numbered floats.

Restoring a session bumps `restore_generation`. Nodes cache the generation
they last saw and re-apply their discrete state (filter mode) when it moves,
even if the restored value happens to equal the cached one. The bump is a
Release store after every restored value; a node that Acquire-loads the new
generation before its snapshots is guaranteed to see those values.
*/

#[derive(Debug)]
struct Slot {
    descriptor: ParamDescriptor,
    value: AtomicF32,
}

/// Lock-free parameter storage shared between a node and its control layer.
#[derive(Debug)]
pub struct ParameterSet {
    slots: Box<[Slot]>,
    enabled: AtomicBool,
    restore_generation: AtomicU32,
}

impl ParameterSet {
    pub fn new(descriptors: impl IntoIterator<Item = ParamDescriptor>) -> Self {
        let slots = descriptors
            .into_iter()
            .map(|descriptor| Slot {
                value: AtomicF32::new(descriptor.sanitize(descriptor.default)),
                descriptor,
            })
            .collect();

        Self {
            slots,
            enabled: AtomicBool::new(true),
            restore_generation: AtomicU32::new(0),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.slots.iter().position(|slot| slot.descriptor.id == id)
    }

    pub fn descriptor(&self, index: usize) -> Option<&ParamDescriptor> {
        self.slots.get(index).map(|slot| &slot.descriptor)
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &ParamDescriptor> {
        self.slots.iter().map(|slot| &slot.descriptor)
    }

    /// Store a raw value by id. Unknown ids are logged and ignored.
    pub fn publish(&self, id: &str, raw: f32) {
        match self.index_of(id) {
            Some(index) => self.publish_index(index, raw),
            None => tracing::warn!(id, "publish to unknown parameter ignored"),
        }
    }

    /// Store a raw value by slot index. Out-of-range indices are ignored.
    #[inline]
    pub fn publish_index(&self, index: usize, raw: f32) {
        if let Some(slot) = self.slots.get(index) {
            slot.value
                .store(slot.descriptor.sanitize(raw), Ordering::Relaxed);
        }
    }

    /// Current value for the render thread. Never blocks or allocates.
    #[inline]
    pub fn snapshot(&self, index: usize) -> f32 {
        debug_assert!(index < self.slots.len(), "parameter index {index} out of range");
        self.slots
            .get(index)
            .map_or(0.0, |slot| slot.value.load(Ordering::Relaxed))
    }

    pub fn get(&self, id: &str) -> Option<f32> {
        self.index_of(id).map(|index| self.snapshot(index))
    }

    /// Current value as a slider position in `0.0..=1.0`.
    pub fn normalized(&self, index: usize) -> f32 {
        self.slots.get(index).map_or(0.0, |slot| {
            slot.descriptor
                .range
                .to_normalized(slot.value.load(Ordering::Relaxed))
        })
    }

    pub fn publish_normalized(&self, index: usize, position: f32) {
        if let Some(slot) = self.slots.get(index) {
            self.publish_index(index, slot.descriptor.range.from_normalized(position));
        }
    }

    /// Parse `text` with the parameter's display rules and publish it.
    /// Returns the stored value.
    pub fn set_from_text(&self, id: &str, text: &str) -> Result<f32> {
        let index = self
            .index_of(id)
            .ok_or_else(|| Error::UnknownParameter(id.to_string()))?;
        let value = self.slots[index].descriptor.from_text(text)?;
        self.publish_index(index, value);
        Ok(self.snapshot(index))
    }

    /// Display text for the current value.
    pub fn text(&self, id: &str) -> Result<String> {
        let index = self
            .index_of(id)
            .ok_or_else(|| Error::UnknownParameter(id.to_string()))?;
        Ok(self.slots[index].descriptor.to_text(self.snapshot(index)))
    }

    pub fn reset_to_defaults(&self) {
        for (index, slot) in self.slots.iter().enumerate() {
            self.publish_index(index, slot.descriptor.default);
        }
    }

    pub fn persisted(&self, kind: NodeKind) -> PersistedState {
        self.slots
            .iter()
            .fold(PersistedState::new(kind), |state, slot| {
                state.with(slot.descriptor.id, slot.value.load(Ordering::Relaxed))
            })
    }

    /// Publish every stored value that names a parameter, then bump the
    /// restore generation. Keys that match nothing are logged and skipped;
    /// parameters the state does not mention keep their current value.
    pub fn restore(&self, state: &PersistedState) {
        let mut applied = 0usize;
        for (id, &value) in &state.values {
            match self.index_of(id) {
                Some(index) => {
                    self.publish_index(index, value);
                    applied += 1;
                }
                None => tracing::warn!(id = %id, kind = %state.kind, "persisted value matches no parameter"),
            }
        }

        let generation = self.restore_generation.fetch_add(1, Ordering::Release) + 1;
        tracing::debug!(kind = %state.kind, applied, generation, "restored parameter state");
    }

    #[inline]
    pub fn restore_generation(&self) -> u32 {
        self.restore_generation.load(Ordering::Acquire)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{
        descriptor::{ParamDescriptor, Unit},
        range::ParamRange,
    };
    use std::sync::Arc;
    use std::thread;

    fn set() -> ParameterSet {
        ParameterSet::new([
            ParamDescriptor::continuous(
                "frequency",
                "Frequency",
                ParamRange::with_centre(20.0, 20_000.0, 1_000.0),
                1_000.0,
                Unit::Hertz,
            ),
            ParamDescriptor::choice("mode", "Mode", &["Lowpass", "Highpass"], 0),
        ])
    }

    #[test]
    fn starts_at_defaults() {
        let params = set();
        assert_eq!(params.snapshot(0), 1_000.0);
        assert_eq!(params.snapshot(1), 0.0);
        assert!(params.is_enabled());
        assert_eq!(params.restore_generation(), 0);
    }

    #[test]
    fn publish_clamps_and_sanitizes() {
        let params = set();
        params.publish("frequency", 1e9);
        assert_eq!(params.snapshot(0), 20_000.0);
        params.publish("frequency", f32::NAN);
        assert_eq!(params.snapshot(0), 1_000.0);
        params.publish("mode", 0.7);
        assert_eq!(params.snapshot(1), 1.0);
    }

    #[test]
    fn unknown_id_is_ignored() {
        let params = set();
        params.publish("nope", 3.0);
        assert_eq!(params.snapshot(0), 1_000.0);
        assert_eq!(params.get("nope"), None);
        assert!(matches!(
            params.set_from_text("nope", "1"),
            Err(Error::UnknownParameter(_))
        ));
    }

    #[test]
    fn text_round_trip_through_bridge() {
        let params = set();
        assert_eq!(params.set_from_text("mode", "highpass").unwrap(), 1.0);
        assert_eq!(params.text("mode").unwrap(), "Highpass");
        params.set_from_text("frequency", "3 kHz").unwrap();
        assert_eq!(params.text("frequency").unwrap(), "3.00 kHz");
    }

    #[test]
    fn normalized_publishing() {
        let params = set();
        params.publish_normalized(0, 0.5);
        assert!((params.snapshot(0) - 1_000.0).abs() < 1.0);
        assert!((params.normalized(0) - 0.5).abs() < 1e-3);
    }

    #[test]
    fn restore_applies_known_keys_and_bumps_generation() {
        let params = set();
        let state = PersistedState::new(NodeKind::Filter)
            .with("frequency", 440.0)
            .with("bogus", 1.0);
        params.restore(&state);

        assert_eq!(params.snapshot(0), 440.0);
        assert_eq!(params.snapshot(1), 0.0);
        assert_eq!(params.restore_generation(), 1);
    }

    #[test]
    fn reset_to_defaults_restores_every_slot() {
        let params = set();
        params.publish("frequency", 5_000.0);
        params.publish("mode", 1.0);
        params.reset_to_defaults();

        assert_eq!(params.snapshot(0), 1_000.0);
        assert_eq!(params.snapshot(1), 0.0);
        assert_eq!(params.restore_generation(), 0);
    }

    #[test]
    fn persisted_captures_every_parameter() {
        let params = set();
        params.publish("mode", 1.0);
        let state = params.persisted(NodeKind::Filter);
        assert_eq!(state.values.len(), 2);
        assert_eq!(state.get("mode"), Some(1.0));
        assert_eq!(state.get("frequency"), Some(1_000.0));
    }

    #[test]
    fn concurrent_publish_never_tears() {
        let params = Arc::new(set());
        let writer = {
            let params = Arc::clone(&params);
            thread::spawn(move || {
                for i in 0..10_000 {
                    params.publish_index(0, if i % 2 == 0 { 100.0 } else { 5_000.0 });
                }
            })
        };

        for _ in 0..10_000 {
            let value = params.snapshot(0);
            assert!(value == 1_000.0 || value == 100.0 || value == 5_000.0);
        }
        writer.join().unwrap();
    }
}
