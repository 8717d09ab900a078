use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::nodes::NodeKind;

/// Opaque key/value record a host stores with a session and hands back on
/// load. Keys are parameter ids; values are raw (unnormalised) parameter
/// values.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedState {
    pub kind: NodeKind,
    pub values: BTreeMap<String, f32>,
}

impl PersistedState {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            values: BTreeMap::new(),
        }
    }

    /// Builder-style insert.
    pub fn with(mut self, id: impl Into<String>, value: f32) -> Self {
        self.values.insert(id.into(), value);
        self
    }

    pub fn get(&self, id: &str) -> Option<f32> {
        self.values.get(id).copied()
    }
}
