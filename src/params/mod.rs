//! Parameter descriptors and the lock-free bridge between the control thread
//! and the render thread.

pub mod bridge;
pub mod descriptor;
pub mod range;
pub mod state;

pub use bridge::ParameterSet;
pub use descriptor::{ParamDescriptor, ParamKind, Unit};
pub use range::ParamRange;
pub use state::PersistedState;
