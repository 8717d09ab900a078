//! Node-level benchmarks.
//!
//! These drive the nodes through `apply_to_buffer` the way a host does,
//! including parameter snapshots, smoothing and denormal flushing.

mod nodes;

pub use nodes::{bench_chain, bench_nodes};
