//! Host CPU inventory module
//!
//! Provides the record types consumed by the reconciler, JSON snapshot
//! loading, and detection of the local machine's topology.

mod model;
mod snapshot;
pub mod detect;

pub use model::*;
pub use snapshot::*;
pub use detect::{detect_local, TopologyDetector};
