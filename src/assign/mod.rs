//! CPU function assignment module
//!
//! Reconciles a host's per-thread CPU records into:
//! - A per-function, per-processor summary for display
//! - A topology-normalised profile for applicability checks
//! - Validation of personality-mandated minimums
//! - Editable per-processor counts and capability updates

mod edit;
mod profile;
mod range;
mod rules;
mod summary;

pub use edit::*;
pub use profile::*;
pub use range::{compress_range, expand_range, MAX_RANGE_SPAN};
pub use rules::*;
pub use summary::*;
