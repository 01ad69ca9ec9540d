//! # HostCpu - CPU Function Assignment Reconciler
//!
//! HostCpu takes a host's logical CPU inventory (NUMA node, physical core,
//! hyperthread and assigned function of every CPU) and derives the views an
//! operator needs to manage core assignments:
//!
//! - **Assignment summary**: per function and NUMA node, the logical CPUs
//!   as a compressed range list (`0-3,8`) and their count
//! - **CPU profile**: processors, physical cores per processor,
//!   hyperthreading and per-processor function tallies
//! - **Profile applicability**: whether a saved profile fits a host's
//!   topology and personality
//! - **Core function rules**: the minimum assignments a personality needs
//! - **Assignment editing**: per-processor physical core counts turned into
//!   capability updates
//!
//! ## Quick Start
//!
//! ```no_run
//! use hostcpu::assign::{build_summary, validate_core_functions};
//! use hostcpu::inventory::HostInventory;
//! use std::path::Path;
//!
//! let host = HostInventory::load(Path::new("compute-0.json")).unwrap();
//! let assignment = build_summary(&host.cpus, host.numa_order(), &host.subfunctions);
//!
//! for row in assignment.rows() {
//!     println!("{}: {:?}", row.allocated_function.display_name(), row.socket_cores);
//! }
//!
//! if let Err(missing) = validate_core_functions(&host.subfunctions, &host.cpus) {
//!     eprintln!("{}", missing);
//! }
//! ```
//!
//! ## Profiles
//!
//! ```no_run
//! use hostcpu::assign::applicable_profiles;
//! use hostcpu::inventory::{CpuProfileTemplate, HostInventory};
//! use std::path::Path;
//!
//! let host = HostInventory::load(Path::new("compute-0.json")).unwrap();
//! let templates = vec![CpuProfileTemplate::load(Path::new("profile.json")).unwrap()];
//!
//! for name in applicable_profiles(&host, &templates) {
//!     println!("{}", name);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod assign;
pub mod config;
pub mod error;
pub mod inventory;
pub mod report;

// Re-export commonly used types
pub use assign::{build_profile, build_summary, compress_range, validate_core_functions, CoreAssignment, CpuProfile};
pub use error::{HostCpuError, Result};
pub use inventory::{CoreRecord, CpuFunction, HostInventory, NumaNode, Personality};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    //! Convenient re-exports for common usage
    //!
    //! ```no_run
    //! use hostcpu::prelude::*;
    //! ```

    pub use crate::assign::{
        applicable_profiles, applicable_profiles_by_stats, build_profile, build_summary, compress_range, expand_range,
        stats_profile_applicable, validate_core_functions,
        AssignmentForm, AssignmentRequest, CoreAssignment, CpuCapabilityUpdate, CpuFunctionSummary, CpuProfile,
        HostCpuProfile, MissingCoreFunction,
    };
    pub use crate::config::OutputFormat;
    pub use crate::error::{HostCpuError, Result};
    pub use crate::inventory::{
        detect_local, CoreRecord, CpuFunction, CpuProfileTemplate, HostInventory, NumaNode, Personality,
    };
}
