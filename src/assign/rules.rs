//! Minimum core-function requirements
//!
//! Every host needs a platform core. Compute hosts additionally need a
//! vSwitch core and a VM core. Shared cores have no minimum. Rules are
//! evaluated in order and only the first violation is reported.

use crate::inventory::{CoreRecord, CpuFunction, Personality};
use serde::Serialize;
use thiserror::Error;

/// A function that needs at least one core but has none
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("There must be at least one core for {}.", .0.display_name())]
pub struct MissingCoreFunction(pub CpuFunction);

/// Per-function core counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FunctionTotals {
    /// Platform cores
    pub platform: u32,
    /// vSwitch cores
    pub vswitch: u32,
    /// Shared cores
    pub shared: u32,
    /// VM cores
    pub vms: u32,
}

impl FunctionTotals {
    /// Count records per function; unassigned records are ignored
    pub fn from_records<'a>(cpus: impl IntoIterator<Item = &'a CoreRecord>) -> Self {
        let mut totals = Self::default();
        for cpu in cpus {
            totals.add(cpu.allocated_function, 1);
        }
        totals
    }

    /// Add `n` cores of `function`
    pub fn add(&mut self, function: CpuFunction, n: u32) {
        match function {
            CpuFunction::Platform => self.platform += n,
            CpuFunction::Vswitch => self.vswitch += n,
            CpuFunction::Shared => self.shared += n,
            CpuFunction::Vms => self.vms += n,
            CpuFunction::None => {}
        }
    }

    /// Count for `function` (always 0 for `None`)
    pub fn get(&self, function: CpuFunction) -> u32 {
        match function {
            CpuFunction::Platform => self.platform,
            CpuFunction::Vswitch => self.vswitch,
            CpuFunction::Shared => self.shared,
            CpuFunction::Vms => self.vms,
            CpuFunction::None => 0,
        }
    }
}

impl std::ops::AddAssign for FunctionTotals {
    fn add_assign(&mut self, other: Self) {
        self.platform += other.platform;
        self.vswitch += other.vswitch;
        self.shared += other.shared;
        self.vms += other.vms;
    }
}

/// A minimum of one core for a function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoreFunctionRule {
    /// Function that needs a core
    pub function: CpuFunction,
    /// Only enforced on compute hosts
    pub compute_only: bool,
}

impl CoreFunctionRule {
    /// Whether the rule is enforced for this personality
    pub fn applies_to(&self, personality: &Personality) -> bool {
        !self.compute_only || personality.has_compute()
    }

    /// Check the rule against totals
    pub fn check(&self, totals: &FunctionTotals) -> Result<(), MissingCoreFunction> {
        if totals.get(self.function) == 0 {
            Err(MissingCoreFunction(self.function))
        } else {
            Ok(())
        }
    }
}

/// Rules in reporting priority order
pub const CORE_FUNCTION_RULES: [CoreFunctionRule; 3] = [
    CoreFunctionRule {
        function: CpuFunction::Platform,
        compute_only: false,
    },
    CoreFunctionRule {
        function: CpuFunction::Vswitch,
        compute_only: true,
    },
    CoreFunctionRule {
        function: CpuFunction::Vms,
        compute_only: true,
    },
];

/// Check totals against every applicable rule, reporting the first failure
pub fn check_totals(personality: &Personality, totals: &FunctionTotals) -> Result<(), MissingCoreFunction> {
    CORE_FUNCTION_RULES
        .iter()
        .filter(|rule| rule.applies_to(personality))
        .try_for_each(|rule| rule.check(totals))
}

/// Validate a host's (or proposed) core assignment
pub fn validate_core_functions(personality: &Personality, cpus: &[CoreRecord]) -> Result<(), MissingCoreFunction> {
    check_totals(personality, &FunctionTotals::from_records(cpus))
}
