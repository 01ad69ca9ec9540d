//! Editing a host's core assignment
//!
//! An operator sets, per processor, how many physical cores go to the
//! platform, the vSwitch and the shared pool; the remaining cores run VMs.
//! This module derives the editable fields from a host's current summary,
//! validates a request against them, and produces the per-function
//! capability updates sent to the inventory service.

use super::rules::{check_totals, FunctionTotals};
use super::summary::CoreAssignment;
use crate::error::{HostCpuError, Result};
use crate::inventory::{CpuFunction, Personality};
use serde::Serialize;
use std::collections::BTreeMap;

/// Highest number of processors an edit can address
pub const MAX_PROCESSORS: u32 = 4;

/// Functions an operator can assign cores to, in payload order
pub const EDITABLE_FUNCTIONS: [CpuFunction; 3] = [CpuFunction::Platform, CpuFunction::Vswitch, CpuFunction::Shared];

/// Shared cores allowed per processor
pub const MAX_SHARED_PER_PROCESSOR: u32 = 1;

/// One editable per-processor count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProcessorField {
    /// NUMA node id of the processor
    pub processor: u32,
    /// Current physical core count
    pub initial: u32,
    /// Largest accepted value
    pub max: u32,
}

/// Editable fields of a host's assignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignmentForm {
    /// Visible fields per function; hidden functions map to no fields
    pub fields: BTreeMap<CpuFunction, Vec<ProcessorField>>,
    /// Physical cores on the host
    pub physical_cores: u32,
    #[serde(skip)]
    personality: Personality,
}

/// Requested per-processor physical core counts
///
/// Counts are positional: entry `i` is for the `i`-th visible processor
/// of the form, whatever its node id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentRequest {
    counts: BTreeMap<CpuFunction, Vec<u32>>,
}

impl AssignmentRequest {
    /// Create an empty request
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the counts for `function`, one per visible processor
    pub fn with(mut self, function: CpuFunction, counts: Vec<u32>) -> Self {
        self.counts.insert(function, counts);
        self
    }

    /// Requested count for `function` on the processor at `position`
    pub fn get(&self, function: CpuFunction, position: usize) -> Option<u32> {
        self.counts
            .get(&function)
            .and_then(|counts| counts.get(position))
            .copied()
    }

    /// Functions the request sets
    pub fn functions(&self) -> impl Iterator<Item = CpuFunction> + '_ {
        self.counts.keys().copied()
    }
}

/// Capability update for one function
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CpuCapabilityUpdate {
    /// Lower-case function name
    pub function: String,
    /// One `{processor: count}` entry per visible processor
    pub sockets: Vec<BTreeMap<String, u32>>,
}

impl AssignmentForm {
    /// Derive editable fields from a host's current assignment
    ///
    /// Counts are physical cores: with hyperthreading the summary's
    /// per-thread counts are halved. vSwitch and shared fields are only
    /// shown on compute hosts.
    pub fn from_assignment(assignment: &CoreAssignment, personality: &Personality) -> Self {
        let stats = &assignment.stats;
        let processors: Vec<u32> = stats.node_ids.iter().copied().take(MAX_PROCESSORS as usize).collect();
        let divisor = if stats.hyperthreading { 2 } else { 1 };

        let mut fields = BTreeMap::new();
        for function in EDITABLE_FUNCTIONS {
            let visible = function == CpuFunction::Platform || personality.has_compute();
            let summary = match assignment.get(function) {
                Some(summary) if visible => summary,
                _ => {
                    fields.insert(function, Vec::new());
                    continue;
                }
            };

            let function_fields = processors
                .iter()
                .map(|&processor| ProcessorField {
                    processor,
                    initial: summary.cores_on(processor) / divisor,
                    max: if function == CpuFunction::Shared {
                        MAX_SHARED_PER_PROCESSOR
                    } else {
                        stats.physical_cores_on(processor)
                    },
                })
                .collect();
            fields.insert(function, function_fields);
        }

        Self {
            fields,
            physical_cores: stats.total_physical_cores(),
            personality: personality.clone(),
        }
    }

    /// Visible fields for `function`
    pub fn fields_for(&self, function: CpuFunction) -> &[ProcessorField] {
        self.fields.get(&function).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The current assignment expressed as a request
    pub fn initial_request(&self) -> AssignmentRequest {
        self.fields
            .iter()
            .fold(AssignmentRequest::new(), |request, (function, fields)| {
                request.with(*function, fields.iter().map(|f| f.initial).collect())
            })
    }

    /// Validate a request and build the capability updates
    pub fn submit(&self, request: &AssignmentRequest) -> Result<Vec<CpuCapabilityUpdate>> {
        let mut totals = FunctionTotals::default();
        let mut updates = Vec::new();

        for function in EDITABLE_FUNCTIONS {
            let fields = self.fields_for(function);
            if fields.is_empty() {
                if request.get(function, 0).is_some() {
                    tracing::warn!("Ignoring {} counts: not editable on this host", function);
                }
                continue;
            }

            let mut sockets = Vec::with_capacity(fields.len());
            for (position, field) in fields.iter().enumerate() {
                let value = request.get(function, position).ok_or_else(|| {
                    HostCpuError::InvalidAssignment(format!(
                        "missing {} core count for processor {}",
                        function, field.processor
                    ))
                })?;

                if value > field.max {
                    return Err(HostCpuError::InvalidAssignment(format!(
                        "processor {} allows at most {} {} cores, got {}",
                        field.processor, field.max, function, value
                    )));
                }

                totals.add(function, value);
                sockets.push(BTreeMap::from([(field.processor.to_string(), value)]));
            }

            updates.push(CpuCapabilityUpdate {
                function: function.label().to_lowercase(),
                sockets,
            });
        }

        let requested = totals.platform + totals.vswitch + totals.shared;
        if requested > self.physical_cores {
            return Err(HostCpuError::InvalidAssignment(format!(
                "{} cores requested but the host has {} physical cores",
                requested, self.physical_cores
            )));
        }
        totals.vms = self.physical_cores - requested;

        check_totals(&self.personality, &totals)
            .map_err(|missing| HostCpuError::InvalidAssignment(missing.to_string()))?;

        tracing::debug!("Assignment accepted: {:?}", totals);
        Ok(updates)
    }
}
