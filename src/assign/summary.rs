//! Per-function core assignment summary
//!
//! Groups a host's logical CPUs by assigned function and NUMA node and
//! renders each group as a compressed range list, the way the host CPU
//! assignment table displays it.
//!
//! `socket_cores_number` counts records (hardware threads), not physical
//! cores. The profile path deduplicates by physical core instead; the two
//! consumers rely on their respective behaviour.

use super::range::compress_range;
use crate::inventory::{in_numa_order, CoreRecord, CpuFunction, NumaNode, Personality};
use serde::Serialize;
use std::collections::BTreeMap;

/// Assignment of one function across the host's processors
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CpuFunctionSummary {
    /// Function
    pub allocated_function: CpuFunction,
    /// Node -> compressed list of logical CPUs
    pub socket_cores: BTreeMap<u32, String>,
    /// Node -> number of logical CPUs
    pub socket_cores_number: BTreeMap<u32, u32>,
}

impl CpuFunctionSummary {
    fn new(function: CpuFunction) -> Self {
        Self {
            allocated_function: function,
            socket_cores: BTreeMap::new(),
            socket_cores_number: BTreeMap::new(),
        }
    }

    /// Number of logical CPUs on `node`
    pub fn cores_on(&self, node: u32) -> u32 {
        self.socket_cores_number.get(&node).copied().unwrap_or(0)
    }

    /// Total logical CPUs across all nodes
    pub fn total(&self) -> u32 {
        self.socket_cores_number.values().sum()
    }
}

/// Host-wide CPU facts shown next to the assignment table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HostCpuStats {
    /// Model of the first CPU record
    pub cpu_model: Option<String>,
    /// Number of processors (NUMA nodes)
    pub sockets: usize,
    /// Any CPU with a thread index above 0
    pub hyperthreading: bool,
    /// Node -> primary-thread count
    pub physical_cores: BTreeMap<u32, u32>,
    /// Node ids in reconciliation order
    pub node_ids: Vec<u32>,
}

impl HostCpuStats {
    /// Physical cores on `node`
    pub fn physical_cores_on(&self, node: u32) -> u32 {
        self.physical_cores.get(&node).copied().unwrap_or(0)
    }

    /// Physical cores on the whole host
    pub fn total_physical_cores(&self) -> u32 {
        self.physical_cores.values().sum()
    }
}

/// Summary of a host's core-to-function assignment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CoreAssignment {
    /// Host-wide facts
    pub stats: HostCpuStats,
    /// Displayed functions, in display order
    pub functions: BTreeMap<CpuFunction, CpuFunctionSummary>,
}

impl CoreAssignment {
    /// Summarize a host's CPU records
    ///
    /// `nodes` regroups `cpus` by node when the records are not already
    /// sorted by node, core and thread. A function with no cores is still
    /// listed (with empty cells for every node) when it is `Platform`, or
    /// when the host has a compute role and the function is not `None`.
    ///
    /// A host without CPU records has no rows and empty stats.
    pub fn build(cpus: &[CoreRecord], nodes: Option<&[NumaNode]>, personality: &Personality) -> Self {
        if cpus.is_empty() {
            return Self::default();
        }
        let cpus = in_numa_order(cpus, nodes);

        let mut stats = HostCpuStats {
            cpu_model: cpus.first().and_then(|c| c.cpu_model.clone()),
            ..Default::default()
        };
        let mut node_ids: Vec<u32> = Vec::new();
        let mut assigned: BTreeMap<CpuFunction, BTreeMap<u32, Vec<u32>>> = BTreeMap::new();

        for cpu in &cpus {
            if !node_ids.contains(&cpu.numa_node) {
                node_ids.push(cpu.numa_node);
            }

            let physical = stats.physical_cores.entry(cpu.numa_node).or_insert(0);
            if cpu.thread == 0 {
                *physical += 1;
            } else {
                stats.hyperthreading = true;
            }

            assigned
                .entry(cpu.allocated_function)
                .or_default()
                .entry(cpu.numa_node)
                .or_default()
                .push(cpu.cpu_index);
        }

        if let Some(nodes) = nodes {
            node_ids = nodes.iter().map(|n| n.numa_node).collect();
        }
        stats.sockets = node_ids.len();
        stats.node_ids = node_ids;

        let mut functions = BTreeMap::new();
        for function in CpuFunction::ALL {
            let mut summary = CpuFunctionSummary::new(function);

            if let Some(per_node) = assigned.get(&function) {
                for (node, indices) in per_node {
                    summary.socket_cores.insert(*node, compress_range(indices));
                    summary.socket_cores_number.insert(*node, indices.len() as u32);
                }
            } else if Self::always_shown(function, personality) {
                for node in &stats.node_ids {
                    summary.socket_cores.insert(*node, String::new());
                    summary.socket_cores_number.insert(*node, 0);
                }
            } else {
                continue;
            }

            functions.insert(function, summary);
        }

        tracing::debug!(
            "Summarized {} cpus on {} nodes into {} functions",
            cpus.len(),
            stats.sockets,
            functions.len()
        );

        Self { stats, functions }
    }

    fn always_shown(function: CpuFunction, personality: &Personality) -> bool {
        function == CpuFunction::Platform
            || (personality.has_compute() && function != CpuFunction::None)
    }

    /// Summary row for `function`, if displayed
    pub fn get(&self, function: CpuFunction) -> Option<&CpuFunctionSummary> {
        self.functions.get(&function)
    }

    /// Displayed rows in display order
    pub fn rows(&self) -> impl Iterator<Item = &CpuFunctionSummary> {
        self.functions.values()
    }
}

/// Summarize a host's core-to-function assignment
pub fn build_summary(cpus: &[CoreRecord], nodes: Option<&[NumaNode]>, personality: &Personality) -> CoreAssignment {
    CoreAssignment::build(cpus, nodes, personality)
}
