//! Inventory snapshots
//!
//! A snapshot is the JSON form of what the inventory service returns for
//! one host (or one saved CPU profile): its NUMA nodes and CPU records.

use super::model::{CoreRecord, NumaNode, Personality};
use crate::error::{HostCpuError, IoResultExt, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// CPU inventory of a single host
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostInventory {
    /// Host name
    #[serde(default)]
    pub hostname: String,
    /// Host subfunctions
    #[serde(default)]
    pub subfunctions: Personality,
    /// NUMA nodes in inventory order
    #[serde(default)]
    pub nodes: Vec<NumaNode>,
    /// Logical CPUs
    pub cpus: Vec<CoreRecord>,
}

impl HostInventory {
    /// Load a snapshot from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).with_path(path)?;
        let inventory: Self = serde_json::from_str(&content).map_err(|e| {
            HostCpuError::InvalidInventory(format!("{}: {}", path.display(), e))
        })?;
        tracing::debug!(
            "Loaded inventory for '{}' ({} nodes, {} cpus) from {:?}",
            inventory.hostname,
            inventory.nodes.len(),
            inventory.cpus.len(),
            path
        );
        Ok(inventory)
    }

    /// Save the snapshot as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).with_path(path)
    }

    /// Node ordering to pass to the reconciler, if the snapshot has one
    pub fn numa_order(&self) -> Option<&[NumaNode]> {
        if self.nodes.is_empty() {
            None
        } else {
            Some(&self.nodes)
        }
    }
}

/// A saved CPU profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CpuProfileTemplate {
    /// Profile name
    pub profilename: String,
    /// NUMA nodes the profile was captured from
    #[serde(default)]
    pub nodes: Vec<NumaNode>,
    /// CPU assignments captured in the profile
    pub cpus: Vec<CoreRecord>,
}

impl CpuProfileTemplate {
    /// Load a saved profile from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).with_path(path)?;
        serde_json::from_str(&content)
            .map_err(|e| HostCpuError::InvalidInventory(format!("{}: {}", path.display(), e)))
    }

    /// Capture a host's current assignment as a named profile
    pub fn from_host(name: impl Into<String>, host: &HostInventory) -> Self {
        Self {
            profilename: name.into(),
            nodes: host.nodes.clone(),
            cpus: host.cpus.clone(),
        }
    }

    /// Node ordering to pass to the reconciler, if the profile has one
    pub fn numa_order(&self) -> Option<&[NumaNode]> {
        if self.nodes.is_empty() {
            None
        } else {
            Some(&self.nodes)
        }
    }
}

/// Group records by node, following `nodes` order
///
/// Records keep their relative order within a node. Records on a node
/// that is not listed are dropped.
pub fn sort_by_numa_node<'a>(cpus: &'a [CoreRecord], nodes: &[NumaNode]) -> Vec<&'a CoreRecord> {
    let sorted: Vec<&CoreRecord> = nodes
        .iter()
        .flat_map(|node| cpus.iter().filter(move |cpu| cpu.numa_node == node.numa_node))
        .collect();

    if sorted.len() != cpus.len() {
        tracing::warn!(
            "Dropped {} cpu records on unlisted NUMA nodes",
            cpus.len() - sorted.len()
        );
    }

    sorted
}

/// Records in reconciliation order: regrouped by `nodes` when given,
/// otherwise as supplied
pub fn in_numa_order<'a>(cpus: &'a [CoreRecord], nodes: Option<&[NumaNode]>) -> Vec<&'a CoreRecord> {
    match nodes {
        Some(nodes) => sort_by_numa_node(cpus, nodes),
        None => cpus.iter().collect(),
    }
}
