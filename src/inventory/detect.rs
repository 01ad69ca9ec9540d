//! Local CPU topology detection
//!
//! Builds an inventory snapshot of the machine we run on from sysfs:
//! - NUMA nodes and their CPUs from `node/nodeN/cpulist`
//! - Core ids from `cpu/cpuN/topology/core_id`
//! - Thread index from the position in `thread_siblings_list`
//!
//! Every detected CPU is unassigned.

use super::model::{CoreRecord, NumaNode, Personality};
use super::snapshot::HostInventory;
use crate::assign::expand_range;
use crate::error::{HostCpuError, IoResultExt, Result};
use std::path::{Path, PathBuf};

/// Default sysfs location of the node and cpu directories
pub const SYSFS_SYSTEM: &str = "/sys/devices/system";

/// Default cpuinfo location
pub const PROC_CPUINFO: &str = "/proc/cpuinfo";

/// Reads CPU topology from a sysfs-like tree
#[derive(Debug, Clone)]
pub struct TopologyDetector {
    system_root: PathBuf,
    cpuinfo: PathBuf,
}

impl Default for TopologyDetector {
    fn default() -> Self {
        Self::new(SYSFS_SYSTEM, PROC_CPUINFO)
    }
}

impl TopologyDetector {
    /// Create a detector reading from the given roots
    pub fn new(system_root: impl Into<PathBuf>, cpuinfo: impl Into<PathBuf>) -> Self {
        Self {
            system_root: system_root.into(),
            cpuinfo: cpuinfo.into(),
        }
    }

    /// Detect the topology, falling back to a flat single-node layout
    /// when no NUMA information is available
    pub fn detect(&self) -> Result<HostInventory> {
        let nodes = self.read_nodes()?;

        let mut cpus = if nodes.is_empty() {
            tracing::debug!("No NUMA nodes under {:?}, using flat layout", self.system_root);
            Self::flat_layout(num_cpus::get() as u32)
        } else {
            let mut cpus = Vec::new();
            for (node_id, node_cpus) in &nodes {
                for &cpu in node_cpus {
                    let (core, thread) = self.read_cpu_topology(cpu)?;
                    cpus.push(CoreRecord::new(cpu, *node_id, core, thread));
                }
            }
            cpus
        };

        cpus.sort_by_key(|c| (c.numa_node, c.core, c.thread));

        let model = self.read_cpu_model();
        for cpu in &mut cpus {
            cpu.cpu_model = model.clone();
        }

        let nodes = if nodes.is_empty() {
            vec![NumaNode::new(0)]
        } else {
            nodes.iter().map(|(id, _)| NumaNode::new(*id)).collect()
        };

        let hostname = hostname::get()
            .map(|h| h.to_string_lossy().to_string())
            .unwrap_or_else(|_| "localhost".to_string());

        tracing::info!(
            "Detected {} NUMA nodes with {} logical CPUs on {}",
            nodes.len(),
            cpus.len(),
            hostname
        );

        Ok(HostInventory {
            hostname,
            subfunctions: Personality::default(),
            nodes,
            cpus,
        })
    }

    /// One node, one thread per core
    fn flat_layout(num_cpus: u32) -> Vec<CoreRecord> {
        (0..num_cpus).map(|cpu| CoreRecord::new(cpu, 0, cpu, 0)).collect()
    }

    /// Node ids with their CPU lists, sorted by node id
    fn read_nodes(&self) -> Result<Vec<(u32, Vec<u32>)>> {
        let node_root = self.system_root.join("node");
        let entries = match std::fs::read_dir(&node_root) {
            Ok(entries) => entries,
            Err(_) => return Ok(Vec::new()),
        };

        let mut nodes = Vec::new();
        for entry in entries.filter_map(|e| e.ok()) {
            let name = entry.file_name();
            let name_str = name.to_string_lossy();

            if let Some(id) = name_str.strip_prefix("node") {
                if let Ok(node_id) = id.parse::<u32>() {
                    let cpulist_path = entry.path().join("cpulist");
                    let content = std::fs::read_to_string(&cpulist_path).with_path(&cpulist_path)?;
                    let cpus = expand_range(content.trim())
                        .map_err(|e| e.with_context(format!("node{}", node_id)))?;
                    nodes.push((node_id, cpus));
                }
            }
        }

        nodes.sort_by_key(|(id, _)| *id);
        Ok(nodes)
    }

    /// Core id and thread index of a logical CPU
    fn read_cpu_topology(&self, cpu: u32) -> Result<(u32, u32)> {
        let topology = self.system_root.join(format!("cpu/cpu{}/topology", cpu));

        let core_id_path = topology.join("core_id");
        let core_id = read_trimmed(&core_id_path)?;
        let core: u32 = core_id.parse().map_err(|_| {
            HostCpuError::DetectionError(format!("bad core_id '{}' for cpu{}", core_id, cpu))
        })?;

        let siblings_path = topology.join("thread_siblings_list");
        let thread = match read_trimmed(&siblings_path) {
            Ok(list) => {
                let mut siblings = expand_range(&list)?;
                siblings.sort_unstable();
                siblings.iter().position(|&s| s == cpu).unwrap_or(0) as u32
            }
            Err(_) => 0,
        };

        Ok((core, thread))
    }

    fn read_cpu_model(&self) -> Option<String> {
        let content = std::fs::read_to_string(&self.cpuinfo).ok()?;
        content
            .lines()
            .find(|line| line.starts_with("model name"))
            .and_then(|line| line.split_once(':'))
            .map(|(_, model)| model.trim().to_string())
    }
}

fn read_trimmed(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_path(path)
        .map(|s| s.trim().to_string())
}

/// Detect the local host's topology
pub fn detect_local() -> Result<HostInventory> {
    TopologyDetector::default().detect()
}
