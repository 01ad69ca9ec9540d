//! Inventory record types
//!
//! Mirrors the shape of the inventory service's CPU and node resources
//! so snapshots can be deserialized without a translation layer.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Role assigned to a logical CPU
///
/// Variant order is the display order of the assignment table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub enum CpuFunction {
    /// Platform / control-plane services
    Platform,
    /// Virtual switch dataplane
    Vswitch,
    /// Shared vCPU pool
    Shared,
    /// Guest VMs
    #[serde(rename = "VMs")]
    Vms,
    /// Unassigned
    #[default]
    None,
}

impl CpuFunction {
    /// All functions in display order
    pub const ALL: [CpuFunction; 5] = [
        Self::Platform,
        Self::Vswitch,
        Self::Shared,
        Self::Vms,
        Self::None,
    ];

    /// Label used by the inventory service
    pub fn label(&self) -> &'static str {
        match self {
            Self::Platform => "Platform",
            Self::Vswitch => "Vswitch",
            Self::Shared => "Shared",
            Self::Vms => "VMs",
            Self::None => "None",
        }
    }

    /// Human-readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Platform => "Platform",
            Self::Vswitch => "vSwitch",
            Self::Shared => "Shared",
            Self::Vms => "VMs",
            Self::None => "None",
        }
    }

    /// Parse an inventory label (case-insensitive)
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.label().eq_ignore_ascii_case(label))
    }
}

impl fmt::Display for CpuFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl<'de> Deserialize<'de> for CpuFunction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(match raw {
            Some(label) => CpuFunction::from_label(&label).unwrap_or_else(|| {
                tracing::warn!("Unknown allocated function '{}', treating as None", label);
                CpuFunction::None
            }),
            None => CpuFunction::None,
        })
    }
}

/// One logical CPU (hardware thread) on a host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreRecord {
    /// Flat logical CPU number
    #[serde(rename = "cpu")]
    pub cpu_index: u32,
    /// NUMA node (socket)
    pub numa_node: u32,
    /// Physical core index within the node
    pub core: u32,
    /// Hardware thread within the core (0 = primary)
    pub thread: u32,
    /// Assigned function; null or unknown labels read as `None`
    #[serde(default)]
    pub allocated_function: CpuFunction,
    /// Processor model string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_model: Option<String>,
}

impl CoreRecord {
    /// Create an unassigned record
    pub fn new(cpu_index: u32, numa_node: u32, core: u32, thread: u32) -> Self {
        Self {
            cpu_index,
            numa_node,
            core,
            thread,
            allocated_function: CpuFunction::None,
            cpu_model: None,
        }
    }

    /// Set the assigned function
    pub fn with_function(mut self, function: CpuFunction) -> Self {
        self.allocated_function = function;
        self
    }

    /// Key identifying the physical core this thread belongs to
    pub fn physical_core(&self) -> (u32, u32) {
        (self.numa_node, self.core)
    }
}

/// NUMA node descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumaNode {
    /// Node ID
    pub numa_node: u32,
}

impl NumaNode {
    /// Create a node descriptor
    pub fn new(numa_node: u32) -> Self {
        Self { numa_node }
    }
}

/// Host subfunctions, e.g. `controller,compute`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Personality {
    /// Individual subfunctions
    pub subfunctions: Vec<String>,
}

impl Personality {
    /// Parse a comma-separated subfunction list
    pub fn parse(s: &str) -> Self {
        Self {
            subfunctions: s
                .split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// Whether the host runs compute (virtualization) workloads
    pub fn has_compute(&self) -> bool {
        self.subfunctions.iter().any(|s| s.contains("compute"))
    }
}

impl fmt::Display for Personality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.subfunctions.join(","))
    }
}

impl Serialize for Personality {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Personality {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.map(|s| Personality::parse(&s)).unwrap_or_default())
    }
}
