//! CPU profiles
//!
//! A profile normalises a core assignment to the machine shape it was
//! captured on (processors, physical cores per processor, hyperthreading)
//! plus per-processor function tallies, so it can be checked against
//! another host before being applied.

use super::rules::{check_totals, validate_core_functions, FunctionTotals};
use super::summary::{build_summary, CoreAssignment};
use crate::inventory::{in_numa_order, CoreRecord, CpuFunction, CpuProfileTemplate, HostInventory, NumaNode, Personality};
use serde::Serialize;
use std::collections::HashSet;

/// Function tallies of one processor, in physical cores
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProcessorTally {
    /// NUMA node
    pub numa_node: u32,
    /// Platform cores
    pub platform: u32,
    /// vSwitch cores
    pub vswitch: u32,
    /// Shared cores
    pub shared: u32,
    /// VM cores
    pub vms: u32,
}

impl ProcessorTally {
    fn new(numa_node: u32) -> Self {
        Self {
            numa_node,
            ..Default::default()
        }
    }

    fn count(&mut self, function: CpuFunction) {
        match function {
            CpuFunction::Platform => self.platform += 1,
            CpuFunction::Vswitch => self.vswitch += 1,
            CpuFunction::Shared => self.shared += 1,
            CpuFunction::Vms => self.vms += 1,
            CpuFunction::None => {}
        }
    }

    /// Tallies as function totals
    pub fn totals(&self) -> FunctionTotals {
        FunctionTotals {
            platform: self.platform,
            vswitch: self.vswitch,
            shared: self.shared,
            vms: self.vms,
        }
    }
}

/// Topology-normalised core assignment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CpuProfile {
    /// Number of processors
    pub number_of_cpu: usize,
    /// Physical cores on the first processor
    pub cores_per_cpu: usize,
    /// More than one thread per core was seen
    pub hyper_thread: bool,
    /// Per-processor tallies, in first-seen order
    pub processors: Vec<ProcessorTally>,
}

impl CpuProfile {
    /// Build a profile from CPU records
    ///
    /// Without `nodes`, `cpus` must already be sorted by node, core and
    /// thread. Only the first thread of each physical core is tallied.
    pub fn build(cpus: &[CoreRecord], nodes: Option<&[NumaNode]>) -> Self {
        let cpus = in_numa_order(cpus, nodes);

        let mut seen: HashSet<(u32, u32)> = HashSet::new();
        let mut profile = Self::default();
        let mut first_node = None;

        for cpu in cpus {
            if !seen.insert(cpu.physical_core()) {
                profile.hyper_thread = true;
                continue;
            }

            if *first_node.get_or_insert(cpu.numa_node) == cpu.numa_node {
                profile.cores_per_cpu += 1;
            }

            let index = match profile.processors.iter().position(|p| p.numa_node == cpu.numa_node) {
                Some(index) => index,
                None => {
                    profile.processors.push(ProcessorTally::new(cpu.numa_node));
                    profile.processors.len() - 1
                }
            };
            profile.processors[index].count(cpu.allocated_function);
        }

        profile.number_of_cpu = profile.processors.len();
        profile
    }

    /// Tallies summed over all processors
    pub fn totals(&self) -> FunctionTotals {
        let mut totals = FunctionTotals::default();
        for processor in &self.processors {
            totals += processor.totals();
        }
        totals
    }

    /// Same processor count and cores per processor
    pub fn same_topology(&self, other: &CpuProfile) -> bool {
        self.number_of_cpu == other.number_of_cpu && self.cores_per_cpu == other.cores_per_cpu
    }
}

/// Build a profile from CPU records
pub fn build_profile(cpus: &[CoreRecord], nodes: Option<&[NumaNode]>) -> CpuProfile {
    CpuProfile::build(cpus, nodes)
}

/// A host's own profile, used to vet candidate profiles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostCpuProfile {
    /// The host's profile
    pub profile: CpuProfile,
    /// Host subfunctions
    pub personality: Personality,
}

impl HostCpuProfile {
    /// Build from a host's records
    pub fn new(personality: Personality, cpus: &[CoreRecord], nodes: Option<&[NumaNode]>) -> Self {
        Self {
            profile: CpuProfile::build(cpus, nodes),
            personality,
        }
    }

    /// Build from an inventory snapshot
    pub fn from_inventory(host: &HostInventory) -> Self {
        Self::new(host.subfunctions.clone(), &host.cpus, host.numa_order())
    }

    /// Whether `candidate` can be applied to this host
    ///
    /// Topology is compared first; only a matching candidate has its
    /// function totals checked against this host's personality.
    pub fn profile_applicable(&self, candidate: &CpuProfile) -> bool {
        if !self.profile.same_topology(candidate) {
            tracing::debug!(
                "Topology mismatch: host {}x{} vs candidate {}x{}",
                self.profile.number_of_cpu,
                self.profile.cores_per_cpu,
                candidate.number_of_cpu,
                candidate.cores_per_cpu
            );
            return false;
        }

        match check_totals(&self.personality, &candidate.totals()) {
            Ok(()) => true,
            Err(missing) => {
                tracing::debug!("Candidate rejected: {}", missing);
                false
            }
        }
    }
}

/// Names of the saved profiles that can be applied to `host`, in input order
pub fn applicable_profiles<'a>(host: &HostInventory, templates: &'a [CpuProfileTemplate]) -> Vec<&'a str> {
    let host_profile = HostCpuProfile::from_inventory(host);

    templates
        .iter()
        .filter(|t| host_profile.profile_applicable(&CpuProfile::build(&t.cpus, t.numa_order())))
        .map(|t| t.profilename.as_str())
        .collect()
}

/// Whether `template` fits a host by its stats
///
/// Stricter than [`HostCpuProfile::profile_applicable`]: processor count,
/// physical cores per node and hyperthreading must all match before the
/// template's records are checked against `personality`.
pub fn stats_profile_applicable(host: &CoreAssignment, personality: &Personality, template: &CpuProfileTemplate) -> bool {
    let candidate = build_summary(&template.cpus, template.numa_order(), personality).stats;
    let stats = &host.stats;

    if stats.sockets != candidate.sockets
        || stats.physical_cores != candidate.physical_cores
        || stats.hyperthreading != candidate.hyperthreading
    {
        tracing::debug!("Profile '{}' does not match host stats", template.profilename);
        return false;
    }

    match validate_core_functions(personality, &template.cpus) {
        Ok(()) => true,
        Err(missing) => {
            tracing::debug!("Profile '{}' rejected: {}", template.profilename, missing);
            false
        }
    }
}

/// Names of the saved profiles whose stats match `host`, in input order
pub fn applicable_profiles_by_stats<'a>(host: &HostInventory, templates: &'a [CpuProfileTemplate]) -> Vec<&'a str> {
    let assignment = build_summary(&host.cpus, host.numa_order(), &host.subfunctions);

    templates
        .iter()
        .filter(|t| stats_profile_applicable(&assignment, &host.subfunctions, t))
        .map(|t| t.profilename.as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `nodes` x `cores` x `threads`, sorted by node, core, thread
    fn topology(nodes: u32, cores: u32, threads: u32, assign: impl Fn(u32, u32) -> CpuFunction) -> Vec<CoreRecord> {
        let mut cpus = Vec::new();
        for node in 0..nodes {
            for core in 0..cores {
                for thread in 0..threads {
                    let index = thread * nodes * cores + node * cores + core;
                    cpus.push(CoreRecord::new(index, node, core, thread).with_function(assign(node, core)));
                }
            }
        }
        cpus
    }

    fn compute_layout(node: u32, core: u32) -> CpuFunction {
        match (node, core) {
            (0, 0) => CpuFunction::Platform,
            (0, 1) | (1, 0) => CpuFunction::Vswitch,
            (1, 1) => CpuFunction::Shared,
            _ => CpuFunction::Vms,
        }
    }

    #[test]
    fn test_hyperthreaded_topology() {
        let cpus = topology(2, 4, 2, compute_layout);
        assert_eq!(cpus.len(), 16);

        let profile = build_profile(&cpus, None);
        assert_eq!(profile.cores_per_cpu, 4);
        assert_eq!(profile.number_of_cpu, 2);
        assert!(profile.hyper_thread);

        assert_eq!(
            profile.processors[0],
            ProcessorTally {
                numa_node: 0,
                platform: 1,
                vswitch: 1,
                shared: 0,
                vms: 2
            }
        );
        assert_eq!(profile.totals().vms, 4);
    }

    #[test]
    fn test_single_thread_topology() {
        let profile = build_profile(&topology(1, 6, 1, |_, _| CpuFunction::Platform), None);
        assert_eq!(profile.cores_per_cpu, 6);
        assert_eq!(profile.number_of_cpu, 1);
        assert!(!profile.hyper_thread);
        assert_eq!(profile.processors[0].platform, 6);
    }

    #[test]
    fn test_profile_uses_node_order() {
        let mut cpus = topology(2, 2, 1, compute_layout);
        cpus.reverse();
        let nodes = [NumaNode::new(1), NumaNode::new(0)];

        let profile = build_profile(&cpus, Some(&nodes));
        let order: Vec<u32> = profile.processors.iter().map(|p| p.numa_node).collect();
        assert_eq!(order, vec![1, 0]);
        assert_eq!(profile.cores_per_cpu, 2);
    }

    #[test]
    fn test_topology_precedes_content() {
        let host = HostCpuProfile::new(Personality::parse("compute"), &topology(2, 4, 2, compute_layout), None);

        let fewer_nodes = build_profile(&topology(1, 4, 2, compute_layout), None);
        assert!(!host.profile_applicable(&fewer_nodes));

        let fewer_cores = build_profile(&topology(2, 3, 2, compute_layout), None);
        assert!(!host.profile_applicable(&fewer_cores));

        let same = build_profile(&topology(2, 4, 1, compute_layout), None);
        assert!(host.profile_applicable(&same));
    }

    #[test]
    fn test_compute_needs_vswitch() {
        let host = HostCpuProfile::new(Personality::parse("controller,compute"), &topology(2, 4, 1, compute_layout), None);

        let no_vswitch = build_profile(
            &topology(2, 4, 1, |node, core| match (node, core) {
                (0, 0) => CpuFunction::Platform,
                _ => CpuFunction::Vms,
            }),
            None,
        );
        assert_eq!(no_vswitch.totals().vswitch, 0);
        assert!(!host.profile_applicable(&no_vswitch));

        let controller = HostCpuProfile::new(Personality::parse("controller"), &topology(2, 4, 1, compute_layout), None);
        assert!(controller.profile_applicable(&no_vswitch));
    }

    #[test]
    fn test_applicable_profiles() {
        let host = HostInventory {
            hostname: "compute-1".to_string(),
            subfunctions: Personality::parse("compute"),
            nodes: vec![NumaNode::new(0), NumaNode::new(1)],
            cpus: topology(2, 4, 2, compute_layout),
        };

        let templates = vec![
            CpuProfileTemplate {
                profilename: "wrong-shape".to_string(),
                nodes: vec![NumaNode::new(0)],
                cpus: topology(1, 8, 1, compute_layout),
            },
            CpuProfileTemplate::from_host("same-host", &host),
            CpuProfileTemplate {
                profilename: "no-platform".to_string(),
                nodes: Vec::new(),
                cpus: topology(2, 4, 1, |_, _| CpuFunction::Vms),
            },
        ];

        assert_eq!(applicable_profiles(&host, &templates), vec!["same-host"]);
    }

    fn template(name: &str, cpus: Vec<CoreRecord>) -> CpuProfileTemplate {
        CpuProfileTemplate {
            profilename: name.to_string(),
            nodes: Vec::new(),
            cpus,
        }
    }

    #[test]
    fn test_stats_check_compares_hyperthreading() {
        let personality = Personality::parse("compute");
        let host = build_summary(&topology(2, 4, 2, compute_layout), None, &personality);

        let single_thread = template("single-thread", topology(2, 4, 1, compute_layout));
        assert!(!stats_profile_applicable(&host, &personality, &single_thread));

        let host_profile = HostCpuProfile::new(personality.clone(), &topology(2, 4, 2, compute_layout), None);
        assert!(host_profile.profile_applicable(&build_profile(&single_thread.cpus, None)));

        let same = template("same", topology(2, 4, 2, compute_layout));
        assert!(stats_profile_applicable(&host, &personality, &same));
    }

    #[test]
    fn test_stats_check_compares_cores_per_node() {
        let personality = Personality::parse("compute");
        let host = build_summary(&topology(2, 4, 1, compute_layout), None, &personality);

        let mut uneven = topology(2, 4, 1, compute_layout);
        uneven.push(CoreRecord::new(8, 1, 4, 0).with_function(CpuFunction::Vms));
        assert!(!stats_profile_applicable(&host, &personality, &template("uneven", uneven)));

        let no_vswitch = template("no-vswitch", topology(2, 4, 1, |_, core| match core {
            0 => CpuFunction::Platform,
            _ => CpuFunction::Vms,
        }));
        assert!(!stats_profile_applicable(&host, &personality, &no_vswitch));
    }

    #[test]
    fn test_applicable_profiles_by_stats() {
        let host = HostInventory {
            hostname: "compute-2".to_string(),
            subfunctions: Personality::parse("compute"),
            nodes: vec![NumaNode::new(0), NumaNode::new(1)],
            cpus: topology(2, 4, 2, compute_layout),
        };
        let templates = vec![
            template("no-ht", topology(2, 4, 1, compute_layout)),
            CpuProfileTemplate::from_host("same-host", &host),
        ];

        assert_eq!(applicable_profiles(&host, &templates), vec!["no-ht", "same-host"]);
        assert_eq!(applicable_profiles_by_stats(&host, &templates), vec!["same-host"]);
    }
}
