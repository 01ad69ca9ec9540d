//! Text and JSON rendering of reconciliation results

use crate::assign::{AssignmentForm, CoreAssignment, CpuCapabilityUpdate, CpuFunctionSummary, CpuProfile, EDITABLE_FUNCTIONS};
use crate::config::OutputFormat;
use crate::error::Result;
use serde::Serialize;
use std::fmt::Write;

#[derive(Serialize)]
struct SummaryReport<'a> {
    hostname: &'a str,
    #[serde(flatten)]
    assignment: &'a CoreAssignment,
}

#[derive(Serialize)]
struct ApplicableReport<'a> {
    hostname: &'a str,
    applicable: &'a [&'a str],
}

#[derive(Serialize)]
struct EditReport<'a> {
    form: &'a AssignmentForm,
    updates: &'a [CpuCapabilityUpdate],
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

fn processor_cells(row: &CpuFunctionSummary) -> String {
    row.socket_cores
        .iter()
        .map(|(node, cores)| format!("Processor {}: {}", node, cores))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render a host's assignment summary
pub fn render_summary(hostname: &str, assignment: &CoreAssignment, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(&SummaryReport { hostname, assignment })?);
    }

    let stats = &assignment.stats;
    let mut out = String::new();
    writeln!(out, "=== CPU Assignments: {} ===", hostname)?;
    writeln!(out, "CPU Model:      {}", stats.cpu_model.as_deref().unwrap_or("unknown"))?;
    writeln!(out, "Processors:     {}", stats.sockets)?;
    writeln!(out, "Hyperthreading: {}", yes_no(stats.hyperthreading))?;
    for (node, cores) in &stats.physical_cores {
        writeln!(out, "Processor {}:    {} physical cores", node, cores)?;
    }
    writeln!(out)?;
    writeln!(out, "{:<10} {}", "Function", "Processor Logical Cores")?;
    for row in assignment.rows() {
        writeln!(out, "{:<10} {}", row.allocated_function.display_name(), processor_cells(row))?;
    }

    Ok(out)
}

/// Render a CPU profile
pub fn render_profile(profile: &CpuProfile, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(profile)?);
    }

    let mut out = String::new();
    writeln!(out, "=== CPU Profile ===")?;
    writeln!(out, "Processors:      {}", profile.number_of_cpu)?;
    writeln!(out, "Cores/Processor: {}", profile.cores_per_cpu)?;
    writeln!(out, "Hyperthreading:  {}", yes_no(profile.hyper_thread))?;
    writeln!(out)?;
    writeln!(out, "{:<10} {:>8} {:>8} {:>8} {:>8}", "Processor", "Platform", "vSwitch", "Shared", "VMs")?;
    for p in &profile.processors {
        writeln!(out, "{:<10} {:>8} {:>8} {:>8} {:>8}", p.numa_node, p.platform, p.vswitch, p.shared, p.vms)?;
    }

    Ok(out)
}

/// Render the profiles applicable to a host
pub fn render_applicable(hostname: &str, applicable: &[&str], format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(&ApplicableReport { hostname, applicable })?);
    }

    let mut out = String::new();
    if applicable.is_empty() {
        writeln!(out, "No CPU profile applies to {}", hostname)?;
    } else {
        writeln!(out, "CPU profiles applicable to {}:", hostname)?;
        for name in applicable {
            writeln!(out, "  {}", name)?;
        }
    }
    Ok(out)
}

/// Render an accepted edit: the fields and the resulting updates
pub fn render_edit(form: &AssignmentForm, updates: &[CpuCapabilityUpdate], format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(&EditReport { form, updates })?);
    }

    let mut out = String::new();
    writeln!(out, "=== Editable Fields ({} physical cores) ===", form.physical_cores)?;
    for function in EDITABLE_FUNCTIONS {
        for field in form.fields_for(function) {
            writeln!(
                out,
                "# of {} Physical Cores on Processor {}: {} (max {})",
                function, field.processor, field.initial, field.max
            )?;
        }
    }
    writeln!(out)?;
    writeln!(out, "=== Capability Updates ===")?;
    writeln!(out, "{}", serde_json::to_string_pretty(updates)?)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assign::{build_profile, build_summary};
    use crate::inventory::{CoreRecord, CpuFunction, Personality};

    fn cpus() -> Vec<CoreRecord> {
        vec![
            CoreRecord::new(0, 0, 0, 0).with_function(CpuFunction::Platform),
            CoreRecord::new(1, 0, 1, 0).with_function(CpuFunction::Platform),
            CoreRecord::new(2, 0, 2, 0),
        ]
    }

    #[test]
    fn test_text_summary() {
        let assignment = build_summary(&cpus(), None, &Personality::parse("controller"));
        let text = render_summary("controller-0", &assignment, OutputFormat::Text).unwrap();

        assert!(text.contains("=== CPU Assignments: controller-0 ==="));
        assert!(text.contains("Hyperthreading: No"));
        assert!(text.contains("Platform   Processor 0: 0-1"));
        assert!(text.contains("None       Processor 0: 2"));
    }

    #[test]
    fn test_json_summary() {
        let assignment = build_summary(&cpus(), None, &Personality::default());
        let json = render_summary("controller-0", &assignment, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["hostname"], "controller-0");
        assert_eq!(value["functions"]["Platform"]["socket_cores"]["0"], "0-1");
        assert_eq!(value["stats"]["physical_cores"]["0"], 3);
    }

    #[test]
    fn test_text_profile() {
        let profile = build_profile(&cpus(), None);
        let text = render_profile(&profile, OutputFormat::Text).unwrap();
        assert!(text.contains("Cores/Processor: 3"));
    }

    #[test]
    fn test_applicable_empty() {
        let text = render_applicable("compute-0", &[], OutputFormat::Text).unwrap();
        assert_eq!(text, "No CPU profile applies to compute-0\n");
    }
}
