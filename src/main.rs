//! HostCpu CLI - CPU function assignment reconciler
//!
//! Summarizes, profiles and validates host CPU core assignments from
//! inventory snapshots.

use clap::Parser;
use hostcpu::assign::{applicable_profiles, applicable_profiles_by_stats, build_profile, build_summary, compress_range, validate_core_functions, AssignmentForm};
use hostcpu::config::{edit_request_from_cli, parse_cpu_args, CliArgs, Commands, OutputFormat, ReportConfig};
use hostcpu::error::{HostCpuError, Result};
use hostcpu::inventory::{detect_local, CpuProfileTemplate, HostInventory, Personality};
use hostcpu::report::{render_applicable, render_edit, render_profile, render_summary};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn main() {
    // Parse CLI arguments
    let args = CliArgs::parse();
    let config = ReportConfig::from_cli(&args);

    // Initialize logging; RUST_LOG overrides the verbosity flags
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Handle result
    if let Err(e) = run(&args.command, config.format) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(command: &Commands, format: OutputFormat) -> Result<()> {
    match command {
        Commands::Summary { inventory } => cmd_summary(inventory, format),
        Commands::Profile { inventory } => cmd_profile(inventory, format),
        Commands::Applicable {
            inventory,
            profiles,
            strict,
        } => cmd_applicable(inventory, profiles, *strict, format),
        Commands::Validate { inventory } => cmd_validate(inventory),
        Commands::Edit {
            inventory,
            platform,
            vswitch,
            shared,
        } => cmd_edit(inventory, platform.as_deref(), vswitch.as_deref(), shared.as_deref(), format),
        Commands::Compress { cpus } => cmd_compress(cpus),
        Commands::Detect { subfunctions } => cmd_detect(subfunctions),
    }
}

fn cmd_summary(path: &Path, format: OutputFormat) -> Result<()> {
    let host = HostInventory::load(path)?;
    let assignment = build_summary(&host.cpus, host.numa_order(), &host.subfunctions);
    print!("{}", render_summary(&host.hostname, &assignment, format)?);
    Ok(())
}

fn cmd_profile(path: &Path, format: OutputFormat) -> Result<()> {
    let host = HostInventory::load(path)?;
    let profile = build_profile(&host.cpus, host.numa_order());
    print!("{}", render_profile(&profile, format)?);
    Ok(())
}

fn cmd_applicable(path: &Path, profiles: &[PathBuf], strict: bool, format: OutputFormat) -> Result<()> {
    let host = HostInventory::load(path)?;
    let templates = profiles
        .iter()
        .map(|p| CpuProfileTemplate::load(p))
        .collect::<Result<Vec<_>>>()?;

    let applicable = if strict {
        applicable_profiles_by_stats(&host, &templates)
    } else {
        applicable_profiles(&host, &templates)
    };
    tracing::debug!("{} of {} profiles applicable", applicable.len(), templates.len());
    print!("{}", render_applicable(&host.hostname, &applicable, format)?);
    Ok(())
}

fn cmd_validate(path: &Path) -> Result<()> {
    let host = HostInventory::load(path)?;
    validate_core_functions(&host.subfunctions, &host.cpus)?;
    println!("{}: core assignment is valid for {}", host.hostname, host.subfunctions);
    Ok(())
}

fn cmd_edit(
    path: &Path,
    platform: Option<&str>,
    vswitch: Option<&str>,
    shared: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let host = HostInventory::load(path)?;
    let assignment = build_summary(&host.cpus, host.numa_order(), &host.subfunctions);
    let form = AssignmentForm::from_assignment(&assignment, &host.subfunctions);

    let request = edit_request_from_cli(form.initial_request(), platform, vswitch, shared)
        .map_err(HostCpuError::ConfigError)?;
    let updates = form.submit(&request)?;

    print!("{}", render_edit(&form, &updates, format)?);
    Ok(())
}

fn cmd_compress(args: &[String]) -> Result<()> {
    let cpus = parse_cpu_args(args)?;
    println!("{}", compress_range(&cpus));
    Ok(())
}

fn cmd_detect(subfunctions: &str) -> Result<()> {
    let mut host = detect_local()?;
    host.subfunctions = Personality::parse(subfunctions);
    println!("{}", serde_json::to_string_pretty(&host)?);
    Ok(())
}
