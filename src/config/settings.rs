//! Configuration settings for HostCpu
//!
//! Defines the CLI arguments, subcommands and the runtime settings
//! derived from them.

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::assign::{expand_range, AssignmentRequest};
use crate::inventory::CpuFunction;

/// HostCpu - CPU core-to-function assignment tool
#[derive(Parser, Debug, Clone)]
#[command(name = "hostcpu")]
#[command(author = "HostCpu Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Summarize, profile and validate host CPU function assignments")]
#[command(long_about = r#"
HostCpu reads host CPU inventory snapshots (JSON) and reports how logical
CPUs are assigned to the Platform, vSwitch, Shared and VMs functions.

Examples:
  hostcpu summary compute-0.json                  # Assignment table
  hostcpu profile compute-0.json                  # Topology profile
  hostcpu applicable compute-0.json p1.json p2.json
  hostcpu applicable --strict compute-0.json p1.json
  hostcpu validate compute-0.json                 # Minimum core checks
  hostcpu edit compute-0.json --vswitch 2,2       # Build capability updates
  hostcpu compress 0 1 2 4                        # -> 0-2,4
  hostcpu detect > local.json                     # Snapshot this machine
"#)]
pub struct CliArgs {
    /// Output format for reports
    #[arg(long, value_enum, default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (only errors are logged)
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Show the per-function core assignment of a host
    #[command(name = "summary")]
    Summary {
        /// Host inventory snapshot
        inventory: PathBuf,
    },

    /// Show the topology profile of a host or saved profile
    #[command(name = "profile")]
    Profile {
        /// Host inventory snapshot
        inventory: PathBuf,
    },

    /// List saved CPU profiles that can be applied to a host
    #[command(name = "applicable")]
    Applicable {
        /// Host inventory snapshot
        inventory: PathBuf,
        /// Saved CPU profiles
        #[arg(required = true)]
        profiles: Vec<PathBuf>,
        /// Also require matching per-node physical cores and hyperthreading
        #[arg(long)]
        strict: bool,
    },

    /// Check personality-mandated minimum core assignments
    #[command(name = "validate")]
    Validate {
        /// Host inventory snapshot
        inventory: PathBuf,
    },

    /// Validate a new assignment and print the capability updates
    #[command(name = "edit")]
    Edit {
        /// Host inventory snapshot
        inventory: PathBuf,
        /// Platform physical cores per processor (e.g. 1,1)
        #[arg(long, value_name = "LIST")]
        platform: Option<String>,
        /// vSwitch physical cores per processor
        #[arg(long, value_name = "LIST")]
        vswitch: Option<String>,
        /// Shared physical cores per processor
        #[arg(long, value_name = "LIST")]
        shared: Option<String>,
    },

    /// Compress CPU indices into a range list
    #[command(name = "compress")]
    Compress {
        /// CPU indices or range lists (e.g. 0 1 2 or 0-3,8)
        #[arg(required = true)]
        cpus: Vec<String>,
    },

    /// Print an inventory snapshot of this machine
    #[command(name = "detect")]
    Detect {
        /// Subfunctions to record for this host
        #[arg(long, default_value = "controller")]
        subfunctions: String,
    },
}

/// Output format for reports
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON format
    Json,
}

/// Log verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Errors only
    Error,
    /// Warnings and errors
    #[default]
    Warn,
    /// Debug output
    Debug,
    /// Everything
    Trace,
}

impl LogLevel {
    /// Directive for `tracing_subscriber::EnvFilter`
    pub fn as_filter(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

/// Runtime configuration derived from CLI args
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReportConfig {
    /// Output format
    pub format: OutputFormat,
    /// Log verbosity
    pub log_level: LogLevel,
}

impl ReportConfig {
    /// Create config from CLI arguments
    pub fn from_cli(args: &CliArgs) -> Self {
        let log_level = match (args.quiet, args.verbose) {
            (true, _) => LogLevel::Error,
            (false, 0) => LogLevel::Warn,
            (false, 1) => LogLevel::Debug,
            (false, _) => LogLevel::Trace,
        };

        Self {
            format: args.format,
            log_level,
        }
    }
}

/// Parse a per-processor count list (e.g. `"1,0,2"`)
pub fn parse_processor_counts(list: &str) -> Result<Vec<u32>, String> {
    let list = list.trim();
    if list.is_empty() {
        return Err("Empty processor list".to_string());
    }

    list.split(',')
        .enumerate()
        .map(|(processor, part)| {
            part.trim()
                .parse::<u32>()
                .map_err(|_| format!("Invalid count '{}' for processor {}", part.trim(), processor))
        })
        .collect()
}

/// Build an edit request from CLI lists, starting from `base`
pub fn edit_request_from_cli(
    base: AssignmentRequest,
    platform: Option<&str>,
    vswitch: Option<&str>,
    shared: Option<&str>,
) -> Result<AssignmentRequest, String> {
    let mut request = base;
    for (function, list) in [
        (CpuFunction::Platform, platform),
        (CpuFunction::Vswitch, vswitch),
        (CpuFunction::Shared, shared),
    ] {
        if let Some(list) = list {
            let counts = parse_processor_counts(list)
                .map_err(|e| format!("Invalid --{} list: {}", function.label().to_lowercase(), e))?;
            request = request.with(function, counts);
        }
    }
    Ok(request)
}

/// Parse CPU arguments that are plain indices or range lists
pub fn parse_cpu_args(args: &[String]) -> crate::error::Result<Vec<u32>> {
    let mut cpus = Vec::new();
    for arg in args {
        cpus.extend(expand_range(arg)?);
    }
    Ok(cpus)
}
