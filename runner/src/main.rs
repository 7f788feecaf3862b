mod report;

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use log::{info, warn};
use serde::Deserialize;

use scheduler::{AtomicKind, Kernel, Pid, PidAllocator, PolicyConfig, Timestamp, Workload};

use report::{format_report, Columns};

/// schedsim: replays a synthetic workload on a single simulated CPU and
/// reports completion, turnaround and waiting times.
///
/// The input is a JSON file holding the processes and, optionally, the
/// policy:
///
/// {"policy": {"kind": "rr", "quantum": 2},
///  "processes": [{"arrival": 0, "burst": 5}, {"id": 7, "arrival": 1, "burst": 3}]}
///
/// Processes without an id get the lowest free one.
#[derive(Debug, Parser)]
#[clap(name = "schedsim", version, verbatim_doc_comment)]
struct Opts {
    /// Simulation file to run.
    input: PathBuf,

    /// Run under this single-queue policy instead of the one in the file
    /// (fcfs, sjf, srtf, prio-np, prio-p, rr).
    #[clap(short = 'p', long)]
    policy: Option<AtomicKind>,

    /// Round robin quantum used with --policy rr.
    #[clap(short = 'q', long)]
    quantum: Option<usize>,

    /// Output format.
    #[clap(short = 'f', long, value_enum, default_value = "text")]
    format: Format,

    /// Enable verbose output. Specify multiple times to increase verbosity.
    #[clap(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn default_priority() -> u32 {
    1
}

/// A process as written in the simulation file, the id is optional
#[derive(Debug, Deserialize)]
struct ProcessEntry {
    #[serde(default)]
    id: Option<Pid>,
    #[serde(alias = "arrival_time")]
    arrival: Timestamp,
    #[serde(alias = "burst_time")]
    burst: usize,
    #[serde(default = "default_priority")]
    priority: u32,
    #[serde(default)]
    queue_level: usize,
}

#[derive(Debug, Deserialize)]
struct SimulationFile {
    #[serde(default)]
    policy: Option<PolicyConfig>,
    processes: Vec<ProcessEntry>,
}

struct Simulation {
    policy: PolicyConfig,
    workload: Vec<Workload>,
}

/// Assigns pids to the entries without one, skipping the explicit ones
fn build_workload(entries: Vec<ProcessEntry>) -> Vec<Workload> {
    let mut pids = PidAllocator::new(entries.iter().filter_map(|entry| entry.id));

    entries
        .into_iter()
        .map(|entry| Workload {
            id: entry.id.unwrap_or_else(|| pids.next_pid()),
            arrival: entry.arrival,
            burst: entry.burst,
            priority: entry.priority,
            queue_level: entry.queue_level,
        })
        .collect()
}

/// Parses a simulation file and applies the command line overrides
///
/// * `text` - the JSON content
/// * `policy` - `--policy`, replaces the policy of the file
/// * `quantum` - `--quantum`, only meaningful together with `--policy rr`
fn parse_simulation(text: &str, policy: Option<AtomicKind>, quantum: Option<usize>) -> Result<Simulation> {
    let file: SimulationFile = serde_json::from_str(text).context("Failed to parse simulation file")?;

    let policy = match (policy, file.policy) {
        (Some(kind), _) => PolicyConfig::atomic(kind, quantum).context("Invalid --policy")?,
        (None, Some(policy)) => {
            if quantum.is_some() {
                warn!("--quantum is ignored without --policy");
            }
            policy
        }
        (None, None) => bail!("No policy given, set \"policy\" in the file or pass --policy"),
    };

    Ok(Simulation {
        policy,
        workload: build_workload(file.processes),
    })
}

fn main() -> Result<()> {
    let opts = Opts::parse();

    let llv = match opts.verbose {
        0 => simplelog::LevelFilter::Info,
        1 => simplelog::LevelFilter::Debug,
        _ => simplelog::LevelFilter::Trace,
    };
    let mut lcfg = simplelog::ConfigBuilder::new();
    lcfg.set_time_level(simplelog::LevelFilter::Error)
        .set_location_level(simplelog::LevelFilter::Off)
        .set_target_level(simplelog::LevelFilter::Off)
        .set_thread_level(simplelog::LevelFilter::Off);
    simplelog::TermLogger::init(
        llv,
        lcfg.build(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )?;

    let text = fs::read_to_string(&opts.input)
        .with_context(|| format!("Failed to read {}", opts.input.display()))?;
    let sim = parse_simulation(&text, opts.policy, opts.quantum)?;
    info!("loaded {} processes from {}", sim.workload.len(), opts.input.display());

    let mut kernel = Kernel::new(&sim.workload, &sim.policy).context("Invalid simulation")?;
    let report = kernel.run().context("Simulation failed")?;

    match opts.format {
        Format::Text => {
            let columns = Columns {
                priority: sim.policy.uses_priority(),
                queue_level: sim.policy.uses_queue_level(),
            };
            println!("{}", format_report(&report, columns));
        }
        Format::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(())
}

#[cfg(test)]
mod tests;
