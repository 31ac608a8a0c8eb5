use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rrsim_core::adapters::{render_report, report_to_json, write_report, LogSink, TextSink};
use rrsim_core::domain::system::OperatingSystemBuilder;
use rrsim_core::domain::trace::TraceSink;
use rrsim_core::infrastructure::{load_config, load_workload};
use rrsim_core::{SimConfig, Workload};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// rrsim - round-robin CPU scheduler simulator
#[derive(Parser)]
#[command(name = "rrsim", version)]
#[command(about = "Simulate round-robin scheduling with blocking I/O devices", long_about = None)]
struct Cli {
    /// Log filter used when RUST_LOG is unset (e.g. `info`, `rrsim_core=debug`)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulation and print completion times
    Run(RunArgs),
    /// Parse and validate a workload file without running it
    Check {
        /// Workload file
        input: PathBuf,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Workload file
    input: PathBuf,

    /// JSON file with runtime configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for the random dispatch decisions
    #[arg(long)]
    seed: Option<u64>,

    /// Idle wall time before an idle tick or termination
    #[arg(long)]
    idle_grace_ms: Option<u64>,

    /// Wall time per consumed CPU unit
    #[arg(long)]
    unit_delay_us: Option<u64>,

    /// Back-off between polls
    #[arg(long)]
    poll_interval_us: Option<u64>,

    /// Print a block per dispatch cycle on stdout
    #[arg(long)]
    trace: bool,

    /// Print the report as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Also write the text report to this file
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Commands::Run(args) => run(args),
        Commands::Check { input } => check(input),
    }
}

fn run(args: RunArgs) -> Result<()> {
    let workload = load_workload(&args.input)
        .with_context(|| format!("failed to load workload {}", args.input.display()))?;

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => SimConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(ms) = args.idle_grace_ms {
        config.idle_grace_ms = ms;
    }
    if let Some(us) = args.unit_delay_us {
        config.unit_delay_us = us;
    }
    if let Some(us) = args.poll_interval_us {
        config.poll_interval_us = us;
    }

    let sink: Arc<dyn TraceSink> = if args.trace {
        Arc::new(TextSink::new(io::stdout()))
    } else {
        Arc::new(LogSink)
    };

    info!(input = %args.input.display(), seed = ?config.seed, "starting simulation");
    let report = OperatingSystemBuilder::from_workload(workload)
        .config(config)
        .trace_sink(sink)
        .build()?
        .run()?;

    if args.json {
        println!("{}", report_to_json(&report)?);
    } else {
        print!("{}", render_report(&report));
    }

    if let Some(path) = &args.output {
        write_report(path, &report)
            .with_context(|| format!("failed to write report {}", path.display()))?;
        info!(path = %path.display(), "report written");
    }

    Ok(())
}

fn check(input: PathBuf) -> Result<()> {
    let workload = load_workload(&input)
        .with_context(|| format!("failed to load workload {}", input.display()))?;
    print_summary(&workload);
    Ok(())
}

fn print_summary(workload: &Workload) {
    println!("cpu fraction: {} u.t.", workload.cpu_fraction);
    println!("devices: {}", workload.devices.len());
    for device in &workload.devices {
        println!(
            "  {} capacity={} service_time={}",
            device.name, device.capacity, device.service_time
        );
    }
    println!("processes: {}", workload.processes.len());
    for process in &workload.processes {
        println!(
            "  {} time={} device_probability={}%",
            process.pid, process.operating_time, process.device_probability
        );
    }
    println!("total operating time: {} u.t.", workload.total_operating_time());
}
