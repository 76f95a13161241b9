//! boilerctl: command-line front end for the boiler controller.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  Adapters (outer ring)                   │
//! │                                                          │
//! │  ReplayTransport        LogEventSink     env_logger      │
//! │  (TransportPort)        (EventSink)      (log backend)   │
//! │                                                          │
//! │  ─────────────── Port Trait Boundary ───────────────     │
//! │                                                          │
//! │  ┌────────────────────────────────────────────────┐      │
//! │  │          BoilerService (pure logic)            │      │
//! │  │  Controller · Failure detector · Pump policy   │      │
//! │  └────────────────────────────────────────────────┘      │
//! └──────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{LevelFilter, info};

use boilerctl::adapters::log_sink::LogEventSink;
use boilerctl::adapters::replay::{ReplayTransport, Trace};
use boilerctl::app::ports::EventSink;
use boilerctl::app::service::BoilerService;
use boilerctl::app::events::{AppEvent, CycleSummary};
use boilerctl::config::PlantConfiguration;
use boilerctl::fsm::Controller;

#[derive(Parser)]
#[command(name = "boilerctl")]
#[command(about = "Steam boiler water-level controller", long_about = None)]
struct Cli {
    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the controller over a recorded message trace
    Replay {
        /// Path to the JSON trace
        trace_path: PathBuf,
        /// Write cycle output here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a plant configuration file
    CheckConfig {
        /// Path to the JSON configuration
        config_path: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match (cli.quiet, cli.verbose) {
        (true, _) => LevelFilter::Error,
        (false, 0) => LevelFilter::Warn,
        (false, 1) => LevelFilter::Info,
        (false, _) => LevelFilter::Debug,
    };
    // RUST_LOG, when set, refines the level chosen on the command line.
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .try_init()
        .context("failed to install logger")?;

    match cli.command {
        Commands::Replay { trace_path, output } => cmd_replay(&trace_path, output.as_deref()),
        Commands::CheckConfig { config_path } => cmd_check_config(&config_path),
    }
}

// ── replay ────────────────────────────────────────────────────

/// Forwards events to the log and writes one JSON line per cycle.
struct JsonLines<W: Write> {
    log: LogEventSink,
    out: W,
    error: Option<io::Error>,
}

impl<W: Write> EventSink for JsonLines<W> {
    fn emit(&mut self, event: &AppEvent) {
        self.log.emit(event);
        if let AppEvent::CycleCompleted(summary) = event {
            if self.error.is_none() {
                if let Err(e) = write_summary(&mut self.out, summary) {
                    self.error = Some(e);
                }
            }
        }
    }
}

fn write_summary(out: &mut impl Write, summary: &CycleSummary) -> io::Result<()> {
    let line = serde_json::json!({
        "cycle": summary.cycle,
        "mode": summary.mode.name(),
        "outgoing": summary.outgoing,
    });
    writeln!(out, "{line}")
}

fn cmd_replay(trace_path: &Path, output: Option<&Path>) -> Result<()> {
    let trace = Trace::load(trace_path)
        .with_context(|| format!("failed to load trace {}", trace_path.display()))?;

    let mut service = match trace.configuration.clone() {
        Some(config) => BoilerService::with_configuration(config)
            .context("trace carries an invalid configuration")?,
        None => BoilerService::new(Controller::new(None)),
    };
    let mut transport = ReplayTransport::from(trace);

    let out: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?,
        )),
        None => Box::new(io::stdout().lock()),
    };
    let mut sink = JsonLines {
        log: LogEventSink::new(),
        out,
        error: None,
    };

    service.start(&mut sink);
    let cycles = service.run(&mut transport, &mut sink);

    if let Some(e) = sink.error.take() {
        return Err(e).context("failed to write cycle output");
    }
    sink.out.flush().context("failed to flush cycle output")?;
    info!("replayed {cycles} cycles, final mode {}", service.mode());
    Ok(())
}

// ── check-config ──────────────────────────────────────────────

fn cmd_check_config(config_path: &Path) -> Result<()> {
    let text = std::fs::read_to_string(config_path)
        .with_context(|| format!("failed to read {}", config_path.display()))?;
    let config: PlantConfiguration = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse {}", config_path.display()))?;
    config
        .validate()
        .with_context(|| format!("invalid configuration in {}", config_path.display()))?;

    println!(
        "{}: ok ({} pumps, normal band {}..{}, limits {}..{})",
        config_path.display(),
        config.pump_count(),
        config.minimal_normal_level,
        config.maximal_normal_level,
        config.minimal_limit_level,
        config.maximal_limit_level,
    );
    Ok(())
}
