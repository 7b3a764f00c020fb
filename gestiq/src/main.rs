//! gestiq - launch desktop actions from hand gestures.
//!
//! Reads per-frame hand keypoints as JSON lines (stdin or `--input`),
//! classifies the primary hand and runs the bound action once per gesture.

use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use gestiq::action::{ActionDispatcher, DryRunDispatcher, ProcessLauncher};
use gestiq::config::Config;
use gestiq::provider::{FrameReader, JsonLinesProvider};
use gestiq::runner::{self, RunnerConfig};
use gestiq::session::Session;

#[derive(Parser, Debug)]
#[command(name = "gestiq", about = "Hand gesture action launcher")]
struct Cli {
    /// Config file (s-expression plist); built-in defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON-lines keypoint input ("-" or omitted for stdin)
    #[arg(long)]
    input: Option<PathBuf>,

    /// Log actions instead of launching them
    #[arg(long)]
    dry_run: bool,

    /// Print an s-expression to stdout for every fired or suppressed gesture
    #[arg(long)]
    emit_events: bool,

    /// Validate the config, print it and exit
    #[arg(long)]
    check_config: bool,

    /// Exit after N seconds
    #[arg(long)]
    exit_after: Option<u64>,

    /// Show version and exit
    #[arg(long)]
    version: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.version {
        println!("gestiq {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // Initialize tracing; stdout is reserved for events
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gestiq=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("gestiq v{} starting", env!("CARGO_PKG_VERSION"));

    let config = match &cli.config {
        Some(path) => {
            Config::load(path).with_context(|| format!("invalid config {}", path.display()))?
        }
        None => {
            let config = Config::default();
            config.validate().context("invalid built-in config")?;
            config
        }
    };

    if cli.check_config {
        println!("{}", config.to_sexp());
        return Ok(());
    }

    let dispatcher: Box<dyn ActionDispatcher> = if cli.dry_run {
        info!("Dry run: actions will be logged, not launched");
        Box::new(DryRunDispatcher::default())
    } else {
        Box::new(ProcessLauncher::new())
    };
    let mut session = Session::new(&config, dispatcher);

    // Signal handling via libc
    runner::install_signal_handlers();

    let runner_config = RunnerConfig {
        exit_after: cli.exit_after.map(Duration::from_secs),
        emit_events: cli.emit_events,
        ..RunnerConfig::default()
    };
    let mut out = std::io::stdout().lock();

    // Reads happen on a separate thread so a silent detector cannot block
    // shutdown or the exit timer.
    let mut provider = match cli.input.as_deref() {
        Some(path) if path != Path::new("-") => {
            info!("Reading keypoints from {}", path.display());
            FrameReader::spawn(JsonLinesProvider::open(path)?)?
        }
        _ => {
            info!("Reading keypoints from stdin");
            FrameReader::spawn(JsonLinesProvider::new(BufReader::new(std::io::stdin())))?
        }
    };
    let summary = runner::run(&mut provider, &mut session, &runner_config, &mut out)?;

    info!(
        "gestiq exiting ({}): {} frames, {} actions fired",
        summary.reason.as_str(),
        summary.frames,
        summary.fires
    );
    Ok(())
}
