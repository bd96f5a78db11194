//! Terminal driver for the faction territory simulation.

mod snapshot_file;
mod telemetry;

use anyhow::{Context, Result};
use clap::Parser;
use comm_core::SimConfig;
use comm_world::{Frame, NullPresenter, Presenter, Simulation, TerminalPresenter};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::signal;
use tokio::time::Duration;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON configuration file; defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Random seed; a fresh one is drawn and logged when omitted
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of ticks to simulate
    #[arg(short, long)]
    ticks: Option<u64>,

    /// Render a frame every N ticks
    #[arg(long)]
    render_every: Option<u64>,

    /// Pause after each frame, in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Skip rendering and only log metrics
    #[arg(long)]
    headless: bool,

    /// Disable ANSI colors
    #[arg(long)]
    no_color: bool,

    /// Append plain-text frames to this file instead of animating stdout
    #[arg(long)]
    frames_out: Option<PathBuf>,

    /// Write the final world state to this file
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Print a previously written snapshot as JSON and exit
    #[arg(long, conflicts_with = "snapshot")]
    inspect: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    dump_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    telemetry::init_telemetry(args.json_logs)?;

    if let Some(path) = &args.inspect {
        let file = snapshot_file::read_snapshot(path).await?;
        info!(version = file.version, timestamp = file.timestamp, "Snapshot loaded");
        println!("{}", file.snapshot.to_json()?);
        return Ok(());
    }

    let config = effective_config(&args)?;
    if args.dump_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    info!(
        seed = config.seed,
        width = config.width,
        height = config.height,
        ticks = config.total_ticks,
        "Starting comm-sim"
    );

    let mut sim = Simulation::new(config)?;
    let mut presenter = build_presenter(&args)?;

    let interrupted = Arc::new(AtomicBool::new(false));
    {
        let interrupted = interrupted.clone();
        tokio::spawn(async move {
            shutdown_signal().await;
            interrupted.store(true, Ordering::SeqCst);
        });
    }

    run_loop(&mut sim, presenter.as_mut(), &interrupted, args.headless).await?;

    let frame = sim.frame();
    print_summary(&sim, &frame);

    if let Some(path) = &args.snapshot {
        snapshot_file::write_snapshot(path, sim.snapshot()).await?;
    }

    Ok(())
}

/// Drive ticks until the budget runs out or a shutdown signal arrives
async fn run_loop(
    sim: &mut Simulation,
    presenter: &mut dyn Presenter,
    interrupted: &AtomicBool,
    headless: bool,
) -> Result<()> {
    let delay = Duration::from_millis(sim.config().frame_delay_ms);
    let mut last_presented = None;

    if !headless {
        presenter.present(&sim.frame())?;
        last_presented = Some(sim.tick());
    }

    while !sim.is_finished() {
        if interrupted.load(Ordering::SeqCst) {
            warn!(tick = sim.tick(), "Interrupted, stopping early");
            break;
        }

        sim.step()?;

        if sim.should_render() {
            if headless {
                sim.emit_population_metrics();
            } else {
                presenter.present(&sim.frame())?;
                last_presented = Some(sim.tick());
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    // The last tick may fall between render intervals
    if !headless && last_presented != Some(sim.tick()) {
        presenter.present(&sim.frame())?;
    }
    Ok(())
}

fn effective_config(args: &Args) -> Result<SimConfig> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => SimConfig::default(),
    };

    config.seed = match args.seed {
        Some(seed) => seed,
        None => {
            let seed = rand::random::<u64>();
            info!(seed, "No seed given, drew a fresh one; pass --seed to replay");
            seed
        }
    };
    if let Some(ticks) = args.ticks {
        config.total_ticks = ticks;
    }
    if let Some(every) = args.render_every {
        config.render_interval_ticks = every;
    }
    if let Some(delay) = args.delay_ms {
        config.frame_delay_ms = delay;
    }
    if args.headless || args.frames_out.is_some() {
        config.frame_delay_ms = 0;
    }

    config.validate()?;
    Ok(config)
}

fn load_config(path: &Path) -> Result<SimConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config = serde_json::from_str(&text)
        .with_context(|| format!("invalid config {}", path.display()))?;
    info!(path = %path.display(), "Loaded configuration");
    Ok(config)
}

fn build_presenter(args: &Args) -> Result<Box<dyn Presenter>> {
    if args.headless {
        return Ok(Box::new(NullPresenter));
    }
    match &args.frames_out {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Box::new(TerminalPresenter::plain(BufWriter::new(file))))
        }
        None => Ok(Box::new(TerminalPresenter::stdout(!args.no_color))),
    }
}

fn summary_text(sim: &Simulation, frame: &Frame) -> String {
    let mut lines = vec![
        String::new(),
        format!("Final state after {} years", sim.tick()),
    ];
    lines.extend(frame.summary.iter().cloned());
    lines.push(match sim.world().stats().leader() {
        Some(leader) => format!("Largest territory: faction {}", leader),
        None => "Largest territory: none, every faction was wiped out".to_string(),
    });
    lines.join("\n")
}

fn print_summary(sim: &Simulation, frame: &Frame) {
    println!("{}", summary_text(sim, frame));

    let result = sim.result();
    info!(
        event = "run_summary",
        final_tick = result.final_tick,
        leader = ?result.leader,
        soldiers_alive = result.soldiers_alive,
        total_owned = result.stats.total_owned(),
        total_destroyed = result.stats.total_destroyed(),
        "Simulation finished"
    );
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
