//! Image Cube headless runner
//!
//! Builds an in-memory stage of panels, attaches an image cube to it and
//! replays a JSON scenario of commands and clock ticks, printing one JSON
//! frame report per line whenever the scenario asks for one.

mod scenario;
mod stage;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use imagecube::{Command, ImageCube, Settings, SettingsPatch};
use tracing::{debug, info, warn};

use scenario::{Scenario, ScenarioStep};
use stage::Stage;

/// Replay image cube scenarios without a display
#[derive(Parser, Debug)]
#[command(name = "imagecube")]
#[command(about = "Replay image cube rotation scenarios against an in-memory stage")]
#[command(version)]
struct Args {
    /// Scenario file (JSON)
    scenario: PathBuf,

    /// Widget settings (TOML); defaults apply when omitted
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Number of panels in the container
    #[arg(short, long, default_value = "3")]
    panels: usize,

    /// Container width
    #[arg(long, default_value = "320")]
    width: f32,

    /// Container height
    #[arg(long, default_value = "240")]
    height: f32,

    /// Seed for random directions and selection
    #[arg(long)]
    seed: Option<u64>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let settings = match &args.settings {
        Some(path) => load_settings(path)?,
        None => Settings::default(),
    };
    let scenario = Scenario::from_path(&args.scenario)?;

    let mut stage = Stage::build(args.panels, args.width, args.height)
        .context("Failed to build stage")?;
    let mut cube = match args.seed {
        Some(seed) => ImageCube::with_seed(seed),
        None => ImageCube::new(),
    };

    info!(
        panels = args.panels,
        steps = scenario.steps.len(),
        "Replaying {}",
        args.scenario.display()
    );
    cube.attach(&mut stage.tree, stage.container, SettingsPatch::from(settings));

    for step in scenario.steps {
        run_step(&mut cube, &mut stage, step)?;
    }
    Ok(())
}

fn load_settings(path: &std::path::Path) -> Result<Settings> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Settings::from_toml_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

fn run_step(cube: &mut ImageCube, stage: &mut Stage, step: ScenarioStep) -> Result<()> {
    debug!(?step, clock_ms = stage.clock_ms, "step");
    let command = match step {
        ScenarioStep::Wait { ms } => {
            advance(cube, stage, ms);
            return Ok(());
        }
        ScenarioStep::Tick { frames, ms, print } => {
            for _ in 0..frames {
                advance(cube, stage, ms);
                if print {
                    print_report(cube, stage)?;
                }
            }
            return Ok(());
        }
        ScenarioStep::Snapshot => return print_report(cube, stage),
        ScenarioStep::Rotate { next } => {
            let next = next.and_then(|index| {
                let panel = stage.panel(index);
                if panel.is_none() {
                    warn!(index, "no such panel, rotating to the next one");
                }
                panel
            });
            Command::Rotate { next }
        }
        ScenarioStep::Start => Command::Start,
        ScenarioStep::Stop { temporary } => Command::Stop { temporary },
        ScenarioStep::Reconfigure { settings } => Command::Reconfigure(settings),
        ScenarioStep::Detach => Command::Detach,
    };

    debug!(command = command.name(), "execute");
    cube.execute(&mut stage.tree, stage.container, command);
    Ok(())
}

fn advance(cube: &mut ImageCube, stage: &mut Stage, ms: f32) {
    cube.tick(&mut stage.tree, ms);
    stage.clock_ms += ms;
}

fn print_report(cube: &ImageCube, stage: &Stage) -> Result<()> {
    let line = serde_json::to_string(&stage.report(cube)).context("Failed to encode frame")?;
    println!("{line}");
    Ok(())
}
