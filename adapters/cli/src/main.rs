#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs infiltration missions headless or in a window.

mod level_transfer;
mod levels;
mod logging;
mod script;

use std::{path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use clap::Parser;
use glam::Vec2;
use infiltration_core::{Event, LevelConfig, MissionPhase, FRAME_DT};
use infiltration_rendering::{Color, FrameInput, HudLog, Palette, Presentation, RenderingBackend, Scene};
use infiltration_rendering_macroquad::MacroquadBackend;
use infiltration_system_frame_loop::FrameLoop;
use log::{debug, info, warn};

use crate::levels::LevelSource;

/// Visible area of the map in world units.
const VIEWPORT: Vec2 = Vec2::new(960.0, 720.0);
/// Upper bound on simulation steps per rendered frame.
const MAX_STEPS_PER_FRAME: u32 = 5;

/// Command-line arguments for the infiltration binary.
#[derive(Debug, Parser)]
#[command(author, version, about = "Stealth infiltration mini-game", long_about = None)]
struct CliArgs {
    /// Level file in TOML format.
    #[arg(long, value_name = "FILE", conflicts_with = "level_code")]
    level: Option<PathBuf>,
    /// Level share code produced by --export-code.
    #[arg(long, value_name = "CODE")]
    level_code: Option<String>,
    /// Seed for guard placement and wandering; random when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// Maximum number of frames simulated in a headless run.
    #[arg(long, default_value_t = 600)]
    ticks: u32,
    /// Scripted input for headless runs, e.g. "R30,D12,L5".
    #[arg(long, value_name = "SCRIPT")]
    moves: Option<String>,
    /// Opens a window instead of running headless.
    #[arg(long)]
    window: bool,
    /// Prints the share code of the selected level and exits.
    #[arg(long)]
    export_code: bool,
    /// Enables debug logging.
    #[arg(short, long)]
    verbose: bool,
}

/// Entry point for the infiltration command-line interface.
fn main() -> Result<()> {
    let args = CliArgs::parse();
    logging::init(args.verbose);

    let source = match (&args.level, &args.level_code) {
        (Some(path), _) => LevelSource::File(path),
        (None, Some(code)) => LevelSource::Code(code),
        (None, None) => LevelSource::Builtin,
    };
    let level = levels::load(source)?;

    if args.export_code {
        let code = level_transfer::encode(&level).context("failed to encode level")?;
        println!("{code}");
        return Ok(());
    }

    let seed = args.seed.unwrap_or_else(rand::random);
    info!("using seed {seed}");

    if args.window {
        run_window(level, seed)
    } else {
        run_headless(&args, level, seed)
    }
}

fn run_headless(args: &CliArgs, level: LevelConfig, seed: u64) -> Result<()> {
    let steps = match &args.moves {
        Some(moves) => script::parse(moves).context("invalid --moves script")?,
        None => Vec::new(),
    };

    let mut frame_loop = FrameLoop::new(VIEWPORT);
    println!("{}", frame_loop.banner());
    let events = frame_loop.select_level(level, seed);
    log_events(&events);
    if let Some(reason) = rejection(&events) {
        bail!("level rejected: {reason}");
    }

    let mut keys = script::frames(&steps);
    let mut frames = 0;
    while frames < args.ticks && !frame_loop.phase().is_terminal() {
        let held = keys.next().unwrap_or_default();
        log_events(&frame_loop.tick(held));
        frames += 1;
    }

    if let Some(snapshot) = frame_loop.snapshot() {
        println!(
            "phase {:?} after {frames} frames at ({:.1}, {:.1}), objective {}",
            snapshot.phase,
            snapshot.player.position.x,
            snapshot.player.position.y,
            if snapshot.player.holding_objective {
                "carried"
            } else {
                "not carried"
            },
        );
    }
    if let Some(stats) = frame_loop.stats() {
        println!("{stats}");
    }
    Ok(())
}

fn run_window(level: LevelConfig, seed: u64) -> Result<()> {
    let mut frame_loop = FrameLoop::new(VIEWPORT);
    let mut hud = HudLog::default();
    let palette = Palette::default();
    let mut accumulator = Duration::ZERO;
    let mut scene = Scene::empty(VIEWPORT);
    hud.push(frame_loop.banner().to_owned());

    hud.record(&frame_loop.select_level(level.clone(), seed));

    let presentation = Presentation::new("Infiltration", Color::from_rgb_u8(12, 12, 16), scene);

    MacroquadBackend::new()
        .with_vsync(true)
        .run(presentation, move |dt, input: FrameInput, scene| {
            if input.abort {
                hud.record(&frame_loop.abort());
            }
            if input.restart {
                if frame_loop.phase() != MissionPhase::Menu {
                    hud.record(&frame_loop.abort());
                }
                hud.record(&frame_loop.select_level(level.clone(), seed));
                accumulator = Duration::ZERO;
            }

            accumulator += dt;
            let mut steps = 0;
            while accumulator >= FRAME_DT && steps < MAX_STEPS_PER_FRAME {
                accumulator -= FRAME_DT;
                steps += 1;
                hud.record(&frame_loop.tick(input.held));
                hud.tick();
            }
            if steps == MAX_STEPS_PER_FRAME {
                accumulator = Duration::ZERO;
            }

            frame_loop.camera_mut().set_viewport(scene.viewport);
            match (frame_loop.snapshot(), frame_loop.tile_map()) {
                (Some(snapshot), Some(map)) => {
                    let offset = frame_loop.camera().offset();
                    if let Err(error) = scene.capture(&snapshot, &map, offset, &palette) {
                        warn!("failed to capture scene: {error}");
                    }
                }
                _ => scene.clear_mission(frame_loop.phase()),
            }
            scene.hud.messages = hud.texts();
        })
}

fn rejection(events: &[Event]) -> Option<String> {
    events.iter().find_map(|event| match event {
        Event::LevelRejected { reason } => Some(reason.to_string()),
        _ => None,
    })
}

fn log_events(events: &[Event]) {
    for event in events {
        match event {
            Event::TimeAdvanced { .. } | Event::PlayerMoved { .. } => {}
            Event::PlayerSpotted { guard, score } => {
                info!("spotted by guard {}; security level {score}", guard.get());
            }
            Event::ObjectiveAcquired { .. } => info!("objective acquired"),
            Event::MissionWon { score } => info!("mission won with score {score}"),
            Event::MissionFailed { score } => info!("mission failed with score {score}"),
            other => debug!("{other:?}"),
        }
    }
}
