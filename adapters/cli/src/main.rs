#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs Moon Patrol in a window or headless.

mod config;
mod logging;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use moon_patrol_core::{Color, DrawList, GAME_TITLE};
use moon_patrol_rendering::{Presentation, RenderingBackend};
use moon_patrol_rendering_macroquad::MacroquadBackend;
use moon_patrol_system_gameplay::Gameplay;
use moon_patrol_system_timing::{ManualClock, SystemClock};

use crate::config::GameFile;

/// Simulated frame length of headless runs.
const HEADLESS_FRAME: Duration = Duration::from_micros(16_667);

/// Side-scrolling lunar patrol game
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Game file with gameplay tuning and levels
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Overrides the random seed of the game file
    #[arg(long)]
    seed: Option<u64>,
    /// Runs headless for this many frames on a simulated 60 Hz clock
    #[arg(long, value_name = "N")]
    frames: Option<u64>,
    /// Synchronises presentation with the display refresh rate
    #[arg(long)]
    vsync: bool,
    /// Sprite manifest mapping sprite names to image files
    #[arg(long, value_name = "PATH")]
    sprites: Option<PathBuf>,
    /// Logs frame rate and frame time breakdown once per second
    #[arg(long)]
    show_fps: bool,
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Entry point for the Moon Patrol command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    let mut game = config::load(args.config.as_deref())?;
    if let Some(seed) = args.seed {
        game.gameplay.seed = seed;
    }

    match args.frames {
        Some(frames) => run_headless(game, frames),
        None => run_windowed(game, &args),
    }
}

fn run_headless(game: GameFile, frames: u64) -> Result<()> {
    let clock = ManualClock::new();
    let mut gameplay = Gameplay::new(game.gameplay, game.levels, Box::new(clock.clone()))
        .context("failed to start the session")?;
    let mut canvas = DrawList::new();
    let mut level = None;
    let mut defeats = 0_u64;

    for frame in 0..frames {
        canvas.clear();
        let report = gameplay
            .tick(&[], &mut canvas)
            .with_context(|| format!("simulation failed on frame {frame}"))?;
        if level != Some(report.level_index) {
            log::info!("frame {frame}: playing {}", report.level_name);
            level = Some(report.level_index);
        }
        if report.game_over_raised {
            defeats += 1;
        }
        clock.advance(HEADLESS_FRAME);
    }

    log::info!(
        "ran {frames} frames ({:.1}s simulated): {} live entities, {defeats} defeats, phase {}",
        gameplay.now().as_secs_f32(),
        gameplay.registry().len(),
        gameplay.phase()
    );
    Ok(())
}

fn run_windowed(game: GameFile, args: &Args) -> Result<()> {
    let mut gameplay = Gameplay::new(game.gameplay, game.levels, Box::new(SystemClock::new()))
        .context("failed to start the session")?;
    let backend = MacroquadBackend::new()
        .with_vsync(args.vsync)
        .with_show_fps(args.show_fps)
        .with_sprite_manifest(args.sprites.clone());
    let presentation = Presentation::new(GAME_TITLE, Color::BLACK);

    backend.run(presentation, move |_dt, input, canvas| {
        let _ = gameplay
            .tick(&input.pressed, canvas)
            .context("simulation failed")?;
        Ok(())
    })
}
