mod config;
mod headless;
mod lua_runner;

use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use gm8_core::time::FramePacer;
use gm8_core::{load_game_from_path, FrameOutcome, Game};

use config::load_config_from_path;
use headless::HeadlessRenderer;
use lua_runner::LuaRunner;

const CONFIG_PATH: &str = "assets/runner.json";

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("gm8 runner starting...");

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CONFIG_PATH));

    if let Err(err) = run(&config_path) {
        log::error!("{err}");
        std::process::exit(1);
    }
}

fn run(config_path: &Path) -> Result<(), String> {
    let config = load_config_from_path(config_path)?;
    let assets = load_game_from_path(&config.game_path)?;
    let runner = LuaRunner::new()?;
    let mut game = Game::new(assets, runner, HeadlessRenderer::new(config.max_frames));

    game.start(config.start_room)
        .map_err(|e| format!("Failed to enter the first room: {e}"))?;

    let mut pacer = FramePacer::new(game.globals().room_speed);
    loop {
        if config.paced {
            pacer.set_room_speed(game.globals().room_speed);
            pacer.begin_frame();
            if !pacer.should_step() {
                thread::sleep(Duration::from_secs_f64(pacer.time_until_step()));
                continue;
            }
        }

        let outcome = game
            .tick()
            .map_err(|e| format!("Frame {} failed: {e}", game.frame_count()))?;
        if outcome == FrameOutcome::Close {
            break;
        }
    }

    let renderer = game.renderer();
    log::info!(
        "Session closed after {} frames in '{}' {}x{} ({} presented, {} draws, {:.1} fps, {} Lua chunks)",
        game.frame_count(),
        renderer.title,
        renderer.width,
        renderer.height,
        renderer.frames_presented,
        renderer.total_draws,
        pacer.smoothed_fps,
        game.runner().cached_chunks()
    );
    Ok(())
}
