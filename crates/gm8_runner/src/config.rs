use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct RunnerConfig {
    #[serde(default = "default_game_path")]
    pub game_path: PathBuf,
    /// Room to enter first. `None` means the first room in the room order.
    #[serde(default)]
    pub start_room: Option<usize>,
    /// Stop after this many presented frames. `None` runs until a script
    /// calls `game_end`.
    #[serde(default)]
    pub max_frames: Option<u64>,
    /// Sleep between frames to hold the room speed. Off runs flat out.
    #[serde(default = "default_paced")]
    pub paced: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            game_path: default_game_path(),
            start_room: None,
            max_frames: None,
            paced: default_paced(),
        }
    }
}

/// Read the runner config. A missing file is not an error; the defaults are
/// used instead.
pub fn load_config_from_path(config_path: &Path) -> Result<RunnerConfig, String> {
    if !config_path.exists() {
        log::warn!(
            "Runner config not found: {}. Using defaults.",
            config_path.display()
        );
        return Ok(RunnerConfig::default());
    }
    let raw = fs::read_to_string(config_path)
        .map_err(|e| format!("Failed to read runner config {}: {e}", config_path.display()))?;
    let config: RunnerConfig = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse runner config {}: {e}", config_path.display()))?;
    if config.max_frames == Some(0) {
        return Err(format!(
            "Runner config {}: max_frames must be at least 1",
            config_path.display()
        ));
    }
    Ok(config)
}

fn default_game_path() -> PathBuf {
    PathBuf::from("assets/game.json")
}

const fn default_paced() -> bool {
    true
}
