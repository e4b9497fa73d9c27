use std::path::{Path, PathBuf};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level configuration, loadable from TOML
///
/// Read once at startup and then only passed around by reference.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub game: GameConfig,
    pub agent: AgentConfig,
    pub training: TrainingConfig,
}

/// Play-field geometry, pacing and rewards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Play-field width in pixels
    pub width: i32,
    /// Play-field height in pixels
    pub height: i32,
    /// Side of one grid cell in pixels
    pub block_size: i32,
    /// Frames per second while training with a display
    pub speed: u32,
    /// Frames per second in human play
    pub speed_play: u32,
    /// Snake length after a reset
    pub initial_length: usize,
    /// A game ends once more than `stall_factor * snake length` moves pass without food
    ///
    /// Checked before each move against the length the snake has before that
    /// move, so the move made once the count exceeds the cap is the terminal one.
    pub stall_factor: u32,
    pub food_reward: f32,
    pub death_penalty: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            block_size: 20,
            speed: 40,
            speed_play: 20,
            initial_length: 3,
            stall_factor: 100,
            food_reward: 10.0,
            death_penalty: -10.0,
        }
    }
}

/// Learner hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Learning rate
    pub lr: f64,
    /// Discount factor
    pub gamma: f32,
    /// Transitions sampled for each end-of-game update
    pub batch_size: usize,
    /// Replay memory capacity
    pub memory_capacity: usize,
    /// Width of the hidden layer
    pub hidden_size: usize,
    /// Exploration probability before the first game
    pub epsilon_start: f32,
    /// Games after which exploration stops entirely
    pub epsilon_decay_games: u32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            lr: 0.001,
            gamma: 0.9,
            batch_size: 1000,
            memory_capacity: 100_000,
            hidden_size: 256,
            epsilon_start: 0.4,
            epsilon_decay_games: 80,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Where the best model is saved and loaded from (extension is added)
    pub model_path: PathBuf,
    /// Stop after this many games; train forever when unset
    pub max_games: Option<u32>,
    /// Seed for food placement, exploration and network initialization
    pub seed: Option<u64>,
    /// Run without the terminal dashboard
    pub headless: bool,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("./model/model"),
            max_games: None,
            seed: None,
            headless: false,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            warn!("Config file '{}' not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Validation(msg.into()));
        let game = &self.game;
        let agent = &self.agent;

        if game.block_size <= 0 {
            return invalid("game.block_size must be > 0");
        }
        if game.width <= 0 || game.height <= 0 {
            return invalid("game.width and game.height must be > 0");
        }
        if game.width % game.block_size != 0 || game.height % game.block_size != 0 {
            return invalid("game.width and game.height must be multiples of game.block_size");
        }
        if game.initial_length == 0 {
            return invalid("game.initial_length must be > 0");
        }
        // the initial snake extends left from the center column
        let center_col = (game.width / game.block_size / 2) as usize;
        if game.initial_length > center_col + 1 {
            return invalid("game.initial_length does not fit left of the center");
        }
        if game.stall_factor == 0 {
            return invalid("game.stall_factor must be > 0");
        }
        if game.speed == 0 || game.speed_play == 0 {
            return invalid("game.speed and game.speed_play must be > 0");
        }

        if agent.lr <= 0.0 {
            return invalid("agent.lr must be > 0");
        }
        if !(0.0..=1.0).contains(&agent.gamma) {
            return invalid("agent.gamma must be in [0, 1]");
        }
        if agent.batch_size == 0 {
            return invalid("agent.batch_size must be > 0");
        }
        if agent.memory_capacity == 0 {
            return invalid("agent.memory_capacity must be > 0");
        }
        if agent.hidden_size == 0 {
            return invalid("agent.hidden_size must be > 0");
        }
        if !(0.0..=1.0).contains(&agent.epsilon_start) {
            return invalid("agent.epsilon_start must be in [0, 1]");
        }
        if agent.epsilon_decay_games == 0 {
            return invalid("agent.epsilon_decay_games must be > 0");
        }

        if self.training.max_games == Some(0) {
            return invalid("training.max_games must be > 0");
        }

        Ok(())
    }
}
