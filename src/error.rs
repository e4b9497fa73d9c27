use std::path::PathBuf;

use crate::game::Position;

/// Errors raised by the game engine. All of them are fatal to the caller.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("invalid action encoding {0:?}: expected exactly one of three entries set")]
    InvalidAction(Vec<f32>),

    #[error("no free cell left for food")]
    BoardFull,

    #[error("food placed on the snake at {0:?}")]
    FoodOnSnake(Position),
}

/// Errors that abort a training run.
#[derive(Debug, thiserror::Error)]
pub enum TrainingError {
    #[error("value estimates diverged (loss = {loss})")]
    Diverged { loss: f32 },

    #[error("game error: {0}")]
    Game(#[from] GameError),

    #[error("persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors from saving or loading network parameters.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("no saved model at {0}")]
    NotFound(PathBuf),

    #[error("failed to record model: {0}")]
    Recorder(String),

    #[error("saved model does not fit: {0}")]
    Incompatible(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}
