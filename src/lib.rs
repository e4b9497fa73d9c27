/// The snake playing agent
pub mod agent;

/// Implemented RL algorithms
pub mod algo;

/// Configuration loading and validation
pub mod config;

/// Implementations of strategies for time-decaying hyperparameters
pub mod decay;

/// Data structures
pub mod ds;

/// Environment
pub mod env;

/// Error types
pub mod error;

/// Exploration policies
pub mod exploration;

/// The game of snake
pub mod game;

/// Experience replay
pub mod memory;

/// Q network
pub mod model;

/// Saving and loading trained networks
pub mod persistence;

/// Training sessions
pub mod train;

/// Conversions into burn tensors
pub mod traits;

/// Seeding and assertion helpers
pub mod util;

/// Terminal dashboard and play screens
#[cfg(feature = "viz")]
pub mod viz;
