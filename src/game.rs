//! The snake game: geometry, simulation and state encoding
//!
//! The engine has no I/O or rendering dependencies and is driven identically
//! by the training loop and by the play modes.

mod encoder;
mod engine;
mod types;

pub use encoder::{encode, State, STATE_SIZE};
pub use engine::SnakeGame;
pub use types::{Action, Board, Direction, Position, NUM_ACTIONS};
