pub mod dqn;

pub use dqn::{DQNModel, QTrainer};
