use crate::error::GameError;

/// Feedback from the environment for a single step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Outcome {
    /// The reward received after taking the action
    pub reward: f32,
    /// Whether the episode has ended
    pub terminal: bool,
    /// The running score of the episode
    pub score: u32,
}

/// Represents a Markov decision process, defining the dynamics of an environment
/// in which an agent can operate.
///
/// This base trait represents the common case of a discrete-time MDP with one agent
/// and a finite action space.
pub trait Environment {
    /// A representation of the state of the environment to be passed to an agent
    type State: Clone;

    /// A representation of an action that an agent can take to affect the environment
    type Action: Clone;

    /// Encode the current state for the agent
    fn observe(&self) -> Self::State;

    /// Update the environment in response to an action taken by an agent
    fn step(&mut self, action: Self::Action) -> Result<Outcome, GameError>;

    /// Reset the environment to an initial state
    fn reset(&mut self) -> Result<(), GameError>;
}
