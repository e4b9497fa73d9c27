use burn::{
    optim::{adaptor::OptimizerAdaptor, Adam, AdamConfig},
    tensor::backend::AutodiffBackend,
};
use rand::{rngs::StdRng, Rng};
use strum::VariantArray;

use crate::{
    algo::QTrainer,
    config::AgentConfig,
    decay,
    error::{ConfigError, TrainingError},
    exploration::{Choice, EpsilonGreedy},
    game::{Action, SnakeGame, State, NUM_ACTIONS},
    memory::{Exp, ExpBatch, ReplayMemory},
    model::QNet,
};

type AdamOptimizer<M, B> = OptimizerAdaptor<Adam<<B as AutodiffBackend>::InnerBackend>, M, B>;

/// A snake playing agent that learns online from every move and from replayed
/// experience at the end of every game
///
/// Exploration decays with the number of completed games, not with steps.
pub struct Agent<B: AutodiffBackend> {
    trainer: QTrainer<B, QNet<B>, AdamOptimizer<QNet<B>, B>>,
    memory: ReplayMemory<SnakeGame>,
    exploration: EpsilonGreedy<decay::Linear>,
    rng: StdRng,
    batch_size: usize,
    n_games: u32,
}

impl<B: AutodiffBackend> Agent<B> {
    /// Initialize a new `Agent`
    ///
    /// ### Arguments
    /// - `config` Learner hyperparameters
    /// - `model` The network to train, fresh or previously saved
    /// - `rng` Source of randomness for exploration and replay sampling
    /// - `device` The device `model` lives on
    pub fn new(
        config: &AgentConfig,
        model: QNet<B>,
        rng: StdRng,
        device: B::Device,
    ) -> Result<Self, ConfigError> {
        let epsilon =
            decay::Linear::over(config.epsilon_decay_games, config.epsilon_start, 0.0)?;

        Ok(Self {
            trainer: QTrainer::new(
                model,
                AdamConfig::new().init::<B, QNet<B>>(),
                config.gamma,
                config.lr,
                device,
            ),
            memory: ReplayMemory::new(config.memory_capacity),
            exploration: EpsilonGreedy::new(epsilon),
            rng,
            batch_size: config.batch_size,
            n_games: 0,
        })
    }

    /// Choose a move: random with probability `epsilon(n_games)`, greedy otherwise
    pub fn get_action(&mut self, state: &State) -> Action {
        match self.exploration.choose(self.n_games, &mut self.rng) {
            Choice::Explore => Action::VARIANTS[self.rng.gen_range(0..NUM_ACTIONS)],
            Choice::Exploit => self.greedy_action(state),
        }
    }

    /// The action with the highest estimated value. Ties go to the first action
    /// in `[straight, right, left]` order.
    pub fn greedy_action(&self, state: &State) -> Action {
        let q = self.trainer.q_values(*state);
        Action::VARIANTS
            .iter()
            .copied()
            .fold(Action::Straight, |best, action| {
                if q[action.index()] > q[best.index()] {
                    action
                } else {
                    best
                }
            })
    }

    pub fn remember(&mut self, exp: Exp<SnakeGame>) {
        self.memory.push(exp);
    }

    /// Learn from a single transition right after it happened
    pub fn train_short_memory(&mut self, exp: &Exp<SnakeGame>) -> Result<f32, TrainingError> {
        self.trainer.learn(ExpBatch::from_iter([exp], 1))
    }

    /// Learn from a batch replayed from memory
    ///
    /// Returns `Ok(None)` without touching the model when memory is empty.
    pub fn train_long_memory(&mut self) -> Result<Option<f32>, TrainingError> {
        if self.memory.is_empty() {
            return Ok(None);
        }

        let batch = self.memory.sample_zipped(self.batch_size, &mut self.rng);
        self.trainer.learn(batch).map(Some)
    }

    /// Count a completed game, which also advances the exploration schedule
    pub fn finish_game(&mut self) {
        self.n_games += 1;
    }

    /// Current exploration probability
    pub fn epsilon(&self) -> f32 {
        self.exploration.epsilon(self.n_games)
    }

    pub fn n_games(&self) -> u32 {
        self.n_games
    }

    pub fn model(&self) -> &QNet<B> {
        self.trainer.model()
    }

    pub fn memory(&self) -> &ReplayMemory<SnakeGame> {
        &self.memory
    }
}
