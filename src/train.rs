use burn::tensor::backend::AutodiffBackend;
use log::{debug, info, warn};

use crate::{
    agent::Agent,
    config::Config,
    env::Environment,
    error::{GameError, TrainingError},
    game::SnakeGame,
    memory::Exp,
    model::QNetConfig,
    persistence::{ModelMetadata, ModelStore},
    util::{seeded_rng, AGENT_STREAM, GAME_STREAM},
};

/// Score history of a training run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingStats {
    /// Final score of every completed game
    pub scores: Vec<u32>,
    /// Mean score over all games so far, after every completed game
    pub mean_scores: Vec<f64>,
    /// Best score of this run
    pub record: u32,
    total_score: u64,
}

impl TrainingStats {
    pub fn push(&mut self, score: u32) {
        self.total_score += u64::from(score);
        self.scores.push(score);
        self.mean_scores
            .push(self.total_score as f64 / self.scores.len() as f64);
        self.record = self.record.max(score);
    }

    pub fn games(&self) -> usize {
        self.scores.len()
    }

    pub fn mean_score(&self) -> f64 {
        self.mean_scores.last().copied().unwrap_or_default()
    }
}

/// Summary of one completed game
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeReport {
    /// Number of games completed, including this one
    pub game: u32,
    pub score: u32,
    /// Best score so far, including this game
    pub record: u32,
    pub mean_score: f64,
    /// Whether this game set a new record, which saves the model
    pub new_record: bool,
}

/// A training session: one game, one agent, and the store that receives every
/// new best model
///
/// ### Generics
/// - `B`: A burn autodiff backend
/// - `S`: Where record-setting models are saved and loaded from
pub struct Trainer<B: AutodiffBackend, S: ModelStore<B>> {
    game: SnakeGame,
    agent: Agent<B>,
    store: S,
    stats: TrainingStats,
    max_games: Option<u32>,
    hidden_size: usize,
}

impl<B, S> Trainer<B, S>
where
    B: AutodiffBackend,
    S: ModelStore<B>,
{
    /// Set up a session from `config`
    ///
    /// Seeds the backend when a seed is configured, then tries to continue from
    /// the model in `store`. A model that cannot be loaded is replaced by a fresh one.
    pub fn new(config: &Config, device: B::Device, store: S) -> Result<Self, TrainingError> {
        Self::build(config, device, store, false)
    }

    /// Set up a session that must continue from the model in `store`
    ///
    /// Unlike [`Trainer::new`], a missing or unusable model is an error.
    pub fn resume(config: &Config, device: B::Device, store: S) -> Result<Self, TrainingError> {
        Self::build(config, device, store, true)
    }

    fn build(
        config: &Config,
        device: B::Device,
        store: S,
        require_saved: bool,
    ) -> Result<Self, TrainingError> {
        config.validate()?;
        let seed = config.training.seed;
        if let Some(seed) = seed {
            B::seed(seed);
        }

        let model = QNetConfig::new()
            .with_hidden_size(config.agent.hidden_size)
            .init::<B>(&device);
        let model = match store.load(model.clone(), &device) {
            Ok(loaded) => {
                info!("Loaded saved model");
                loaded
            }
            Err(e) if require_saved => return Err(e.into()),
            Err(e) => {
                warn!("Starting from fresh parameters: {e}");
                model
            }
        };

        let game = SnakeGame::new(config.game.clone(), seeded_rng(seed, GAME_STREAM))?;
        let agent = Agent::new(
            &config.agent,
            model,
            seeded_rng(seed, AGENT_STREAM),
            device,
        )?;

        Ok(Self {
            game,
            agent,
            store,
            stats: TrainingStats::default(),
            max_games: config.training.max_games,
            hidden_size: config.agent.hidden_size,
        })
    }

    /// Play one move and learn from it
    ///
    /// Returns the game's report when the move ended it.
    pub fn step(&mut self) -> Result<Option<EpisodeReport>, TrainingError> {
        let state = self.game.observe();
        let action = self.agent.get_action(&state);
        let outcome = self.game.step(action)?;

        let exp = Exp {
            state,
            action,
            reward: outcome.reward,
            next_state: self.game.observe(),
            done: outcome.terminal,
        };
        self.agent.train_short_memory(&exp)?;
        self.agent.remember(exp);

        if outcome.terminal {
            self.finish_episode(outcome.score).map(Some)
        } else {
            Ok(None)
        }
    }

    fn finish_episode(&mut self, score: u32) -> Result<EpisodeReport, TrainingError> {
        self.game.reset()?;
        self.agent.finish_game();
        self.agent.train_long_memory()?;

        let new_record = score > self.stats.record;
        if new_record {
            let meta = ModelMetadata::new(score, self.agent.n_games(), self.hidden_size);
            self.store.save(self.agent.model(), &meta)?;
            debug!("Saved model with new record {score}");
        }

        self.stats.push(score);
        let report = EpisodeReport {
            game: self.agent.n_games(),
            score,
            record: self.stats.record,
            mean_score: self.stats.mean_score(),
            new_record,
        };

        info!(
            "Game {} Score {} Record {} Mean {:.2} Epsilon {:.3}",
            report.game,
            report.score,
            report.record,
            report.mean_score,
            self.agent.epsilon()
        );

        Ok(report)
    }

    /// Play until the current game ends
    pub fn run_episode(&mut self) -> Result<EpisodeReport, TrainingError> {
        loop {
            if let Some(report) = self.step()? {
                return Ok(report);
            }
        }
    }

    /// Play games until the configured limit, or forever without one
    ///
    /// `on_episode` observes every report and cannot influence training.
    pub fn run(&mut self, mut on_episode: impl FnMut(&EpisodeReport)) -> Result<(), TrainingError> {
        while !self.is_done() {
            let report = self.run_episode()?;
            on_episode(&report);
        }
        Ok(())
    }

    /// Play one greedy move without learning
    ///
    /// Returns the final score when the move ended the game, which is then reset.
    pub fn greedy_step(&mut self) -> Result<Option<u32>, GameError> {
        let action = self.agent.greedy_action(&self.game.observe());
        let outcome = self.game.step(action)?;
        if outcome.terminal {
            self.game.reset()?;
            Ok(Some(outcome.score))
        } else {
            Ok(None)
        }
    }

    /// Whether the configured number of games has been played
    pub fn is_done(&self) -> bool {
        self.max_games
            .is_some_and(|max| self.agent.n_games() >= max)
    }

    pub fn game(&self) -> &SnakeGame {
        &self.game
    }

    pub fn agent(&self) -> &Agent<B> {
        &self.agent
    }

    pub fn stats(&self) -> &TrainingStats {
        &self.stats
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn max_games(&self) -> Option<u32> {
        self.max_games
    }
}
