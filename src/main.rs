use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use burn::backend::{Autodiff, NdArray};
use clap::{Parser, ValueEnum};
use log::info;
use snake_rl::{
    config::Config,
    persistence::FileStore,
    train::{Trainer, TrainingStats},
};
use tracing_subscriber::EnvFilter;

type Backend = Autodiff<NdArray>;

/// Train a deep Q-learning agent to play snake
#[derive(Parser)]
#[command(name = "snake-rl", version, about)]
struct Cli {
    /// What to run
    #[arg(value_enum, default_value = "train")]
    mode: Mode,

    /// Path to TOML configuration file
    #[arg(long, default_value = "snake.toml")]
    config: PathBuf,

    /// Play-field width in pixels
    #[arg(long)]
    width: Option<i32>,

    /// Play-field height in pixels
    #[arg(long)]
    height: Option<i32>,

    /// Grid cell size in pixels
    #[arg(long)]
    block_size: Option<i32>,

    /// Frames per second (training with the dashboard, or watching the agent)
    #[arg(long)]
    speed: Option<u32>,

    /// Frames per second in human play
    #[arg(long)]
    speed_play: Option<u32>,

    /// Seed for food placement, exploration and network initialization
    #[arg(long)]
    seed: Option<u64>,

    /// Run without the terminal dashboard, logging to stderr
    #[arg(long)]
    headless: bool,

    /// Where the best model is saved and loaded from
    #[arg(long)]
    model_path: Option<PathBuf>,

    /// Stop after this many games
    #[arg(long)]
    max_games: Option<u32>,

    /// Override learning rate
    #[arg(long)]
    lr: Option<f64>,

    /// Override discount factor
    #[arg(long)]
    gamma: Option<f32>,

    /// Override replay batch size
    #[arg(long)]
    batch_size: Option<usize>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    /// Train the agent, saving every new record
    Train,
    /// Play with the keyboard
    Play,
    /// Watch the saved agent play without learning
    PlayAi,
}

impl Cli {
    fn apply(&self, config: &mut Config) {
        let game = &mut config.game;
        if let Some(width) = self.width {
            game.width = width;
        }
        if let Some(height) = self.height {
            game.height = height;
        }
        if let Some(block_size) = self.block_size {
            game.block_size = block_size;
        }
        if let Some(speed) = self.speed {
            game.speed = speed;
        }
        if let Some(speed_play) = self.speed_play {
            game.speed_play = speed_play;
        }

        let agent = &mut config.agent;
        if let Some(lr) = self.lr {
            agent.lr = lr;
        }
        if let Some(gamma) = self.gamma {
            agent.gamma = gamma;
        }
        if let Some(batch_size) = self.batch_size {
            agent.batch_size = batch_size;
        }

        let training = &mut config.training;
        if let Some(model_path) = &self.model_path {
            training.model_path = model_path.clone();
        }
        if self.max_games.is_some() {
            training.max_games = self.max_games;
        }
        if self.seed.is_some() {
            training.seed = self.seed;
        }
        training.headless |= self.headless;
    }
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("failed to install logger: {e}"))
}

#[cfg(feature = "viz")]
fn init_logging(headless: bool) -> Result<()> {
    if headless {
        init_tracing()
    } else {
        snake_rl::viz::init_logger(log::LevelFilter::Info).context("failed to install logger")
    }
}

#[cfg(not(feature = "viz"))]
fn init_logging(_headless: bool) -> Result<()> {
    init_tracing()
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // the dashboard logger needs the headless flag, which the config file may set
    let headless = cli.headless
        || !cfg!(feature = "viz")
        || Config::load(&cli.config).is_ok_and(|config| config.training.headless);
    init_logging(headless)?;

    let mut config = Config::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    cli.apply(&mut config);
    config.validate().context("invalid configuration")?;

    match cli.mode {
        Mode::Train => train(&config, headless),
        Mode::Play => play(&config),
        Mode::PlayAi => play_ai(&config, headless),
    }
}

fn trainer(config: &Config) -> Result<Trainer<Backend, FileStore>> {
    let store = FileStore::new(&config.training.model_path);
    Trainer::new(config, Default::default(), store).context("failed to set up training")
}

fn summary(stats: &TrainingStats) -> String {
    format!(
        "{} games, record {}, mean score {:.2}",
        stats.games(),
        stats.record,
        stats.mean_score()
    )
}

fn train(config: &Config, headless: bool) -> Result<()> {
    let mut trainer = trainer(config)?;

    if headless {
        trainer.run(|_| {})?;
    } else {
        #[cfg(feature = "viz")]
        dashboard::train(&mut trainer, config)?;
    }

    info!("Training finished: {}", summary(trainer.stats()));
    Ok(())
}

#[cfg(feature = "viz")]
fn play(config: &Config) -> Result<()> {
    match snake_rl::viz::play_human(&config.game, config.training.seed)? {
        Some(score) => println!("Game over! Final score: {score}"),
        None => println!("Quit"),
    }
    Ok(())
}

#[cfg(not(feature = "viz"))]
fn play(_config: &Config) -> Result<()> {
    anyhow::bail!("human play needs the `viz` feature")
}

fn play_ai(config: &Config, headless: bool) -> Result<()> {
    let store = FileStore::new(&config.training.model_path);
    let weights = store.weights_path();
    let mut trainer = Trainer::<Backend, _>::resume(config, Default::default(), store)
        .with_context(|| format!("cannot play the saved model at {}", weights.display()))?;

    let scores = if headless {
        let games = config.training.max_games.unwrap_or(1) as usize;
        let mut scores = Vec::with_capacity(games);
        while scores.len() < games {
            if let Some(score) = trainer.greedy_step()? {
                info!("Game {} Score {}", scores.len() + 1, score);
                scores.push(score);
            }
        }
        scores
    } else {
        #[cfg(feature = "viz")]
        let scores = snake_rl::viz::play_agent(
            &mut trainer,
            config.game.speed,
            config.training.max_games,
        )?;
        #[cfg(not(feature = "viz"))]
        let scores = Vec::new();
        scores
    };

    let mut stats = TrainingStats::default();
    scores.iter().for_each(|&score| stats.push(score));
    println!("{}", summary(&stats));
    Ok(())
}

#[cfg(feature = "viz")]
mod dashboard {
    use std::{
        thread,
        time::{Duration, Instant},
    };

    use anyhow::{anyhow, Result};
    use snake_rl::{
        config::Config,
        persistence::FileStore,
        train::Trainer,
        viz::{self, BoardSnapshot, Update},
    };

    use super::Backend;

    /// Train at `config.game.speed` moves per second while the dashboard draws
    ///
    /// Quitting the dashboard stops training.
    pub fn train(trainer: &mut Trainer<Backend, FileStore>, config: &Config) -> Result<()> {
        let (handle, tx) = viz::init(&["Score", "Mean Score"], config.training.max_games);
        let frame = Duration::from_secs_f64(1.0 / f64::from(config.game.speed));

        let mut result = Ok(());
        while !trainer.is_done() {
            let start = Instant::now();
            let report = match trainer.step() {
                Ok(report) => report,
                Err(e) => {
                    result = Err(e);
                    break;
                }
            };

            let mut updates = vec![Update::Frame(BoardSnapshot::capture(trainer.game()))];
            if let Some(report) = report {
                updates.push(Update::Episode {
                    game: report.game,
                    data: vec![f64::from(report.score), report.mean_score],
                });
            }
            if updates.into_iter().any(|update| tx.send(update).is_err()) {
                break;
            }

            if let Some(rest) = frame.checked_sub(start.elapsed()) {
                thread::sleep(rest);
            }
        }

        drop(tx);
        handle
            .join()
            .map_err(|_| anyhow!("dashboard thread panicked"))??;
        Ok(result?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let cli = Cli::parse_from([
            "snake-rl",
            "play",
            "--speed-play",
            "8",
            "--speed",
            "60",
            "--gamma",
            "0.5",
            "--max-games",
            "3",
        ]);
        assert!(matches!(cli.mode, Mode::Play));

        let mut config = Config::default();
        cli.apply(&mut config);
        assert_eq!(config.game.speed_play, 8);
        assert_eq!(config.game.speed, 60);
        assert_eq!(config.agent.gamma, 0.5);
        assert_eq!(config.training.max_games, Some(3));
        assert_eq!(config.agent.lr, 0.001, "unset flags keep config values");
    }

    #[test]
    fn play_ai_mode_name() {
        let cli = Cli::parse_from(["snake-rl", "play-ai", "--headless"]);
        assert!(matches!(cli.mode, Mode::PlayAi));

        let mut config = Config::default();
        cli.apply(&mut config);
        assert!(config.training.headless);
    }
}
