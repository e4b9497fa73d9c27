use burn::{
    backend::{Autodiff, NdArray},
    tensor::Tensor,
};
use snake_rl::{
    config::Config,
    env::Environment,
    error::{PersistenceError, TrainingError},
    game::{Action, Board, Position, SnakeGame},
    persistence::{FileStore, ModelMetadata, ModelStore},
    model::QNetConfig,
    train::Trainer,
    util::{seeded_rng, GAME_STREAM},
};

type B = Autodiff<NdArray>;

fn small_config(model_path: std::path::PathBuf) -> Config {
    let mut config = Config::default();
    config.game.width = 200;
    config.game.height = 140;
    config.game.stall_factor = 10;
    config.agent.hidden_size = 16;
    config.agent.batch_size = 64;
    config.training.model_path = model_path;
    config.training.max_games = Some(5);
    config.training.seed = Some(21);
    config
}

#[test]
fn straight_move_on_fresh_game() {
    let config = Config::default();
    let mut game = SnakeGame::new(config.game.clone(), seeded_rng(Some(1), GAME_STREAM)).unwrap();
    let head = game.head();
    assert_eq!(
        game.body(),
        &[
            head,
            Position::new(head.x - 20, head.y),
            Position::new(head.x - 40, head.y)
        ]
    );

    // keep the food out of the way of the first move
    let ahead = Position::new(head.x + 20, head.y);
    while game.food() == ahead {
        game.place_food().unwrap();
    }

    let state = game.observe();
    assert_eq!(state.len(), 11);
    let outcome = game.step(Action::Straight).unwrap();
    assert_eq!(outcome.reward, 0.0);
    assert!(!outcome.terminal);
    assert_eq!(game.head(), ahead);
    assert_eq!(game.body().len(), 3);
}

#[test]
fn training_run_saves_and_reloads_records() {
    let dir = tempfile::tempdir().unwrap();
    let config = small_config(dir.path().join("model").join("snake"));
    let store = FileStore::new(&config.training.model_path);

    let mut trainer = Trainer::<B, _>::new(&config, Default::default(), store.clone()).unwrap();
    let mut reports = Vec::new();
    trainer.run(|report| reports.push(*report)).unwrap();

    assert_eq!(reports.len(), 5);
    let stats = trainer.stats();
    assert_eq!(stats.scores.len(), 5);
    assert_eq!(stats.mean_scores.len(), 5);
    assert_eq!(stats.record, *stats.scores.iter().max().unwrap());

    if stats.record > 0 {
        let meta = store.metadata().unwrap();
        assert_eq!(meta.record, stats.record);
        assert_eq!(meta.hidden_size, 16);
    } else {
        assert!(!store.weights_path().exists(), "nothing saved without a record");
    }

    // save the final model and pick it up in a new session
    let mut store = store;
    ModelStore::<B>::save(
        &mut store,
        trainer.agent().model(),
        &ModelMetadata::new(stats.record, 5, 16),
    )
    .unwrap();

    let mut config = config.clone();
    config.training.seed = Some(99);
    let resumed = Trainer::<B, _>::new(&config, Default::default(), store).unwrap();

    let input = Tensor::<B, 2>::ones([1, 11], &Default::default());
    let expected = trainer.agent().model().forward(input.clone()).into_data();
    let actual = resumed.agent().model().forward(input).into_data();
    assert_eq!(expected.convert::<f32>().value, actual.convert::<f32>().value);
    assert_eq!(resumed.stats().record, 0, "records restart with every session");
}

#[test]
fn resuming_rejects_a_model_of_another_size() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = small_config(dir.path().join("snake"));
    let mut store = FileStore::new(&config.training.model_path);

    let small = QNetConfig::new()
        .with_hidden_size(8)
        .init::<B>(&Default::default());
    ModelStore::<B>::save(&mut store, &small, &ModelMetadata::new(3, 10, 8)).unwrap();

    config.agent.hidden_size = 16;
    let result = Trainer::<B, _>::resume(&config, Default::default(), store.clone());
    assert!(
        matches!(
            result,
            Err(TrainingError::Persistence(PersistenceError::Incompatible(_)))
        ),
        "a mismatched model must not be replaced by fresh weights"
    );

    config.agent.hidden_size = 8;
    assert!(Trainer::<B, _>::resume(&config, Default::default(), store).is_ok());
}
