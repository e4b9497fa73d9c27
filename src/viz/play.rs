use std::time::{Duration, Instant};

use anyhow::Context;
use burn::tensor::backend::AutodiffBackend;
use crossterm::event::{self, KeyCode};
use log::info;
use ratatui::{prelude::*, widgets::*};

use super::{
    components::BoardSnapshot,
    tui::{self, Tui},
    util::{centered, event_keycode},
};
use crate::{
    config::GameConfig,
    game::{Action, Board, Direction, SnakeGame},
    persistence::ModelStore,
    train::Trainer,
    util::{seeded_rng, GAME_STREAM},
};

/// Heading requested by a key: arrows or WASD
pub fn key_direction(key: KeyCode) -> Option<Direction> {
    match key {
        KeyCode::Up | KeyCode::Char('w') => Some(Direction::Up),
        KeyCode::Down | KeyCode::Char('s') => Some(Direction::Down),
        KeyCode::Left | KeyCode::Char('a') => Some(Direction::Left),
        KeyCode::Right | KeyCode::Char('d') => Some(Direction::Right),
        _ => None,
    }
}

fn frame_time(fps: u32) -> Duration {
    Duration::from_secs_f64(1.0 / f64::from(fps.max(1)))
}

fn draw(terminal: &mut Tui, board: &BoardSnapshot, footer: &str) -> std::io::Result<()> {
    terminal.draw(|frame| {
        let [board_area, footer_area] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(frame.size());
        let (width, height) = board.size();
        board.render_ref(centered(board_area, width, height), frame.buffer_mut());
        frame.render_widget(
            Paragraph::new(footer).dark_gray().alignment(Alignment::Center),
            footer_area,
        );
    })?;
    Ok(())
}

/// Wait out the rest of the frame, collecting the last key pressed
///
/// Returns `None` when the player asked to quit.
fn poll_frame(deadline: Instant) -> std::io::Result<Option<Option<KeyCode>>> {
    let mut last = None;
    while let Some(timeout) = deadline.checked_duration_since(Instant::now()) {
        if !event::poll(timeout)? {
            continue;
        }
        match event_keycode(&event::read()?) {
            Some(KeyCode::Char('q') | KeyCode::Esc) => return Ok(None),
            Some(key) => last = Some(key),
            None => {}
        }
    }
    Ok(Some(last))
}

/// Let a human play one game with the keyboard
///
/// Reversing into the snake's own body is ignored. Returns the final score, or
/// `None` if the player quit.
pub fn play_human(config: &GameConfig, seed: Option<u64>) -> anyhow::Result<Option<u32>> {
    let mut game = SnakeGame::new(config.clone(), seeded_rng(seed, GAME_STREAM))
        .context("failed to start the game")?;
    let frame = frame_time(config.speed_play);

    tui::with_terminal(|terminal| {
        let mut desired = game.direction();
        loop {
            draw(
                terminal,
                &BoardSnapshot::capture(&game),
                "arrows / wasd: steer   q: quit",
            )?;

            let Some(key) = poll_frame(Instant::now() + frame)? else {
                return Ok(None);
            };
            if let Some(direction) = key.and_then(key_direction) {
                desired = direction;
            }

            let outcome = game.step(Action::towards(game.direction(), desired))?;
            if outcome.terminal {
                return Ok(Some(outcome.score));
            }
        }
    })
}

/// Watch the trained agent play greedily, without learning
///
/// Plays `games` games, or until the viewer quits when unset. Returns the final
/// score of every completed game.
pub fn play_agent<B, S>(
    trainer: &mut Trainer<B, S>,
    fps: u32,
    games: Option<u32>,
) -> anyhow::Result<Vec<u32>>
where
    B: AutodiffBackend,
    S: ModelStore<B>,
{
    let frame = frame_time(fps);
    let mut scores = Vec::new();

    tui::with_terminal(|terminal| {
        while games.map_or(true, |games| scores.len() < games as usize) {
            let footer = format!("game {}   q: quit", scores.len() + 1);
            draw(terminal, &BoardSnapshot::capture(trainer.game()), &footer)?;

            if poll_frame(Instant::now() + frame)?.is_none() {
                break;
            }

            if let Some(score) = trainer.greedy_step()? {
                info!("Game {} Score {}", scores.len() + 1, score);
                scores.push(score);
            }
        }
        anyhow::Ok(())
    })?;

    Ok(scores)
}
