//! Terminal dashboard and play screens
//!
//! Training runs on the calling thread and sends [`Update`]s to the dashboard,
//! which renders on its own thread. The dashboard only ever sees board
//! snapshots and metrics, never the game or the agent.

use std::{
    io,
    sync::mpsc::{self, Sender},
    thread::{self, JoinHandle},
};

use log::{LevelFilter, SetLoggerError};

mod app;
mod components;
mod play;
mod tui;
mod util;

pub use app::{App, Update};
pub use components::BoardSnapshot;
pub use play::{key_direction, play_agent, play_human};

/// Spawn the dashboard thread
///
/// ### Arguments
/// - `plots` Names of the plotted metrics, in the order of [`Update::Episode`] data
/// - `games` Total number of games, if known, for the progress bar
///
/// ### Returns
/// The dashboard thread, which finishes when the user quits, and the sender to
/// feed it. Sending fails once the user has quit.
pub fn init(plots: &[&'static str], games: Option<u32>) -> (JoinHandle<io::Result<()>>, Sender<Update>) {
    let (tx, rx) = mpsc::channel();
    let plots = plots.to_vec();
    let handle = thread::spawn(move || App::new(&plots, games).run(rx));
    (handle, tx)
}

/// Route `log` records to the dashboard's log pane
pub fn init_logger(level: LevelFilter) -> Result<(), SetLoggerError> {
    tui_logger::init_logger(level)?;
    tui_logger::set_default_level(level);
    Ok(())
}
