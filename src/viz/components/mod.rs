mod board;
mod help;
mod logs;
mod plot;

use crossterm::event::Event;
use ratatui::widgets::WidgetRef;

pub use board::BoardSnapshot;
pub use help::render_help;
pub use logs::Logs;
pub use plot::Plots;

/// A widget that can react to terminal events
pub trait Component: WidgetRef {
    /// Returns whether the event was consumed
    fn handle_ui_event(&mut self, event: &Event) -> bool;
}
