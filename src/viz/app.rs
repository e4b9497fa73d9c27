use std::{
    io,
    sync::mpsc::{Receiver, TryRecvError},
    time::Duration,
};

use crossterm::event::{self, Event, KeyCode};
use ratatui::{prelude::*, widgets::*};
use strum::{EnumIter, IntoEnumIterator};

use super::{
    components::{render_help, BoardSnapshot, Component, Logs, Plots},
    tui::{self, Tui},
    util::{centered, event_keycode},
};

#[derive(EnumIter, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Board,
    Plots,
    Logs,
}

impl Tab {
    fn title(self) -> &'static str {
        match self {
            Self::Board => "Board",
            Self::Plots => "Plots",
            Self::Logs => "Logs",
        }
    }

    fn next(self) -> Self {
        match self {
            Self::Board => Self::Plots,
            Self::Plots => Self::Logs,
            Self::Logs => Self::Board,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum State {
    #[default]
    Train,
    /// The training side hung up
    Finished,
    Quit,
}

/// Messages from the training loop to the dashboard
#[derive(Debug, Clone)]
pub enum Update {
    /// The board after a move
    Frame(BoardSnapshot),
    /// Metrics of a completed game, one value per plot
    Episode { game: u32, data: Vec<f64> },
}

/// The root TUI component which holds the dashboard state and runs the render loop
pub struct App {
    state: State,
    game: u32,
    total_games: Option<u32>,
    tab: Tab,
    show_help: bool,
    board: BoardSnapshot,
    plots: Plots,
    logs: Logs,
}

impl App {
    pub fn new(plots: &[&'static str], games: Option<u32>) -> Self {
        Self {
            state: State::default(),
            game: 0,
            total_games: games,
            tab: Tab::default(),
            show_help: false,
            board: BoardSnapshot::default(),
            plots: Plots::new(plots, games),
            logs: Logs::new(),
        }
    }

    pub fn update(&mut self, update: Update) {
        match update {
            Update::Frame(board) => self.board = board,
            Update::Episode { game, data } => {
                self.game = game;
                self.plots.update(game, &data);
            }
        }
    }

    /// Initialize the terminal and run the main loop until the user quits
    ///
    /// Restores the terminal on exit
    pub fn run(&mut self, rx: Receiver<Update>) -> io::Result<()> {
        tui::with_terminal(|terminal| self.main_loop(terminal, &rx))
    }

    fn main_loop(&mut self, terminal: &mut Tui, rx: &Receiver<Update>) -> io::Result<()> {
        while self.state != State::Quit {
            if self.state == State::Train {
                self.drain(rx);
            }

            terminal.draw(|frame| frame.render_widget(&*self, frame.size()))?;

            if event::poll(Duration::from_millis(16))? {
                self.handle_event(&event::read()?);
            }
        }
        Ok(())
    }

    fn drain(&mut self, rx: &Receiver<Update>) {
        loop {
            match rx.try_recv() {
                Ok(update) => self.update(update),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.state = State::Finished;
                    break;
                }
            }
        }
    }

    fn handle_event(&mut self, event: &Event) {
        match event_keycode(event) {
            Some(KeyCode::Char('q')) => self.state = State::Quit,
            Some(KeyCode::Char('h')) => self.show_help = !self.show_help,
            Some(KeyCode::Tab) => self.tab = self.tab.next(),
            Some(_) => {
                match self.tab {
                    Tab::Board => false,
                    Tab::Plots => self.plots.handle_ui_event(event),
                    Tab::Logs => self.logs.handle_ui_event(event),
                };
            }
            None => {}
        }
    }

    fn render_progress(&self, area: Rect, buf: &mut Buffer) {
        let title = match self.state {
            State::Finished => "Finished, press q to exit",
            _ => "Progress",
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .title(title);

        match self.total_games {
            Some(total) => Gauge::default()
                .block(block)
                .gauge_style(Color::Cyan)
                .label(format!("{}/{}", self.game, total))
                .ratio((f64::from(self.game) / f64::from(total.max(1))).min(1.0))
                .render(area, buf),
            None => Paragraph::new(format!("Game {}", self.game))
                .block(block)
                .render(area, buf),
        }
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let [menu_area, main_area, progress_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(3),
        ])
        .areas(area);

        Tabs::new(Tab::iter().map(Tab::title))
            .white()
            .bold()
            .highlight_style(Style::default().light_green())
            .select(self.tab as usize)
            .render(menu_area, buf);

        match self.tab {
            Tab::Board => {
                let (width, height) = self.board.size();
                self.board
                    .render_ref(centered(main_area, width, height), buf);
            }
            Tab::Plots => self.plots.render_ref(main_area, buf),
            Tab::Logs => self.logs.render_ref(main_area, buf),
        }

        self.render_progress(progress_area, buf);

        if self.show_help {
            render_help(area, buf, self.tab);
        }
    }
}
