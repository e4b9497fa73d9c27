use crossterm::event::{Event, KeyCode};
use ratatui::{prelude::*, style::Stylize, widgets::*};

use crate::viz::util::event_keycode;

use super::Component;

/// A single metric over the course of training
pub struct Plot {
    title: &'static str,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
    data: Vec<(f64, f64)>,
}

impl Plot {
    pub fn new(title: &'static str, games: Option<u32>) -> Self {
        Self {
            title,
            x_bounds: [0.0, games.map_or(1.0, f64::from)],
            y_bounds: [0.0, 1.0],
            data: Vec::new(),
        }
    }

    pub fn update(&mut self, point: (f64, f64)) {
        let (x, y) = point;
        self.x_bounds[1] = self.x_bounds[1].max(x);
        self.y_bounds[0] = self.y_bounds[0].min(y);
        self.y_bounds[1] = self.y_bounds[1].max(y);
        self.data.push(point);
    }

    fn labels(bounds: [f64; 2], precision: usize) -> Vec<Span<'static>> {
        let mid = (bounds[0] + bounds[1]) / 2.0;
        [bounds[0], mid, bounds[1]]
            .iter()
            .map(|v| format!("{v:.precision$}").bold())
            .collect()
    }
}

impl WidgetRef for Plot {
    fn render_ref(&self, area: Rect, buf: &mut Buffer) {
        let dataset = Dataset::default()
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .cyan()
            .data(&self.data);

        let x_axis = Axis::default()
            .title("Game")
            .dark_gray()
            .labels(Self::labels(self.x_bounds, 0))
            .bounds(self.x_bounds);

        let y_axis = Axis::default()
            .title(self.title)
            .dark_gray()
            .labels(Self::labels(self.y_bounds, 1))
            .bounds(self.y_bounds);

        Chart::new(vec![dataset])
            .block(
                Block::bordered()
                    .border_type(BorderType::Rounded)
                    .title(self.title)
                    .padding(Padding::uniform(1)),
            )
            .x_axis(x_axis)
            .y_axis(y_axis)
            .render(area, buf);
    }
}

/// Tabbed set of [`Plot`]s, one per metric
pub struct Plots {
    plots: Vec<Plot>,
    selected: usize,
}

impl Plots {
    pub fn new(names: &[&'static str], games: Option<u32>) -> Self {
        Self {
            plots: names.iter().map(|&name| Plot::new(name, games)).collect(),
            selected: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.plots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plots.is_empty()
    }

    pub fn next_plot(&mut self) {
        if !self.is_empty() {
            self.selected = (self.selected + 1) % self.len();
        }
    }

    pub fn prev_plot(&mut self) {
        if !self.is_empty() {
            let len = self.len();
            self.selected = (self.selected + len - 1) % len;
        }
    }

    /// Add one value per plot for `game`. Extra values are ignored.
    pub fn update(&mut self, game: u32, data: &[f64]) {
        for (plot, &value) in self.plots.iter_mut().zip(data) {
            plot.update((f64::from(game), value));
        }
    }
}

impl WidgetRef for Plots {
    fn render_ref(&self, area: Rect, buf: &mut Buffer) {
        let [tabs_area, plot_area] =
            Layout::vertical([Constraint::Length(1), Constraint::Fill(1)]).areas(area);

        Tabs::new(self.plots.iter().map(|p| p.title))
            .white()
            .highlight_style(Style::default().light_green())
            .select(self.selected)
            .render(tabs_area, buf);

        if let Some(plot) = self.plots.get(self.selected) {
            plot.render_ref(plot_area, buf);
        }
    }
}

impl Component for Plots {
    fn handle_ui_event(&mut self, event: &Event) -> bool {
        match event_keycode(event) {
            Some(KeyCode::Left) => self.prev_plot(),
            Some(KeyCode::Right) => self.next_plot(),
            _ => return false,
        }
        true
    }
}
