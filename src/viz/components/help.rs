use ratatui::{prelude::*, widgets::*};

use crate::viz::app::Tab;

fn key_line(key: &'static str, action: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::from(key).light_cyan().bold(),
        Span::raw(" : "),
        Span::raw(action),
    ])
}

/// Key bindings shown in the help popup for `tab`
pub fn help_lines(tab: Tab) -> Vec<Line<'static>> {
    let mut lines = vec![
        key_line("  q  ", "Stop training and exit"),
        key_line("  h  ", "Toggle help popup"),
        key_line(" Tab ", "Switch tabs"),
    ];

    match tab {
        Tab::Board => {}
        Tab::Plots => lines.push(key_line("⬅ / ➡", "Switch plots")),
        Tab::Logs => lines.extend([
            key_line("  s  ", "Toggle the target selector"),
            key_line("  f  ", "Focus on the selected target only"),
            key_line("⬆ / ⬇", "Switch log target"),
            key_line("⬅ / ➡", "Show one level less/more"),
            key_line("- / +", "Capture one level less/more"),
            key_line("PgUp ", "Enter page mode and scroll up"),
            key_line("PgDn ", "Scroll down in page mode"),
            key_line(" Esc ", "Leave page mode"),
            key_line("Space", "Toggle hiding of disabled targets"),
        ]),
    }

    lines
}

pub fn render_help(area: Rect, buf: &mut Buffer, tab: Tab) {
    let lines = help_lines(tab);

    let [_, center_vert, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length((lines.len() + 4) as u16),
        Constraint::Fill(1),
    ])
    .areas(area);

    let [_, center, _] = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(60),
        Constraint::Fill(1),
    ])
    .areas(center_vert);

    Clear.render(center, buf);

    Paragraph::new(lines)
        .block(
            Block::bordered()
                .border_type(BorderType::Rounded)
                .padding(Padding::horizontal(1))
                .title("Help"),
        )
        .wrap(Wrap { trim: false })
        .render(center, buf);
}
