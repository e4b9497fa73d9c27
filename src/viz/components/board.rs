use ratatui::{prelude::*, widgets::*};

use crate::game::{Board, Position};

/// A copy of everything needed to draw the play-field
///
/// Renderers get snapshots instead of the game itself, so drawing can happen on
/// another thread and can never change the game.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardSnapshot {
    /// Snake segments, head first
    pub snake: Vec<Position>,
    pub food: Option<Position>,
    pub score: u32,
    cols: u16,
    rows: u16,
    block_size: i32,
}

impl BoardSnapshot {
    pub fn capture(board: &impl Board) -> Self {
        let (width, height) = board.bounds();
        let block_size = board.block_size();
        Self {
            snake: board.body().to_vec(),
            food: Some(board.food()),
            score: board.score(),
            cols: (width / block_size) as u16,
            rows: (height / block_size) as u16,
            block_size,
        }
    }

    /// Grid cell `(col, row)` of a position, if it lies on the play-field
    fn cell(&self, pos: Position) -> Option<(u16, u16)> {
        if self.block_size <= 0 || pos.x < 0 || pos.y < 0 {
            return None;
        }
        let col = u16::try_from(pos.x / self.block_size).ok()?;
        let row = u16::try_from(pos.y / self.block_size).ok()?;
        (col < self.cols && row < self.rows).then_some((col, row))
    }

    /// Terminal area needed to show the whole play-field, borders included
    pub fn size(&self) -> (u16, u16) {
        (self.cols * 2 + 2, self.rows + 2)
    }
}

impl WidgetRef for BoardSnapshot {
    fn render_ref(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .title(format!("Score: {}", self.score));
        let inner = block.inner(area);
        block.render(area, buf);

        // every cell is two characters wide to look roughly square
        let mut paint = |pos: Position, color: Color| {
            let Some((col, row)) = self.cell(pos) else {
                return;
            };
            let x = inner.x + col * 2;
            let y = inner.y + row;
            if x + 1 < inner.right() && y < inner.bottom() {
                buf.set_string(x, y, "██", Style::default().fg(color));
            }
        };

        if let Some(food) = self.food {
            paint(food, Color::Red);
        }
        for (i, &segment) in self.snake.iter().enumerate().rev() {
            paint(segment, if i == 0 { Color::LightGreen } else { Color::Blue });
        }
    }
}
