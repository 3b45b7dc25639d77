use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use crate::game::{CellState, Game, Outcome, Position};
use crate::metrics::GameMetrics;

const SQUARE: &str = "█";

/// Draws a game as a square canvas of fixed-size cells
pub struct Renderer {
    cell_width: u16,
}

impl Renderer {
    pub fn new(cell_width: u16) -> Self {
        Self {
            cell_width: cell_width.max(1),
        }
    }

    /// Terminal columns and rows the grid occupies, border excluded
    pub fn canvas_size(&self, grid_size: usize) -> (u16, u16) {
        let n = u16::try_from(grid_size).unwrap_or(u16::MAX);
        (n.saturating_mul(self.cell_width), n)
    }

    pub fn render(&self, frame: &mut Frame, game: &Game, metrics: &GameMetrics) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Game area
                Constraint::Length(3), // Footer
            ])
            .split(frame.area());

        let stats = self.render_stats(game, metrics);
        frame.render_widget(stats, chunks[0]);

        let (width, height) = self.canvas_size(game.grid().size());
        let canvas = centered(chunks[1], width + 2, height + 2);
        frame.render_widget(self.render_grid(game), canvas);

        let controls = self.render_controls(game.is_finished());
        frame.render_widget(controls, chunks[2]);
    }

    fn render_grid(&self, game: &Game) -> Paragraph<'static> {
        let title = match (game.outcome(), game.is_paused()) {
            (Some(Outcome::BoardFull), _) => " You won! ",
            (Some(Outcome::Collision), _) => " Game over ",
            (None, true) => " Paused ",
            (None, false) => " Snake ",
        };

        let border_color = if game.is_finished() {
            Color::Red
        } else {
            Color::White
        };

        Paragraph::new(self.grid_lines(game)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(Style::default().fg(border_color))
                .title(title),
        )
    }

    /// One line per grid row, one span per cell
    pub fn grid_lines(&self, game: &Game) -> Vec<Line<'static>> {
        let size = game.grid().size();
        let head = game.snake().head();
        let width = self.cell_width as usize;

        (0..size)
            .map(|y| {
                let spans: Vec<Span> = (0..size)
                    .map(|x| {
                        let pos = Position::new(x, y);
                        match game.grid().get(pos) {
                            CellState::SnakeBody if pos == head => Span::styled(
                                SQUARE.repeat(width),
                                Style::default()
                                    .fg(Color::Cyan)
                                    .add_modifier(Modifier::BOLD),
                            ),
                            CellState::SnakeBody => {
                                Span::styled(SQUARE.repeat(width), Style::default().fg(Color::Green))
                            }
                            CellState::Food => {
                                Span::styled(SQUARE.repeat(width), Style::default().fg(Color::Red))
                            }
                            CellState::Empty => Span::styled(
                                format!("{:<width$}", ".", width = width),
                                Style::default().fg(Color::DarkGray),
                            ),
                        }
                    })
                    .collect();
                Line::from(spans)
            })
            .collect()
    }

    fn render_stats(&self, game: &Game, metrics: &GameMetrics) -> Paragraph<'static> {
        let mut spans = vec![
            Span::styled("Length: ", Style::default().fg(Color::Yellow)),
            Span::styled(
                game.snake().len().to_string(),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("    "),
            Span::styled("Score: ", Style::default().fg(Color::Yellow)),
            Span::styled(game.score().to_string(), Style::default().fg(Color::White)),
            Span::raw("    "),
            Span::styled("Steps: ", Style::default().fg(Color::Yellow)),
            Span::styled(game.steps().to_string(), Style::default().fg(Color::White)),
            Span::raw("    "),
            Span::styled("Time: ", Style::default().fg(Color::Yellow)),
            Span::styled(metrics.format_time(), Style::default().fg(Color::White)),
        ];

        if game.is_paused() {
            spans.push(Span::raw("    "));
            spans.push(Span::styled(
                "PAUSED",
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
            ));
        }

        Paragraph::new(vec![Line::from(spans)]).alignment(Alignment::Center)
    }

    fn render_controls(&self, finished: bool) -> Paragraph<'static> {
        if finished {
            let text = Line::from(Span::styled(
                "Press any key to exit",
                Style::default().fg(Color::Yellow),
            ));
            return Paragraph::new(text).alignment(Alignment::Center);
        }

        let text = vec![Line::from(vec![
            Span::styled("↑↓←→", Style::default().fg(Color::Cyan)),
            Span::raw(" or "),
            Span::styled("WASD", Style::default().fg(Color::Cyan)),
            Span::raw(" to move | "),
            Span::styled("Space", Style::default().fg(Color::Cyan)),
            Span::raw("/"),
            Span::styled("P", Style::default().fg(Color::Cyan)),
            Span::raw(" to pause | "),
            Span::styled("Q", Style::default().fg(Color::Red)),
            Span::raw(" to quit"),
        ])];

        Paragraph::new(text).alignment(Alignment::Center)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(2)
    }
}

/// A `width` x `height` rect centred in `area`, clipped to fit
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
