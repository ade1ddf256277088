use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph};
use ratatui::Frame;

use crate::app::App;

/// Title row, body, two-line status bar.
pub fn main_layout(area: Rect) -> [Rect; 3] {
    Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(10),
        Constraint::Length(2),
    ])
    .areas(area)
}

/// Site table on the left, details of the selection on the right.
pub fn content_layout(area: Rect) -> [Rect; 2] {
    Layout::horizontal([Constraint::Percentage(40), Constraint::Percentage(60)]).areas(area)
}

pub fn render_title(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![Span::styled(
        " Site Manager ",
        Style::default().fg(Color::Yellow),
    )];
    if let Some(root) = &app.root_label {
        spans.push(Span::styled(
            root.as_str(),
            Style::default().fg(Color::DarkGray),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Clear a centered popup, draw its border and return the area inside it.
pub fn popup(
    f: &mut Frame,
    width_pct: u16,
    height_pct: u16,
    title: &str,
    accent: Color,
) -> Rect {
    let area = centered_rect(width_pct, height_pct, f.area());
    f.render_widget(Clear, area);
    let block = Block::bordered()
        .title(format!(" {title} "))
        .border_style(Style::default().fg(accent));
    let inner = block.inner(area);
    f.render_widget(block, area);
    inner
}

/// A rectangle covering the given percentages of `area`, centered in it.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let [row] = Layout::vertical([Constraint::Percentage(percent_y)])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Percentage(percent_x)])
        .flex(Flex::Center)
        .areas(row);
    cell
}
