use ratatui::layout::{Constraint, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};
use ratatui::Frame;

use crate::ui::layout::popup;

pub fn render(f: &mut Frame, message: &str) {
    let inner = popup(f, 50, 25, "Confirm", Color::Yellow);
    let [body, choices] = Layout::vertical([Constraint::Min(2), Constraint::Length(1)])
        .margin(1)
        .areas(inner);

    f.render_widget(Paragraph::new(message).wrap(Wrap { trim: false }), body);
    f.render_widget(Paragraph::new(choice_line()), choices);
}

fn choice_line() -> Line<'static> {
    let key = Style::default().add_modifier(Modifier::BOLD);
    let hint = Style::default().fg(Color::DarkGray);
    Line::from(vec![
        Span::styled("[Y]", key.fg(Color::Green)),
        Span::styled("es", hint),
        Span::raw("   "),
        Span::styled("[N]", key.fg(Color::Red)),
        Span::styled("o / Esc", hint),
    ])
}

/// Overlay shown while a create or delete runs. Keys are ignored until the
/// operation reports back.
pub fn render_loading(f: &mut Frame, message: &str) {
    let inner = popup(f, 40, 15, "Working", Color::DarkGray);
    let lines = vec![
        Line::default(),
        Line::styled(format!(" {message}"), Style::default().fg(Color::Yellow)),
    ];
    f.render_widget(Paragraph::new(lines), inner);
}
