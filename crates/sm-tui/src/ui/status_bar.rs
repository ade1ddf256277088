use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::{App, Mode};

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let status_line = match app.status_message {
        Some(ref msg) => {
            let color = if msg.starts_with("Error") || msg.contains("failed") {
                Color::Red
            } else {
                Color::Green
            };
            Line::from(Span::styled(format!(" {msg}"), Style::default().fg(color)))
        }
        None => Line::from(""),
    };

    let hints = match app.mode {
        Mode::Filter => Line::from(vec![
            Span::raw(" Type to filter  "),
            hint("Enter", "keep"),
            Span::raw(" "),
            hint("Esc", "clear"),
        ]),
        Mode::CreateSiteDialog => Line::from(vec![
            hint("Tab", "next"),
            Span::raw(" "),
            hint("Enter", "create"),
            Span::raw(" "),
            hint("Esc", "cancel"),
        ]),
        Mode::Loading(_) => Line::from(Span::styled(
            " Waiting for the container runtime...",
            Style::default().fg(Color::DarkGray),
        )),
        _ => Line::from(vec![
            hint("N", "ew"),
            Span::raw(" "),
            hint("D", "elete"),
            Span::raw(" "),
            hint("R", "efresh"),
            Span::raw(" "),
            hint("/", "filter"),
            Span::raw(" "),
            hint("?", "help"),
            Span::raw(" "),
            hint("Q", "uit"),
        ]),
    };

    f.render_widget(Paragraph::new(vec![status_line, hints]), area);
}

fn hint(key: &str, label: &str) -> Span<'static> {
    Span::styled(
        format!("[{key}]{label}"),
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
}
