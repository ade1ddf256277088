use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};
use ratatui::Frame;

use crate::ui::layout::popup;

type Bindings = &'static [(&'static str, &'static str)];

const SECTIONS: &[(&str, Bindings)] = &[
    (
        "Site List",
        &[
            ("n", "Create new site"),
            ("d", "Delete selected site"),
            ("r", "Rescan sites directory"),
            ("/", "Filter sites by name"),
            ("j/k Up/Down", "Move selection"),
            ("?", "Show this help"),
            ("q", "Quit"),
            ("Ctrl+C", "Quit immediately"),
        ],
    ),
    (
        "Filter",
        &[("Enter", "Keep filter"), ("Esc", "Clear filter")],
    ),
    (
        "Dialogs",
        &[
            ("Tab", "Next field"),
            ("Shift+Tab", "Previous field"),
            ("Enter", "Submit / confirm"),
            ("Esc", "Cancel / close"),
        ],
    ),
];

pub fn render(f: &mut Frame) {
    let inner = popup(f, 60, 70, "Help: Keybindings", Color::Cyan);

    let heading = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let key_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);

    let mut lines = Vec::new();
    for (i, (title, bindings)) in SECTIONS.iter().enumerate() {
        if i > 0 {
            lines.push(Line::default());
        }
        lines.push(Line::styled(format!("  {title}"), heading));
        lines.extend(bindings.iter().map(|(key, desc)| {
            Line::from(vec![
                Span::styled(format!("    {key:<12}"), key_style),
                Span::raw(*desc),
            ])
        }));
    }

    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}
