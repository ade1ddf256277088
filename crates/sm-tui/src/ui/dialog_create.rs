use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::{App, CreateSiteField};
use crate::ui::layout::popup;

pub fn render(f: &mut Frame, app: &App) {
    let inner = popup(f, 60, 70, "New Site", Color::Yellow);

    // One label row and one input row per field, then a blank and the help line.
    let mut constraints: Vec<Constraint> = CreateSiteField::ALL
        .iter()
        .flat_map(|_| [Constraint::Length(1), Constraint::Length(1)])
        .collect();
    constraints.push(Constraint::Min(0));
    constraints.push(Constraint::Length(1));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(constraints)
        .split(inner);

    let form = &app.create_form;
    for (i, field) in CreateSiteField::ALL.iter().copied().enumerate() {
        let focused = form.focus == field;
        let style = field_style(focused);

        f.render_widget(
            Paragraph::new(Span::styled(
                format!("{}:", field.label()),
                Style::default().fg(Color::White),
            )),
            chunks[i * 2],
        );

        let value = form.value(field);
        let shown = if field.is_secret() {
            "*".repeat(value.chars().count())
        } else {
            value.to_string()
        };
        let cursor = if focused { "_" } else { "" };
        f.render_widget(
            Paragraph::new(Span::styled(
                format!(" {shown}{cursor}"),
                style.add_modifier(Modifier::UNDERLINED),
            )),
            chunks[i * 2 + 1],
        );
    }

    let help = Line::from(vec![
        Span::styled(" Tab", Style::default().fg(Color::Yellow)),
        Span::styled(" next field  ", Style::default().fg(Color::DarkGray)),
        Span::styled("Enter", Style::default().fg(Color::Yellow)),
        Span::styled(" create  ", Style::default().fg(Color::DarkGray)),
        Span::styled("Esc", Style::default().fg(Color::Yellow)),
        Span::styled(" cancel", Style::default().fg(Color::DarkGray)),
    ]);
    if let Some(help_area) = chunks.last() {
        f.render_widget(Paragraph::new(help), *help_area);
    }
}

fn field_style(focused: bool) -> Style {
    if focused {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    }
}
