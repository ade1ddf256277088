use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use sm_core::models::ProvisionResponse;

use crate::ui::layout::popup;

/// The only place credentials are ever displayed. They are not stored
/// anywhere the UI can reach again once this dialog closes.
pub fn render(f: &mut Frame, response: &ProvisionResponse) {
    let title = format!("Site '{}' created", response.name);
    let inner = popup(f, 60, 60, &title, Color::Green);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Min(4), Constraint::Length(1)])
        .split(inner);

    let ports = &response.ports;
    let lines = vec![
        Line::from(Span::styled(
            "Copy these now. They are not shown again.",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        value_line("Database", &response.database_name),
        value_line("DB user", &response.database_user),
        value_line("DB password", &response.database_password),
        value_line("SFTP user", &response.transfer.user),
        value_line("SFTP pass", &response.transfer.password),
        Line::from(""),
        value_line("App port", &ports.app.to_string()),
        value_line("DB port", &ports.database.to_string()),
        value_line("PMA port", &ports.admin.to_string()),
        value_line("SFTP port", &ports.file_transfer.to_string()),
        value_line(
            "Created",
            &response.created_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        ),
    ];
    f.render_widget(Paragraph::new(lines), chunks[0]);

    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(" Enter", Style::default().fg(Color::Yellow)),
            Span::styled(" / ", Style::default().fg(Color::DarkGray)),
            Span::styled("Esc", Style::default().fg(Color::Yellow)),
            Span::styled(" close", Style::default().fg(Color::DarkGray)),
        ])),
        chunks[1],
    );
}

fn value_line(label: &str, value: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {label:<12}"), Style::default().fg(Color::DarkGray)),
        Span::styled(value.to_string(), Style::default().fg(Color::White)),
    ])
}
