use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use sm_core::models::SiteRecord;

use crate::app::App;

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .title(" Details ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let Some(site) = app.selected_site() else {
        let message = if app.sites.is_empty() {
            " No sites yet. Press n to create one."
        } else {
            " No site matches the filter"
        };
        f.render_widget(Paragraph::new(message).block(block), area);
        return;
    };

    let paragraph = Paragraph::new(build_detail_lines(site))
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

fn build_detail_lines(site: &SiteRecord) -> Vec<Line<'static>> {
    let mut lines = vec![
        detail_line("Name", &site.name, Color::White),
        detail_line("Path", &site.path.display().to_string(), Color::DarkGray),
        Line::from(""),
        port_line("App", site.app_port),
        port_line("Database", site.database_port),
        port_line("phpMyAdmin", site.admin_port),
        port_line("SFTP", site.file_transfer_port),
    ];

    if site.app_port != 0 {
        lines.push(Line::from(""));
        lines.push(detail_line(
            "URL",
            &format!("http://localhost:{}", site.app_port),
            Color::Cyan,
        ));
    }

    lines
}

fn port_line(label: &str, port: u16) -> Line<'static> {
    if port == 0 {
        detail_line(label, "not set", Color::Red)
    } else {
        detail_line(label, &port.to_string(), Color::Green)
    }
}

fn detail_line(label: &str, value: &str, color: Color) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("  {label:<11} "),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(value.to_string(), Style::default().fg(color)),
    ])
}
