use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState};
use ratatui::Frame;

use sm_core::models::SiteRecord;

use crate::app::{App, Mode};

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let visible = app.visible_sites();
    let items: Vec<ListItem> = visible
        .iter()
        .map(|site| {
            let line = Line::from(vec![
                Span::raw(" "),
                Span::styled(truncate_name(&site.name, 28), Style::default().fg(Color::White)),
                Span::raw("  "),
                app_port_span(site),
            ]);
            ListItem::new(line)
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .title(title(app, visible.len()))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .highlight_style(
            Style::default()
                .bg(Color::Rgb(0x1A, 0x3A, 0x5C))
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    if !visible.is_empty() {
        state.select(Some(app.selected_index));
    }

    f.render_stateful_widget(list, area, &mut state);
}

fn title(app: &App, shown: usize) -> String {
    let editing = app.mode == Mode::Filter;
    if app.filter.is_empty() && !editing {
        return format!(" Sites ({}) ", app.sites.len());
    }
    let cursor = if editing { "_" } else { "" };
    format!(
        " Sites {shown}/{} /{}{cursor} ",
        app.sites.len(),
        app.filter
    )
}

fn app_port_span(site: &SiteRecord) -> Span<'static> {
    if site.app_port == 0 {
        Span::styled(":----", Style::default().fg(Color::Red))
    } else {
        Span::styled(
            format!(":{}", site.app_port),
            Style::default().fg(Color::Green),
        )
    }
}

fn truncate_name(name: &str, max_len: usize) -> String {
    if name.chars().count() <= max_len {
        name.to_string()
    } else {
        let truncated: String = name.chars().take(max_len - 3).collect();
        format!("{truncated}...")
    }
}
