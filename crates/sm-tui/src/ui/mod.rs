pub mod detail_panel;
pub mod dialog_confirm;
pub mod dialog_create;
pub mod dialog_credentials;
pub mod dialog_help;
pub mod layout;
pub mod site_table;
pub mod status_bar;

use ratatui::Frame;

use crate::app::{App, Mode};

/// Top-level render dispatch.
pub fn render(f: &mut Frame, app: &App) {
    let chunks = layout::main_layout(f.area());

    layout::render_title(f, chunks[0], app);

    let content_chunks = layout::content_layout(chunks[1]);
    site_table::render(f, content_chunks[0], app);
    detail_panel::render(f, content_chunks[1], app);

    status_bar::render(f, chunks[2], app);

    // Overlay dialogs
    match &app.mode {
        Mode::CreateSiteDialog => dialog_create::render(f, app),
        Mode::ConfirmDialog { message, .. } => dialog_confirm::render(f, message),
        Mode::HelpDialog => dialog_help::render(f),
        Mode::Loading(msg) => dialog_confirm::render_loading(f, msg),
        Mode::Credentials(response) => dialog_credentials::render(f, response),
        Mode::SiteList | Mode::Filter => {}
    }
}
