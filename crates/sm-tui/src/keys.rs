use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;

use crate::app::{App, ConfirmAction, Mode};
use crate::event::AppEvent;
use crate::Manager;

/// Handle a key event, dispatching based on current mode.
pub async fn handle_key(
    app: &mut App,
    key: KeyEvent,
    manager: &Arc<Manager>,
    event_tx: &mpsc::UnboundedSender<AppEvent>,
) {
    tracing::debug!(mode = ?mode_name(&app.mode), key = ?key.code, "handle_key");
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }
    match &app.mode {
        Mode::SiteList => handle_site_list(app, key, manager, event_tx),
        Mode::Filter => handle_filter(app, key),
        Mode::CreateSiteDialog => handle_create_dialog(app, key, manager, event_tx),
        Mode::ConfirmDialog { .. } => handle_confirm_dialog(app, key, manager, event_tx),
        Mode::HelpDialog => handle_help_dialog(app, key),
        Mode::Credentials(_) => handle_credentials_dialog(app, key),
        Mode::Loading(_) => {}
    }
}

/// Credentials must never reach the debug log, so modes are logged by name.
fn mode_name(mode: &Mode) -> &'static str {
    match mode {
        Mode::SiteList => "site_list",
        Mode::Filter => "filter",
        Mode::CreateSiteDialog => "create_site",
        Mode::ConfirmDialog { .. } => "confirm",
        Mode::HelpDialog => "help",
        Mode::Loading(_) => "loading",
        Mode::Credentials(_) => "credentials",
    }
}

// ─── Site List Mode ─────────────────────────────────────────────────────

fn handle_site_list(
    app: &mut App,
    key: KeyEvent,
    manager: &Arc<Manager>,
    event_tx: &mpsc::UnboundedSender<AppEvent>,
) {
    match key.code {
        KeyCode::Char('q') => {
            if app.sites.is_empty() {
                app.should_quit = true;
            } else {
                app.mode = Mode::ConfirmDialog {
                    message: "Quit site manager? Running sites keep running.".into(),
                    action: ConfirmAction::Quit,
                };
            }
        }
        KeyCode::Esc => {
            if !app.filter.is_empty() {
                app.filter.clear();
                app.clamp_selection();
            }
        }
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Char('/') => {
            app.mode = Mode::Filter;
        }
        KeyCode::Char('n') => {
            app.create_form.focus = Default::default();
            app.mode = Mode::CreateSiteDialog;
        }
        KeyCode::Char('d') => {
            if let Some(site) = app.selected_site() {
                let name = site.name.clone();
                app.mode = Mode::ConfirmDialog {
                    message: format!(
                        "Delete site '{name}'? Its containers and volumes are removed and the directory is deleted."
                    ),
                    action: ConfirmAction::DeleteSite(name),
                };
            }
        }
        KeyCode::Char('r') => {
            app.set_status("Refreshing...");
            let tx = event_tx.clone();
            let sm = Arc::clone(manager);
            tokio::spawn(async move {
                match sm.list_sites().await {
                    Ok(sites) => {
                        let _ = tx.send(AppEvent::SitesLoaded(sites));
                    }
                    Err(e) => {
                        let _ = tx.send(AppEvent::Error(format!("Refresh failed: {e}")));
                    }
                }
            });
        }
        KeyCode::Char('?') => {
            app.mode = Mode::HelpDialog;
        }
        _ => {}
    }
}

fn handle_filter(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.filter.clear();
            app.mode = Mode::SiteList;
        }
        KeyCode::Enter => {
            app.mode = Mode::SiteList;
        }
        KeyCode::Backspace => {
            app.filter.pop();
        }
        KeyCode::Up => app.select_prev(),
        KeyCode::Down => app.select_next(),
        KeyCode::Char(c) => {
            app.filter.push(c);
            app.selected_index = 0;
        }
        _ => {}
    }
    app.clamp_selection();
}

// ─── Dialog Handlers ────────────────────────────────────────────────────

fn handle_confirm_dialog(
    app: &mut App,
    key: KeyEvent,
    manager: &Arc<Manager>,
    event_tx: &mpsc::UnboundedSender<AppEvent>,
) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('n') => {
            app.mode = Mode::SiteList;
        }
        KeyCode::Char('y') | KeyCode::Enter => {
            let Mode::ConfirmDialog { action, .. } = &app.mode else {
                return;
            };
            match action.clone() {
                ConfirmAction::Quit => {
                    app.should_quit = true;
                }
                ConfirmAction::DeleteSite(name) => {
                    let tx = event_tx.clone();
                    let sm = Arc::clone(manager);
                    app.mode = Mode::Loading(format!("Deleting {name}..."));
                    tokio::spawn(async move {
                        match sm.delete_site(&name).await {
                            Ok(()) => {
                                let _ = tx.send(AppEvent::Info(format!("Deleted site {name}")));
                            }
                            Err(e) => {
                                let _ = tx.send(AppEvent::Error(format!("Delete failed: {e}")));
                            }
                        }
                    });
                }
            }
        }
        _ => {}
    }
}

fn handle_create_dialog(
    app: &mut App,
    key: KeyEvent,
    manager: &Arc<Manager>,
    event_tx: &mpsc::UnboundedSender<AppEvent>,
) {
    match key.code {
        KeyCode::Esc => {
            app.mode = Mode::SiteList;
        }
        KeyCode::Tab | KeyCode::Down => {
            app.create_form.focus = app.create_form.focus.next();
        }
        KeyCode::BackTab | KeyCode::Up => {
            app.create_form.focus = app.create_form.focus.prev();
        }
        KeyCode::Enter => {
            let request = app.create_form.to_request();
            if request.name.is_empty() {
                app.set_status("Site name is required");
                return;
            }

            let tx = event_tx.clone();
            let sm = Arc::clone(manager);
            app.mode = Mode::Loading(format!("Creating site {}...", request.name));

            tokio::spawn(async move {
                match sm.create_site(&request).await {
                    Ok(response) => {
                        let _ = tx.send(AppEvent::SiteCreated(Box::new(response)));
                    }
                    Err(e) => {
                        let _ = tx.send(AppEvent::Error(format!("Create failed: {e}")));
                    }
                }
            });
        }
        KeyCode::Backspace => {
            app.create_form.focused_value_mut().pop();
        }
        KeyCode::Char(c) => {
            app.create_form.focused_value_mut().push(c);
        }
        _ => {}
    }
}

fn handle_credentials_dialog(app: &mut App, key: KeyEvent) {
    if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')) {
        app.mode = Mode::SiteList;
    }
}

fn handle_help_dialog(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => {
            app.mode = Mode::SiteList;
        }
        _ => {}
    }
}
