// Each test binary compiles this module independently and uses a different
// subset of helpers, so unused-function warnings are expected.
#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use ratatui::{backend::TestBackend, Terminal};

use sm_core::models::{
    ManagerConfig, PortBlock, ProvisionResponse, RuntimeConfig, SiteRecord, SiteSecrets,
};
use sm_core::services::compose::ComposeRuntime;
use sm_core::services::site_manager::SiteManager;
use sm_tui::app::App;
use sm_tui::{ui, Manager};

/// Render the app to a string using a TestBackend of the given dimensions.
pub fn render_to_string(app: &App, width: u16, height: u16) -> String {
    let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
    terminal.draw(|f| ui::render(f, app)).unwrap();
    terminal.backend().to_string()
}

/// A site whose ports sit `offset` above the default bases.
pub fn make_site(name: &str, offset: u16) -> SiteRecord {
    SiteRecord {
        name: name.to_string(),
        app_port: 8001 + offset,
        database_port: 3301 + offset,
        admin_port: 8801 + offset,
        file_transfer_port: 2201 + offset,
        path: PathBuf::from(format!("/srv/sites/{name}")),
    }
}

/// Creation time is pinned so rendered frames stay stable.
pub fn make_response(name: &str) -> ProvisionResponse {
    let mut response = ProvisionResponse::new(
        name.to_string(),
        SiteSecrets {
            database_name: "wordpress".into(),
            database_user: "user".into(),
            database_password: "db-secret".into(),
            database_root_password: "root-secret".into(),
            transfer_user: "ftp".into(),
            transfer_password: "ftp-secret".into(),
        },
        PortBlock {
            app: 8001,
            database: 3301,
            admin: 8801,
            file_transfer: 2201,
        },
    );
    response.created_at = "2026-01-15T09:30:00Z".parse().unwrap();
    response
}

/// A manager over an empty temporary sites directory. The compose runtime is
/// real but tests never get far enough to invoke it.
pub fn make_manager() -> (tempfile::TempDir, Arc<Manager>) {
    let dir = tempfile::tempdir().unwrap();
    let config = ManagerConfig::with_root(dir.path());
    let runtime = ComposeRuntime::new(&RuntimeConfig::default());
    (dir, Arc::new(SiteManager::new(config, runtime)))
}
