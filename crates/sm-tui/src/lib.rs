pub mod app;
pub mod event;
pub mod keys;
pub mod ui;

use sm_core::services::compose::ComposeRuntime;
use sm_core::services::site_manager::SiteManager;

/// The manager the front end drives: real compose invocations.
pub type Manager = SiteManager<ComposeRuntime>;
