pub mod compose;
pub mod config_loader;
pub mod env_file;
pub mod inventory;
pub mod naming;
pub mod ports;
pub mod provisioner;
pub mod site_manager;
