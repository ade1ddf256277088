use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::site::PortBlock;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagerConfig {
    #[serde(default = "default_sites_directory")]
    pub sites_directory: PathBuf,
    #[serde(default = "default_template")]
    pub template: String,
    /// Extra directory names under the root that are never treated as sites.
    #[serde(default = "default_reserved")]
    pub reserved: Vec<String>,
    #[serde(default = "default_env_file")]
    pub env_file: String,
    #[serde(default = "default_env_example")]
    pub env_example: String,
    #[serde(default)]
    pub base_ports: BasePorts,
    #[serde(default)]
    pub runtime: RuntimeConfig,
    #[serde(default)]
    pub defaults: CredentialDefaults,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            sites_directory: default_sites_directory(),
            template: default_template(),
            reserved: default_reserved(),
            env_file: default_env_file(),
            env_example: default_env_example(),
            base_ports: BasePorts::default(),
            runtime: RuntimeConfig::default(),
            defaults: CredentialDefaults::default(),
        }
    }
}

impl ManagerConfig {
    /// Config rooted at `sites_directory`, everything else at defaults.
    pub fn with_root(sites_directory: impl Into<PathBuf>) -> Self {
        Self {
            sites_directory: sites_directory.into(),
            ..Self::default()
        }
    }

    pub fn template_path(&self) -> PathBuf {
        self.sites_directory.join(&self.template)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BasePorts {
    pub app: u16,
    pub database: u16,
    pub admin: u16,
    pub file_transfer: u16,
}

impl Default for BasePorts {
    fn default() -> Self {
        Self {
            app: 8001,
            database: 3301,
            admin: 8801,
            file_transfer: 2201,
        }
    }
}

impl BasePorts {
    pub fn as_block(&self) -> PortBlock {
        PortBlock {
            app: self.app,
            database: self.database,
            admin: self.admin,
            file_transfer: self.file_transfer,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default = "default_program")]
    pub program: String,
    #[serde(default = "default_up_args")]
    pub up_args: Vec<String>,
    #[serde(default = "default_down_args")]
    pub down_args: Vec<String>,
    #[serde(default = "default_up_timeout")]
    pub up_timeout_secs: u64,
    #[serde(default = "default_down_timeout")]
    pub down_timeout_secs: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            up_args: default_up_args(),
            down_args: default_down_args(),
            up_timeout_secs: default_up_timeout(),
            down_timeout_secs: default_down_timeout(),
        }
    }
}

impl RuntimeConfig {
    pub fn up_timeout(&self) -> Duration {
        Duration::from_secs(self.up_timeout_secs)
    }

    pub fn down_timeout(&self) -> Duration {
        Duration::from_secs(self.down_timeout_secs)
    }
}

/// Values used when a creation request leaves the optional fields out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialDefaults {
    #[serde(default = "default_database_name")]
    pub database_name: String,
    #[serde(default = "default_database_user")]
    pub database_user: String,
}

impl Default for CredentialDefaults {
    fn default() -> Self {
        Self {
            database_name: default_database_name(),
            database_user: default_database_user(),
        }
    }
}

fn default_sites_directory() -> PathBuf {
    PathBuf::from("/app/sites")
}

fn default_template() -> String {
    "template".into()
}

fn default_reserved() -> Vec<String> {
    vec!["lost+found".into()]
}

fn default_env_file() -> String {
    ".env".into()
}

fn default_env_example() -> String {
    ".env.example".into()
}

fn default_program() -> String {
    "docker".into()
}

fn default_up_args() -> Vec<String> {
    ["compose", "up", "-d", "--build"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_down_args() -> Vec<String> {
    ["compose", "down", "-v"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_up_timeout() -> u64 {
    600
}

fn default_down_timeout() -> u64 {
    300
}

fn default_database_name() -> String {
    "wordpress".into()
}

fn default_database_user() -> String {
    "user".into()
}
