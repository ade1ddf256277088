pub mod config;
pub mod request;
pub mod site;

pub use config::{BasePorts, CredentialDefaults, ManagerConfig, RuntimeConfig};
pub use request::{ProvisionRequest, ProvisionResponse, SiteSecrets, TransferCredentials};
pub use site::{PortBlock, SiteRecord};
