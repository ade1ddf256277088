use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::site::PortBlock;

/// A creation request as handed over by whatever front end drives the manager.
///
/// Every field decodes when absent so that an incomplete request can still
/// be rejected with the exact list of missing fields. A blank name counts
/// as missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_root_password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer_user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer_password: Option<String>,
}

/// Credentials written into a new site's environment file, after defaults
/// have been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteSecrets {
    pub database_name: String,
    pub database_user: String,
    pub database_password: String,
    pub database_root_password: String,
    pub transfer_user: String,
    pub transfer_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransferCredentials {
    pub user: String,
    pub password: String,
}

/// Returned once per successful creation. Nothing here can be fetched again
/// later except by reading the site's environment file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionResponse {
    pub name: String,
    pub database_name: String,
    pub database_user: String,
    pub database_password: String,
    pub ports: PortBlock,
    pub transfer: TransferCredentials,
    pub created_at: DateTime<Utc>,
}

impl ProvisionResponse {
    pub fn new(name: String, secrets: SiteSecrets, ports: PortBlock) -> Self {
        Self {
            name,
            database_name: secrets.database_name,
            database_user: secrets.database_user,
            database_password: secrets.database_password,
            ports,
            transfer: TransferCredentials {
                user: secrets.transfer_user,
                password: secrets.transfer_password,
            },
            created_at: Utc::now(),
        }
    }
}
