use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One provisioned site as read back from its environment file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SiteRecord {
    pub name: String,
    #[serde(rename = "appPort")]
    pub app_port: u16,
    #[serde(rename = "dbPort")]
    pub database_port: u16,
    #[serde(rename = "pmaPort")]
    pub admin_port: u16,
    #[serde(rename = "sftpPort")]
    pub file_transfer_port: u16,
    #[serde(skip)]
    pub path: PathBuf,
}

impl SiteRecord {
    pub fn ports(&self) -> PortBlock {
        PortBlock {
            app: self.app_port,
            database: self.database_port,
            admin: self.admin_port,
            file_transfer: self.file_transfer_port,
        }
    }
}

/// The four correlated ports assigned to one site. Always `base + offset`
/// for a single shared offset.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct PortBlock {
    pub app: u16,
    #[serde(rename = "db")]
    pub database: u16,
    #[serde(rename = "pma")]
    pub admin: u16,
    #[serde(rename = "sftp")]
    pub file_transfer: u16,
}

impl PortBlock {
    /// Shift every port in the block by the same offset, `None` on overflow.
    pub fn offset_by(&self, offset: u16) -> Option<PortBlock> {
        Some(PortBlock {
            app: self.app.checked_add(offset)?,
            database: self.database.checked_add(offset)?,
            admin: self.admin.checked_add(offset)?,
            file_transfer: self.file_transfer.checked_add(offset)?,
        })
    }

    pub fn max_port(&self) -> u16 {
        self.app
            .max(self.database)
            .max(self.admin)
            .max(self.file_transfer)
    }
}
