use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex as StdMutex;

use tokio::sync::Mutex;

use crate::error::{ManagerError, Result};
use crate::models::{ManagerConfig, ProvisionRequest, ProvisionResponse, SiteRecord, SiteSecrets};
use crate::services::compose::ContainerRuntime;
use crate::services::ports::{self, PortAllocator};
use crate::services::{inventory, naming, provisioner};

/// Creates and deletes sites under one sites directory.
///
/// Port allocation is derived from a fresh inventory scan on every creation,
/// so scan, allocate and write run under a single lock. Operations on the
/// same site are refused while another one is running on it.
pub struct SiteManager<R> {
    config: ManagerConfig,
    allocator: PortAllocator,
    runtime: R,
    provision_lock: Mutex<()>,
    in_flight: StdMutex<HashSet<String>>,
}

/// Marks a site as busy until dropped.
struct InFlight<'a> {
    sites: &'a StdMutex<HashSet<String>>,
    name: String,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut sites = self.sites.lock().unwrap_or_else(|p| p.into_inner());
        sites.remove(&self.name);
    }
}

impl<R: ContainerRuntime> SiteManager<R> {
    pub fn new(config: ManagerConfig, runtime: R) -> Self {
        let allocator = PortAllocator::new(config.base_ports);
        Self {
            config,
            allocator,
            runtime,
            provision_lock: Mutex::new(()),
            in_flight: StdMutex::new(HashSet::new()),
        }
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn root(&self) -> &Path {
        &self.config.sites_directory
    }

    pub fn site_path(&self, name: &str) -> PathBuf {
        self.config.sites_directory.join(name)
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    /// Every site currently on disk, sorted by name.
    pub async fn list_sites(&self) -> Result<Vec<SiteRecord>> {
        let sites = inventory::scan(&self.config).await?;
        ports::audit_lockstep(&self.allocator, &sites);
        Ok(sites)
    }

    /// Provision a site from the template and start its containers.
    ///
    /// If the containers fail to start, the site directory stays on disk and
    /// the error says so; nothing is rolled back.
    pub async fn create_site(&self, request: &ProvisionRequest) -> Result<ProvisionResponse> {
        let (name, secrets) = self.validate_request(request)?;
        let _busy = self.claim(&name)?;

        let block = {
            let _guard = self.provision_lock.lock().await;
            if tokio::fs::try_exists(self.site_path(&name)).await? {
                return Err(ManagerError::SiteAlreadyExists(name));
            }
            let sites = inventory::scan(&self.config).await?;
            ports::audit_lockstep(&self.allocator, &sites);
            let block = self.allocator.next_block(&sites)?;
            tracing::info!(
                site = %name,
                app_port = block.app,
                db_port = block.database,
                pma_port = block.admin,
                sftp_port = block.file_transfer,
                "allocated port block"
            );
            provisioner::provision(&self.config, &name, &secrets, block).await?;
            block
        };

        let site_dir = self.site_path(&name);
        let output = self.runtime.up(&site_dir).await?;
        if !output.success() {
            tracing::warn!(site = %name, stderr = %output.stderr.trim(), "container start failed");
            return Err(ManagerError::StartFailed {
                name,
                detail: output.diagnostic(),
            });
        }

        tracing::info!(site = %name, "site created");
        Ok(ProvisionResponse::new(name, secrets, block))
    }

    /// Stop a site's containers, remove their volumes, then delete its
    /// directory. The directory is only touched once the stop succeeded.
    pub async fn delete_site(&self, raw_name: &str) -> Result<()> {
        let name = naming::sanitize(raw_name);
        if name.is_empty() {
            return Err(ManagerError::InvalidRequest(
                "site name is required".into(),
            ));
        }
        if naming::is_reserved(&name, &self.config) {
            return Err(ManagerError::ProtectedSite(name));
        }
        let _busy = self.claim(&name)?;

        let site_dir = self.site_path(&name);
        let is_dir = tokio::fs::metadata(&site_dir)
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false);
        if !is_dir {
            return Err(ManagerError::SiteNotFound(name));
        }

        tracing::info!(site = %name, "stopping site");
        let output = self.runtime.down(&site_dir).await?;
        if !output.success() {
            tracing::warn!(site = %name, stderr = %output.stderr.trim(), "container stop failed");
            return Err(ManagerError::StopFailed {
                name,
                detail: output.diagnostic(),
            });
        }

        tokio::fs::remove_dir_all(&site_dir).await.map_err(|e| {
            ManagerError::Cleanup(format!("removing {}: {e}", site_dir.display()))
        })?;
        tracing::info!(site = %name, path = %site_dir.display(), "site deleted");
        Ok(())
    }

    /// Check a creation request before anything touches the disk, returning
    /// the sanitized name and the credentials with defaults applied.
    fn validate_request(&self, request: &ProvisionRequest) -> Result<(String, SiteSecrets)> {
        let required = [
            ("name", Some(&request.name)),
            ("databasePassword", request.database_password.as_ref()),
            ("databaseRootPassword", request.database_root_password.as_ref()),
            ("transferUser", request.transfer_user.as_ref()),
            ("transferPassword", request.transfer_password.as_ref()),
        ];
        let missing: Vec<&'static str> = required
            .into_iter()
            .filter(|(_, value)| value.map_or(true, |v| v.trim().is_empty()))
            .map(|(field, _)| field)
            .collect();
        if !missing.is_empty() {
            return Err(ManagerError::MissingFields(missing));
        }

        let name = naming::sanitize(&request.name);
        if name.is_empty() {
            return Err(ManagerError::InvalidRequest(format!(
                "site name '{}' has no characters from [a-z0-9.-]",
                request.name
            )));
        }
        if naming::is_reserved(&name, &self.config) {
            return Err(ManagerError::ProtectedSite(name));
        }

        let or_default = |value: &Option<String>, default: &str| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .unwrap_or(default)
                .to_string()
        };
        let secrets = SiteSecrets {
            database_name: or_default(&request.database_name, &self.config.defaults.database_name),
            database_user: or_default(&request.database_user, &self.config.defaults.database_user),
            database_password: request.database_password.clone().unwrap_or_default(),
            database_root_password: request.database_root_password.clone().unwrap_or_default(),
            transfer_user: request.transfer_user.clone().unwrap_or_default(),
            transfer_password: request.transfer_password.clone().unwrap_or_default(),
        };

        for (field, value) in [
            ("databaseName", &secrets.database_name),
            ("databaseUser", &secrets.database_user),
            ("databasePassword", &secrets.database_password),
            ("databaseRootPassword", &secrets.database_root_password),
            ("transferUser", &secrets.transfer_user),
            ("transferPassword", &secrets.transfer_password),
        ] {
            if value.contains(['\n', '\r']) {
                return Err(ManagerError::InvalidRequest(format!(
                    "{field} must be a single line"
                )));
            }
        }

        Ok((name, secrets))
    }

    fn claim(&self, name: &str) -> Result<InFlight<'_>> {
        let mut sites = self.in_flight.lock().unwrap_or_else(|p| p.into_inner());
        if !sites.insert(name.to_string()) {
            return Err(ManagerError::SiteBusy(name.to_string()));
        }
        Ok(InFlight {
            sites: &self.in_flight,
            name: name.to_string(),
        })
    }
}
