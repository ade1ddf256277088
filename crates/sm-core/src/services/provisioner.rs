use std::path::{Path, PathBuf};

use crate::error::{ManagerError, Result};
use crate::models::{ManagerConfig, PortBlock, SiteSecrets};
use crate::services::env_file::{self, EnvDocument};
use crate::services::naming;

/// Keys owned by the allocator and the request, never taken from the template.
const ALLOCATED_KEYS: [&str; 6] = [
    env_file::APP_PORT,
    env_file::DB_PORT,
    env_file::PMA_PORT,
    env_file::SFTP_PORT,
    env_file::SFTP_USER,
    env_file::SFTP_PASSWORD,
];

/// Materialize a new site directory from the template and write its
/// environment file.
///
/// The copy is assembled in a staging directory and renamed into place only
/// once complete, so a failure part way leaves no site behind. `name` must
/// already be sanitized.
pub async fn provision(
    config: &ManagerConfig,
    name: &str,
    secrets: &SiteSecrets,
    block: PortBlock,
) -> Result<EnvDocument> {
    let root = &config.sites_directory;
    let target = root.join(name);
    if path_exists(&target).await {
        return Err(ManagerError::SiteAlreadyExists(name.to_string()));
    }

    let template = config.template_path();
    if !is_directory(&template).await {
        return Err(ManagerError::TemplateCopy(format!(
            "template directory {} does not exist",
            template.display()
        )));
    }

    let staging = root.join(naming::staging_name(name));
    if path_exists(&staging).await {
        tracing::warn!(path = %staging.display(), "removing leftover staging directory");
        remove_staging(&staging).await;
    }

    let document = match materialize(config, &template, &staging, secrets, block).await {
        Ok(document) => document,
        Err(e) => {
            remove_staging(&staging).await;
            return Err(e);
        }
    };

    if path_exists(&target).await {
        remove_staging(&staging).await;
        return Err(ManagerError::SiteAlreadyExists(name.to_string()));
    }
    if let Err(e) = tokio::fs::rename(&staging, &target).await {
        remove_staging(&staging).await;
        return Err(ManagerError::TemplateCopy(format!(
            "moving {} into place: {e}",
            staging.display()
        )));
    }

    tracing::info!(site = %name, path = %target.display(), "site directory provisioned");
    Ok(document)
}

async fn path_exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

async fn is_directory(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_dir())
        .unwrap_or(false)
}

async fn materialize(
    config: &ManagerConfig,
    template: &Path,
    staging: &Path,
    secrets: &SiteSecrets,
    block: PortBlock,
) -> Result<EnvDocument> {
    copy_tree(template.to_path_buf(), staging.to_path_buf())
        .await
        .map_err(|e| ManagerError::TemplateCopy(format!("copying {}: {e}", template.display())))?;

    let example_path = staging.join(&config.env_example);
    let example = tokio::fs::read_to_string(&example_path).await.map_err(|e| {
        ManagerError::TemplateCopy(format!("reading {}: {e}", example_path.display()))
    })?;

    let document = render_environment(&example, secrets, block);
    tokio::fs::write(staging.join(&config.env_file), document.render()).await?;
    Ok(document)
}

/// Build a site's environment file from the template's example file.
///
/// The four database credentials replace their template entries in place;
/// ports and transfer credentials are stripped wherever they appear and
/// appended as one block at the end.
pub fn render_environment(example: &str, secrets: &SiteSecrets, block: PortBlock) -> EnvDocument {
    let mut document = EnvDocument::parse(example);
    document.set(env_file::DB_ROOT_PASSWORD, &secrets.database_root_password);
    document.set(env_file::DB_NAME, &secrets.database_name);
    document.set(env_file::DB_USER, &secrets.database_user);
    document.set(env_file::DB_PASSWORD, &secrets.database_password);

    for key in ALLOCATED_KEYS {
        document.remove(key);
    }
    document.append_block([
        (env_file::APP_PORT, block.app.to_string()),
        (env_file::DB_PORT, block.database.to_string()),
        (env_file::PMA_PORT, block.admin.to_string()),
        (env_file::SFTP_PORT, block.file_transfer.to_string()),
        (env_file::SFTP_USER, secrets.transfer_user.clone()),
        (env_file::SFTP_PASSWORD, secrets.transfer_password.clone()),
    ]);
    document
}

/// Recursively copy `source` to `destination`, which must not exist yet.
async fn copy_tree(source: PathBuf, destination: PathBuf) -> std::io::Result<()> {
    tokio::task::spawn_blocking(move || copy_tree_blocking(&source, &destination))
        .await
        .map_err(std::io::Error::other)?
}

fn copy_tree_blocking(source: &Path, destination: &Path) -> std::io::Result<()> {
    std::fs::create_dir(destination)?;
    for entry in std::fs::read_dir(source)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let target = destination.join(entry.file_name());
        if file_type.is_dir() {
            copy_tree_blocking(&entry.path(), &target)?;
        } else if file_type.is_symlink() {
            copy_symlink(&entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn copy_symlink(link: &Path, target: &Path) -> std::io::Result<()> {
    let points_to = std::fs::read_link(link)?;
    std::os::unix::fs::symlink(points_to, target)
}

#[cfg(not(unix))]
fn copy_symlink(link: &Path, target: &Path) -> std::io::Result<()> {
    std::fs::copy(link, target).map(|_| ())
}

async fn remove_staging(staging: &Path) {
    if let Err(e) = tokio::fs::remove_dir_all(staging).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(path = %staging.display(), error = %e, "could not remove staging directory");
        }
    }
}
