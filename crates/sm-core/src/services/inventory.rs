use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{ManagerError, Result};
use crate::models::{ManagerConfig, SiteRecord};
use crate::services::env_file;
use crate::services::naming;

/// List every site under the configured root.
///
/// Directories without an environment file are skipped, as are reserved
/// names. A site whose file cannot be read is logged and left out; only a
/// root that cannot be listed fails the scan.
pub async fn scan(config: &ManagerConfig) -> Result<Vec<SiteRecord>> {
    let root = &config.sites_directory;
    let mut entries = tokio::fs::read_dir(root)
        .await
        .map_err(|e| ManagerError::InventoryUnavailable(format!("{}: {e}", root.display())))?;

    let mut sites = Vec::new();
    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                return Err(ManagerError::InventoryUnavailable(format!(
                    "{}: {e}",
                    root.display()
                )))
            }
        };

        let name = entry.file_name().to_string_lossy().to_string();
        if naming::is_reserved(&name, config) {
            continue;
        }
        match entry.file_type().await {
            Ok(file_type) if file_type.is_dir() => {}
            _ => continue,
        }

        let env_path = entry.path().join(&config.env_file);
        if !tokio::fs::try_exists(&env_path).await.unwrap_or(false) {
            continue;
        }
        match read_record(&name, &entry.path(), &env_path).await {
            Ok(record) => sites.push(record),
            Err(e) => {
                tracing::warn!(site = %name, error = %e, "skipping unreadable site");
            }
        }
    }

    sites.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(sites)
}

static LEADING_PORT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\+?(\d+)").unwrap());

/// Leading integer of a port value, so `8001 # main site` still reads as
/// 8001. Anything without one, or out of range, reads as 0.
fn coerce_port(value: &str) -> u16 {
    LEADING_PORT_RE
        .captures(value)
        .and_then(|caps| caps[1].parse::<u16>().ok())
        .unwrap_or(0)
}

async fn read_record(name: &str, site_dir: &Path, env_path: &Path) -> Result<SiteRecord> {
    // Site files are hand-edited; a stray non-UTF-8 byte must not hide the
    // site's ports from allocation.
    let bytes = tokio::fs::read(env_path).await?;
    let content = String::from_utf8_lossy(&bytes);
    let values = env_file::parse(&content);
    let port = |key: &str| values.get(key).map_or(0, |v| coerce_port(v));
    Ok(SiteRecord {
        name: name.to_string(),
        app_port: port(env_file::APP_PORT),
        database_port: port(env_file::DB_PORT),
        admin_port: port(env_file::PMA_PORT),
        file_transfer_port: port(env_file::SFTP_PORT),
        path: site_dir.to_path_buf(),
    })
}

/// Application ports currently claimed. A port of 0 means "unset" and
/// claims nothing.
pub fn used_app_ports(sites: &[SiteRecord]) -> HashSet<u16> {
    sites
        .iter()
        .map(|s| s.app_port)
        .filter(|&p| p != 0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_site(root: &Path, name: &str, env: &str) {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(".env"), env).unwrap();
    }

    #[tokio::test]
    async fn scan_reads_ports_from_env_files() {
        let dir = tempfile::tempdir().unwrap();
        write_site(
            dir.path(),
            "beta.example.com",
            "APP_PORT=8002\nDB_PORT=3302\nPMA_PORT=8802\nSFTP_PORT=2202\n",
        );
        write_site(
            dir.path(),
            "alpha.example.com",
            "APP_PORT=8001\nDB_PORT=3301\nPMA_PORT=8801\nSFTP_PORT=2201\n",
        );

        let config = ManagerConfig::with_root(dir.path());
        let sites = scan(&config).await.unwrap();
        assert_eq!(sites.len(), 2);
        assert_eq!(sites[0].name, "alpha.example.com");
        assert_eq!(sites[0].app_port, 8001);
        assert_eq!(sites[0].file_transfer_port, 2201);
        assert_eq!(sites[1].database_port, 3302);
        assert_eq!(sites[1].admin_port, 8802);
        assert_eq!(sites[1].path, dir.path().join("beta.example.com"));
    }

    #[tokio::test]
    async fn scan_skips_reserved_and_bare_directories() {
        let dir = tempfile::tempdir().unwrap();
        write_site(dir.path(), "template", "APP_PORT=9999\n");
        write_site(dir.path(), "lost+found", "APP_PORT=9998\n");
        write_site(dir.path(), ".blog~staging", "APP_PORT=9997\n");
        fs::create_dir_all(dir.path().join("no-env-yet")).unwrap();
        fs::write(dir.path().join("stray-file"), "APP_PORT=1").unwrap();
        write_site(dir.path(), "real", "APP_PORT=8001\n");

        let config = ManagerConfig::with_root(dir.path());
        let sites = scan(&config).await.unwrap();
        let names: Vec<&str> = sites.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["real"]);
    }

    #[tokio::test]
    async fn scan_defaults_unparsable_ports_to_zero() {
        let dir = tempfile::tempdir().unwrap();
        write_site(dir.path(), "odd", "APP_PORT=abc\nDB_PORT=70000\n# PMA_PORT=1\n");

        let config = ManagerConfig::with_root(dir.path());
        let sites = scan(&config).await.unwrap();
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].ports(), crate::models::PortBlock {
            app: 0,
            database: 0,
            admin: 0,
            file_transfer: 0,
        });
        assert!(used_app_ports(&sites).is_empty());
    }

    #[tokio::test]
    async fn scan_reads_sites_with_non_utf8_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let site = dir.path().join("old");
        fs::create_dir_all(&site).unwrap();
        let mut env = b"# caf\xe9 menu site\n".to_vec();
        env.extend_from_slice(b"APP_PORT=8001\nDB_PORT=3301\nPMA_PORT=8801\nSFTP_PORT=2201\n");
        fs::write(site.join(".env"), env).unwrap();

        let config = ManagerConfig::with_root(dir.path());
        let sites = scan(&config).await.unwrap();
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].app_port, 8001);
        assert_eq!(sites[0].file_transfer_port, 2201);
        assert!(used_app_ports(&sites).contains(&8001));
    }

    #[tokio::test]
    async fn scan_takes_leading_integer_of_port_values() {
        let dir = tempfile::tempdir().unwrap();
        write_site(
            dir.path(),
            "blog",
            "APP_PORT=8001 # main site\nDB_PORT= +3301\nPMA_PORT=8801abc\nSFTP_PORT=-2201\n",
        );

        let config = ManagerConfig::with_root(dir.path());
        let sites = scan(&config).await.unwrap();
        assert_eq!(sites[0].app_port, 8001);
        assert_eq!(sites[0].database_port, 3301);
        assert_eq!(sites[0].admin_port, 8801);
        assert_eq!(sites[0].file_transfer_port, 0);
    }

    #[test]
    fn coerce_port_cases() {
        assert_eq!(coerce_port("8001"), 8001);
        assert_eq!(coerce_port("  42 "), 42);
        assert_eq!(coerce_port("abc"), 0);
        assert_eq!(coerce_port(""), 0);
        assert_eq!(coerce_port("70000"), 0);
    }

    #[tokio::test]
    async fn scan_missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = ManagerConfig::with_root(dir.path().join("missing"));
        let err = scan(&config).await.unwrap_err();
        assert!(matches!(err, ManagerError::InventoryUnavailable(_)));
    }
}
