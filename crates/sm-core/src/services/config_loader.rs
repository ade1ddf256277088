use std::path::{Path, PathBuf};

use crate::error::{ManagerError, Result};
use crate::models::ManagerConfig;

pub const CONFIG_FILENAME: &str = ".site-manager.yaml";

pub fn load(config_path: &Path) -> Result<ManagerConfig> {
    if !config_path.exists() {
        return Err(ManagerError::ConfigNotFound(config_path.to_path_buf()));
    }
    let contents = std::fs::read_to_string(config_path)?;
    let config: ManagerConfig = serde_yaml::from_str(&contents)
        .map_err(|e| ManagerError::InvalidConfig(e.to_string()))?;
    validate(&config)?;
    Ok(config)
}

/// Load `<root>/.site-manager.yaml` if present, otherwise defaults. The
/// sites directory is always `root`.
pub fn load_or_default(root: &Path) -> Result<ManagerConfig> {
    let mut config = match load(&root.join(CONFIG_FILENAME)) {
        Ok(config) => config,
        Err(ManagerError::ConfigNotFound(_)) => ManagerConfig::default(),
        Err(e) => return Err(e),
    };
    config.sites_directory = root.to_path_buf();
    Ok(config)
}

/// Pick the config for a run: an explicit file wins, then the file in the
/// sites root, then defaults. `root` overrides whatever directory the config
/// names.
pub fn resolve(config_path: Option<&Path>, root: Option<&Path>) -> Result<ManagerConfig> {
    let mut config = match (config_path, root) {
        (Some(path), _) => load(path)?,
        (None, Some(root)) => load_or_default(root)?,
        (None, None) => {
            let default_root = ManagerConfig::default().sites_directory;
            load_or_default(&default_root)?
        }
    };
    if let Some(root) = root {
        config.sites_directory = PathBuf::from(root);
    }
    Ok(config)
}

fn validate(config: &ManagerConfig) -> Result<()> {
    if config.template.trim().is_empty() {
        return Err(ManagerError::InvalidConfig(
            "template name must not be empty".into(),
        ));
    }
    if config.env_file.trim().is_empty() || config.env_example.trim().is_empty() {
        return Err(ManagerError::InvalidConfig(
            "env_file and env_example must not be empty".into(),
        ));
    }
    let bases = &config.base_ports;
    if [bases.app, bases.database, bases.admin, bases.file_transfer].contains(&0) {
        return Err(ManagerError::InvalidConfig(
            "base ports must be non-zero".into(),
        ));
    }
    if config.runtime.program.trim().is_empty() {
        return Err(ManagerError::InvalidConfig(
            "runtime program must not be empty".into(),
        ));
    }
    if config.runtime.up_timeout_secs == 0 || config.runtime.down_timeout_secs == 0 {
        return Err(ManagerError::InvalidConfig(
            "runtime timeouts must be greater than zero".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn parse_full_config() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = r#"
sites_directory: /srv/sites
template: skeleton
reserved:
  - lost+found
  - backups
env_file: .env
env_example: env.sample
base_ports:
  app: 9001
  database: 4301
  admin: 9801
  file_transfer: 3201
runtime:
  program: podman
  up_args: [compose, up, -d]
  down_args: [compose, down, --volumes]
  up_timeout_secs: 120
  down_timeout_secs: 60
defaults:
  database_name: site
  database_user: admin
"#;
        let path = dir.path().join("config.yaml");
        fs::write(&path, yaml).unwrap();
        let config = load(&path).unwrap();
        assert_eq!(config.sites_directory, PathBuf::from("/srv/sites"));
        assert_eq!(config.template, "skeleton");
        assert_eq!(config.reserved, vec!["lost+found", "backups"]);
        assert_eq!(config.env_example, "env.sample");
        assert_eq!(config.base_ports.app, 9001);
        assert_eq!(config.base_ports.file_transfer, 3201);
        assert_eq!(config.runtime.program, "podman");
        assert_eq!(config.runtime.down_args, vec!["compose", "down", "--volumes"]);
        assert_eq!(config.runtime.up_timeout_secs, 120);
        assert_eq!(config.defaults.database_user, "admin");
    }

    #[test]
    fn parse_minimal_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "template: template\n").unwrap();
        let config = load(&path).unwrap();
        assert_eq!(config.sites_directory, PathBuf::from("/app/sites"));
        assert_eq!(config.env_file, ".env");
        assert_eq!(config.base_ports.app, 8001);
        assert_eq!(config.base_ports.database, 3301);
        assert_eq!(config.base_ports.admin, 8801);
        assert_eq!(config.base_ports.file_transfer, 2201);
        assert_eq!(config.runtime.up_args, vec!["compose", "up", "-d", "--build"]);
        assert_eq!(config.defaults.database_name, "wordpress");
        assert_eq!(config.defaults.database_user, "user");
    }

    #[test]
    fn missing_config_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load(&dir.path().join(CONFIG_FILENAME)),
            Err(ManagerError::ConfigNotFound(_))
        ));
    }

    #[test]
    fn rejects_zero_timeouts_and_ports() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "runtime:\n  up_timeout_secs: 0\n").unwrap();
        assert!(matches!(load(&path), Err(ManagerError::InvalidConfig(_))));

        fs::write(
            &path,
            "base_ports: {app: 0, database: 1, admin: 2, file_transfer: 3}\n",
        )
        .unwrap();
        assert!(matches!(load(&path), Err(ManagerError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_malformed_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "base_ports: [not, a, map]\n").unwrap();
        let err = load(&path).unwrap_err();
        assert!(matches!(err, ManagerError::InvalidConfig(_)));
        assert_eq!(err.reason(), "invalid_config");
    }

    #[test]
    fn root_file_is_optional_and_root_wins() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_or_default(dir.path()).unwrap();
        assert_eq!(config.sites_directory, dir.path());
        assert_eq!(config.template, "template");

        fs::write(
            dir.path().join(CONFIG_FILENAME),
            "sites_directory: /elsewhere\ntemplate: base\n",
        )
        .unwrap();
        let config = load_or_default(dir.path()).unwrap();
        assert_eq!(config.sites_directory, dir.path());
        assert_eq!(config.template, "base");
    }

    #[test]
    fn resolve_prefers_explicit_file_but_root_overrides_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.yaml");
        fs::write(&path, "sites_directory: /srv/sites\ntemplate: base\n").unwrap();

        let config = resolve(Some(&path), None).unwrap();
        assert_eq!(config.sites_directory, PathBuf::from("/srv/sites"));

        let root = dir.path().join("root");
        let config = resolve(Some(&path), Some(&root)).unwrap();
        assert_eq!(config.sites_directory, root);
        assert_eq!(config.template, "base");
    }
}
