use crate::models::ManagerConfig;

/// Suffix for the provisioner's in-progress copies. `~` never survives
/// [`sanitize`], so a staging directory cannot shadow a real site.
pub const STAGING_SUFFIX: &str = "~staging";

const ALWAYS_RESERVED: [&str; 3] = [".", "..", "lost+found"];

/// Reduce a requested site name to its filesystem-safe form by removing every
/// character outside `[a-z0-9.-]`.
pub fn sanitize(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect()
}

/// Staging directory name used while a site is being materialized.
pub fn staging_name(name: &str) -> String {
    format!(".{name}{STAGING_SUFFIX}")
}

/// Whether a directory name under the sites root must never be listed,
/// created or deleted as a site.
pub fn is_reserved(name: &str, config: &ManagerConfig) -> bool {
    name == config.template
        || ALWAYS_RESERVED.contains(&name)
        || config.reserved.iter().any(|r| r == name)
        || name.ends_with(STAGING_SUFFIX)
}
