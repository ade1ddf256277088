use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ManagerError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("site '{0}' is a protected system directory")]
    ProtectedSite(String),

    #[error("site '{0}' already exists")]
    SiteAlreadyExists(String),

    #[error("site '{0}' has another operation in progress")]
    SiteBusy(String),

    #[error("site '{0}' not found")]
    SiteNotFound(String),

    #[error("no free port block left below 65535")]
    CapacityExhausted,

    #[error("template copy failed: {0}")]
    TemplateCopy(String),

    #[error("container start failed for '{name}': {detail}")]
    StartFailed { name: String, detail: String },

    #[error("container stop failed for '{name}': {detail}")]
    StopFailed { name: String, detail: String },

    #[error("file cleanup failed: {0}")]
    Cleanup(String),

    #[error("container runtime unavailable: {0}")]
    RuntimeUnavailable(String),

    #[error("container runtime unresponsive: {operation} timed out after {seconds}s")]
    RuntimeTimeout { operation: String, seconds: u64 },

    #[error("cannot list sites: {0}")]
    InventoryUnavailable(String),

    #[error("config file not found at {0}")]
    ConfigNotFound(PathBuf),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ManagerError {
    /// Short machine-readable reason code for structured failure reports.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "invalid_request",
            Self::MissingFields(_) => "missing_fields",
            Self::ProtectedSite(_) => "protected_site",
            Self::SiteAlreadyExists(_) => "already_exists",
            Self::SiteBusy(_) => "busy",
            Self::SiteNotFound(_) => "not_found",
            Self::CapacityExhausted => "capacity_exhausted",
            Self::TemplateCopy(_) => "template_copy_failed",
            Self::StartFailed { .. } => "start_failed",
            Self::StopFailed { .. } => "stop_failed",
            Self::Cleanup(_) => "cleanup_failed",
            Self::RuntimeUnavailable(_) => "runtime_unavailable",
            Self::RuntimeTimeout { .. } => "runtime_timeout",
            Self::InventoryUnavailable(_) => "inventory_unavailable",
            Self::ConfigNotFound(_) => "config_not_found",
            Self::InvalidConfig(_) => "invalid_config",
            Self::Io(_) => "io",
        }
    }

    /// Diagnostic text captured from the container runtime, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::StartFailed { detail, .. } | Self::StopFailed { detail, .. } => Some(detail),
            _ => None,
        }
    }

    /// Validation and conflict errors are rejected before anything on disk changes.
    pub fn is_pre_mutation(&self) -> bool {
        matches!(
            self,
            Self::InvalidRequest(_)
                | Self::MissingFields(_)
                | Self::ProtectedSite(_)
                | Self::SiteAlreadyExists(_)
                | Self::SiteBusy(_)
                | Self::SiteNotFound(_)
                | Self::CapacityExhausted
        )
    }
}

pub type Result<T> = std::result::Result<T, ManagerError>;
