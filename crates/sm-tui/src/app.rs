use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

use sm_core::models::{ProvisionRequest, ProvisionResponse, SiteRecord};

/// The active mode determines which UI is shown and how keys are dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    SiteList,
    /// Typing into the site-name filter.
    Filter,
    CreateSiteDialog,
    ConfirmDialog {
        message: String,
        action: ConfirmAction,
    },
    HelpDialog,
    Loading(String),
    /// Credentials of a freshly created site. Shown once, never persisted.
    Credentials(Box<ProvisionResponse>),
}

/// What a confirmed dialog action should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteSite(String),
    Quit,
}

// ─── Forms ─────────────────────────────────────────────────────────────

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum CreateSiteField {
    #[default]
    Name,
    DatabaseName,
    DatabaseUser,
    DatabasePassword,
    RootPassword,
    TransferUser,
    TransferPassword,
}

impl CreateSiteField {
    pub const ALL: [CreateSiteField; 7] = [
        CreateSiteField::Name,
        CreateSiteField::DatabaseName,
        CreateSiteField::DatabaseUser,
        CreateSiteField::DatabasePassword,
        CreateSiteField::RootPassword,
        CreateSiteField::TransferUser,
        CreateSiteField::TransferPassword,
    ];

    pub fn label(self) -> &'static str {
        match self {
            CreateSiteField::Name => "Site name",
            CreateSiteField::DatabaseName => "Database name (optional)",
            CreateSiteField::DatabaseUser => "Database user (optional)",
            CreateSiteField::DatabasePassword => "Database password",
            CreateSiteField::RootPassword => "Database root password",
            CreateSiteField::TransferUser => "SFTP user",
            CreateSiteField::TransferPassword => "SFTP password",
        }
    }

    /// Secret fields are masked while typing.
    pub fn is_secret(self) -> bool {
        matches!(
            self,
            CreateSiteField::DatabasePassword
                | CreateSiteField::RootPassword
                | CreateSiteField::TransferPassword
        )
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Form state for the create-site dialog.
#[derive(Debug, Default, Clone)]
pub struct CreateSiteForm {
    pub name: String,
    pub database_name: String,
    pub database_user: String,
    pub database_password: String,
    pub root_password: String,
    pub transfer_user: String,
    pub transfer_password: String,
    pub focus: CreateSiteField,
}

impl CreateSiteForm {
    pub fn value(&self, field: CreateSiteField) -> &str {
        match field {
            CreateSiteField::Name => &self.name,
            CreateSiteField::DatabaseName => &self.database_name,
            CreateSiteField::DatabaseUser => &self.database_user,
            CreateSiteField::DatabasePassword => &self.database_password,
            CreateSiteField::RootPassword => &self.root_password,
            CreateSiteField::TransferUser => &self.transfer_user,
            CreateSiteField::TransferPassword => &self.transfer_password,
        }
    }

    pub fn focused_value_mut(&mut self) -> &mut String {
        match self.focus {
            CreateSiteField::Name => &mut self.name,
            CreateSiteField::DatabaseName => &mut self.database_name,
            CreateSiteField::DatabaseUser => &mut self.database_user,
            CreateSiteField::DatabasePassword => &mut self.database_password,
            CreateSiteField::RootPassword => &mut self.root_password,
            CreateSiteField::TransferUser => &mut self.transfer_user,
            CreateSiteField::TransferPassword => &mut self.transfer_password,
        }
    }

    /// Blank inputs become absent fields so the manager reports them, or
    /// applies its defaults for the optional ones.
    pub fn to_request(&self) -> ProvisionRequest {
        let optional = |value: &str| {
            let trimmed = value.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        };
        ProvisionRequest {
            name: self.name.trim().to_string(),
            database_name: optional(&self.database_name),
            database_user: optional(&self.database_user),
            database_password: optional(&self.database_password),
            database_root_password: optional(&self.root_password),
            transfer_user: optional(&self.transfer_user),
            transfer_password: optional(&self.transfer_password),
        }
    }
}

// ─── Main App State ────────────────────────────────────────────────────

/// Top-level application state.
pub struct App {
    pub mode: Mode,
    pub sites: Vec<SiteRecord>,
    /// Index into [`App::visible_sites`], not into `sites`.
    pub selected_index: usize,
    pub filter: String,
    pub should_quit: bool,
    pub status_message: Option<String>,
    pub create_form: CreateSiteForm,
    /// Sites directory shown in the title bar.
    pub root_label: Option<String>,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        Self {
            mode: Mode::SiteList,
            sites: Vec::new(),
            selected_index: 0,
            filter: String::new(),
            should_quit: false,
            status_message: None,
            create_form: CreateSiteForm::default(),
            root_label: None,
        }
    }

    /// Sites matching the filter, best fuzzy match first. Without a filter
    /// this is the inventory order.
    pub fn visible_sites(&self) -> Vec<&SiteRecord> {
        let query = self.filter.trim();
        if query.is_empty() {
            return self.sites.iter().collect();
        }
        let matcher = SkimMatcherV2::default();
        let mut scored: Vec<(i64, &SiteRecord)> = self
            .sites
            .iter()
            .filter_map(|site| {
                matcher
                    .fuzzy_match(&site.name, query)
                    .map(|score| (score, site))
            })
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.name.cmp(&b.1.name)));
        scored.into_iter().map(|(_, site)| site).collect()
    }

    pub fn selected_site(&self) -> Option<&SiteRecord> {
        self.visible_sites().get(self.selected_index).copied()
    }

    /// Replace the inventory, keeping the selection in range.
    pub fn set_sites(&mut self, sites: Vec<SiteRecord>) {
        self.sites = sites;
        self.clamp_selection();
    }

    pub fn clamp_selection(&mut self) {
        let len = self.visible_sites().len();
        if len == 0 {
            self.selected_index = 0;
        } else if self.selected_index >= len {
            self.selected_index = len - 1;
        }
    }

    pub fn select_next(&mut self) {
        let len = self.visible_sites().len();
        if len > 0 {
            self.selected_index = (self.selected_index + 1) % len;
        }
    }

    pub fn select_prev(&mut self) {
        let len = self.visible_sites().len();
        if len > 0 {
            if self.selected_index == 0 {
                self.selected_index = len - 1;
            } else {
                self.selected_index -= 1;
            }
        }
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
    }
}
