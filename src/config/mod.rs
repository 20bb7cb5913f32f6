//! Configuration loading and management
//!
//! Every section is optional; a missing file section falls back to the
//! defaults below, so an empty document is a valid configuration.
//!
//! ```yaml
//! server:
//!   bind: "0.0.0.0:8080"
//! views:
//!   candidates:
//!     page_size: 3
//!     sort: "name:asc"
//!     policy: admin_only
//! accounts:
//!   admins:
//!     - email: admin@example.com
//!       password: change-me
//! ```

use crate::core::auth::AuthPolicy;
use crate::core::entity::Entity;
use crate::core::error::ConfigError;
use crate::core::query::{Controls, SortSpec};
use crate::core::view::ListView;
use crate::entities::resume::MAX_UPLOAD_BYTES;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

/// Complete configuration for a board instance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub server: ServerConfig,
    pub profile: ProfileConfig,
    pub views: ViewsConfig,
    pub captcha: CaptchaConfig,
    pub uploads: UploadConfig,
    pub accounts: AccountsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the HTTP server listens on
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
        }
    }
}

/// What the admin dashboard shows for the signed-in administrator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    pub display_name: String,
    pub image: String,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            display_name: "Admin".to_string(),
            image: "/images/admin.jpg".to_string(),
        }
    }
}

/// Defaults and access policy for one list view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub page_size: usize,

    /// Initial sort, `field`, `field:asc` or `field:desc`
    pub sort: Option<String>,

    /// `public`, `authenticated` or `admin_only`
    pub policy: String,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            page_size: crate::core::query::DEFAULT_PAGE_SIZE,
            sort: None,
            policy: "admin_only".to_string(),
        }
    }
}

impl ViewConfig {
    fn new(page_size: usize, sort: Option<&str>, policy: &str) -> Self {
        Self {
            page_size,
            sort: sort.map(str::to_string),
            policy: policy.to_string(),
        }
    }

    pub fn policy(&self) -> AuthPolicy {
        AuthPolicy::parse_policy(&self.policy)
    }

    /// Controls a freshly mounted view starts with
    pub fn controls(&self) -> Result<Controls, ConfigError> {
        let mut controls = Controls::with_page_size(self.page_size);
        if let Some(sort) = &self.sort {
            let spec = sort.parse::<SortSpec>().map_err(|e| {
                ConfigError::InvalidValue {
                    field: "sort".to_string(),
                    value: sort.clone(),
                    message: e.to_string(),
                }
            })?;
            controls.sort_by(spec.field, spec.direction);
        }
        Ok(controls)
    }

    /// Field selection of `T` with this view's defaults
    pub fn list_view<T: Entity>(&self) -> Result<ListView, ConfigError> {
        Ok(ListView::for_entity::<T>().with_defaults(self.controls()?))
    }

    fn validate(&self, name: &str) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: format!("views.{}.page_size", name),
                value: "0".to_string(),
                message: "page size must be a positive integer".to_string(),
            });
        }
        self.controls().map_err(|e| match e {
            ConfigError::InvalidValue { value, message, .. } => ConfigError::InvalidValue {
                field: format!("views.{}.sort", name),
                value,
                message,
            },
            other => other,
        })?;
        Ok(())
    }
}

/// Per-view settings
///
/// A view section only needs the keys it changes; the rest come from that
/// view's own defaults, so `jobs: { page_size: 10 }` keeps the job board
/// public and sorted newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "PartialViewsConfig")]
pub struct ViewsConfig {
    pub candidates: ViewConfig,
    pub feedback: ViewConfig,
    pub jobs: ViewConfig,
    pub resumes: ViewConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PartialViewsConfig {
    candidates: PartialViewConfig,
    feedback: PartialViewConfig,
    jobs: PartialViewConfig,
    resumes: PartialViewConfig,
}

/// A view section as written in the file
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PartialViewConfig {
    page_size: Option<usize>,
    /// Missing keeps the default sort, `null` clears it
    #[serde(deserialize_with = "deserialize_explicit_sort")]
    sort: Option<Option<String>>,
    policy: Option<String>,
}

fn deserialize_explicit_sort<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl PartialViewConfig {
    fn over(self, defaults: ViewConfig) -> ViewConfig {
        ViewConfig {
            page_size: self.page_size.unwrap_or(defaults.page_size),
            sort: self.sort.unwrap_or(defaults.sort),
            policy: self.policy.unwrap_or(defaults.policy),
        }
    }
}

impl From<PartialViewsConfig> for ViewsConfig {
    fn from(partial: PartialViewsConfig) -> Self {
        let defaults = ViewsConfig::default();
        Self {
            candidates: partial.candidates.over(defaults.candidates),
            feedback: partial.feedback.over(defaults.feedback),
            jobs: partial.jobs.over(defaults.jobs),
            resumes: partial.resumes.over(defaults.resumes),
        }
    }
}

impl Default for ViewsConfig {
    fn default() -> Self {
        Self {
            candidates: ViewConfig::new(3, Some("name:asc"), "admin_only"),
            feedback: ViewConfig::new(3, None, "admin_only"),
            jobs: ViewConfig::new(6, Some("created_at:desc"), "public"),
            resumes: ViewConfig::new(5, Some("uploaded_at:desc"), "admin_only"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptchaConfig {
    pub ttl_seconds: u64,
}

impl Default for CaptchaConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: crate::core::captcha::DEFAULT_TTL_SECONDS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub max_bytes: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: MAX_UPLOAD_BYTES,
        }
    }
}

/// An administrator registered at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminAccount {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountsConfig {
    pub admins: Vec<AdminAccount>,
    /// Lifetime of a login session
    pub session_ttl_seconds: u64,
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self {
            admins: Vec::new(),
            session_ttl_seconds: crate::core::auth::DEFAULT_SESSION_TTL_SECONDS,
        }
    }
}

impl BoardConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            file: Some(path.display().to_string()),
            message: e.to_string(),
        })
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError {
            file: None,
            message: e.to_string(),
        })
    }

    /// Check the values serde cannot
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bind_addr()?;

        for (name, view) in [
            ("candidates", &self.views.candidates),
            ("feedback", &self.views.feedback),
            ("jobs", &self.views.jobs),
            ("resumes", &self.views.resumes),
        ] {
            view.validate(name)?;
        }

        if self.captcha.ttl_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "captcha.ttl_seconds".to_string(),
                value: "0".to_string(),
                message: "captcha lifetime must be positive".to_string(),
            });
        }
        if self.accounts.session_ttl_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "accounts.session_ttl_seconds".to_string(),
                value: "0".to_string(),
                message: "session lifetime must be positive".to_string(),
            });
        }
        if self.uploads.max_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "uploads.max_bytes".to_string(),
                value: "0".to_string(),
                message: "upload limit must be positive".to_string(),
            });
        }
        for admin in &self.accounts.admins {
            if !admin.email.contains('@') {
                return Err(ConfigError::InvalidValue {
                    field: "accounts.admins.email".to_string(),
                    value: admin.email.clone(),
                    message: "not an email address".to_string(),
                });
            }
            if admin.password.len() < 6 {
                return Err(ConfigError::InvalidValue {
                    field: "accounts.admins.password".to_string(),
                    value: "<redacted>".to_string(),
                    message: format!("password for {} must be at least 6 characters", admin.email),
                });
            }
        }

        Ok(())
    }

    /// Parsed listen address
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server.bind.parse().map_err(|_| ConfigError::InvalidValue {
            field: "server.bind".to_string(),
            value: self.server.bind.clone(),
            message: "expected host:port".to_string(),
        })
    }
}
