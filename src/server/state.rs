//! Shared application state

use crate::accounts::LoginService;
use crate::config::{BoardConfig, ViewConfig};
use crate::core::error::{BoardResult, ConfigError};
use crate::core::service::{BlobStore, RecordService};
use crate::core::view::ListView;
use crate::core::{AuthContext, AuthPolicy, AuthProvider, Entity};
use crate::entities::{Candidate, Feedback, JobPosting, ResumeFile, UserProfile};
use axum::http::HeaderMap;
use std::sync::Arc;

/// A list view together with who may read it
#[derive(Debug, Clone)]
pub struct ViewSlot {
    pub view: ListView,
    pub policy: AuthPolicy,
}

impl ViewSlot {
    fn from_config<T: Entity>(config: &ViewConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            view: config.list_view::<T>()?,
            policy: config.policy(),
        })
    }
}

/// The four list views of the board
#[derive(Debug, Clone)]
pub struct Views {
    pub candidates: ViewSlot,
    pub feedback: ViewSlot,
    pub jobs: ViewSlot,
    pub resumes: ViewSlot,
}

impl Views {
    pub fn from_config(config: &BoardConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            candidates: ViewSlot::from_config::<Candidate>(&config.views.candidates)?,
            feedback: ViewSlot::from_config::<Feedback>(&config.views.feedback)?,
            jobs: ViewSlot::from_config::<JobPosting>(&config.views.jobs)?,
            resumes: ViewSlot::from_config::<ResumeFile>(&config.views.resumes)?,
        })
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<BoardConfig>,
    pub views: Arc<Views>,
    pub accounts: LoginService,
    pub candidates: Arc<dyn RecordService<Candidate>>,
    pub feedback: Arc<dyn RecordService<Feedback>>,
    pub jobs: Arc<dyn RecordService<JobPosting>>,
    pub resumes: Arc<dyn RecordService<ResumeFile>>,
    pub profiles: Arc<dyn RecordService<UserProfile>>,
    pub blobs: Arc<dyn BlobStore>,
}

impl AppState {
    /// Resolve the caller and check it against `policy`
    pub async fn authorize(&self, headers: &HeaderMap, policy: AuthPolicy) -> BoardResult<AuthContext> {
        let context = self.accounts.sessions().extract_context(headers).await?;
        policy.require(&context)?;
        Ok(context)
    }
}
