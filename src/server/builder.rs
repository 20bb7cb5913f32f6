//! ServerBuilder for fluent API to build HTTP servers

use super::router::build_router;
use super::state::{AppState, Views};
use crate::accounts::{LoginService, NewAccount};
use crate::config::BoardConfig;
use crate::core::auth::{Role, SessionStore};
use crate::core::captcha::CaptchaStore;
use crate::core::service::{BlobStore, IdentityProvider, RecordService};
use crate::entities::{Candidate, Feedback, JobPosting, ResumeFile, UserProfile};
use crate::storage::{InMemoryBlobStore, InMemoryIdentityProvider, InMemoryRecordService};
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Builder for the board's HTTP server
///
/// Every backend seam defaults to its in-memory implementation; swap any of
/// them for a real backend with the matching `with_*` method.
///
/// # Example
///
/// ```ignore
/// ServerBuilder::new(BoardConfig::from_yaml_file("board.yaml")?)
///     .with_candidate_service(InMemoryRecordService::with_records(seed))
///     .serve()
///     .await?;
/// ```
pub struct ServerBuilder {
    config: BoardConfig,
    identity: Option<Arc<dyn IdentityProvider>>,
    blobs: Option<Arc<dyn BlobStore>>,
    candidates: Option<Arc<dyn RecordService<Candidate>>>,
    feedback: Option<Arc<dyn RecordService<Feedback>>>,
    jobs: Option<Arc<dyn RecordService<JobPosting>>>,
    resumes: Option<Arc<dyn RecordService<ResumeFile>>>,
    profiles: Option<Arc<dyn RecordService<UserProfile>>>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder
    pub fn new(config: BoardConfig) -> Self {
        Self {
            config,
            identity: None,
            blobs: None,
            candidates: None,
            feedback: None,
            jobs: None,
            resumes: None,
            profiles: None,
        }
    }

    pub fn with_identity_provider(mut self, identity: impl IdentityProvider + 'static) -> Self {
        self.identity = Some(Arc::new(identity));
        self
    }

    pub fn with_blob_store(mut self, blobs: impl BlobStore + 'static) -> Self {
        self.blobs = Some(Arc::new(blobs));
        self
    }

    pub fn with_candidate_service(mut self, service: impl RecordService<Candidate> + 'static) -> Self {
        self.candidates = Some(Arc::new(service));
        self
    }

    pub fn with_feedback_service(mut self, service: impl RecordService<Feedback> + 'static) -> Self {
        self.feedback = Some(Arc::new(service));
        self
    }

    pub fn with_job_service(mut self, service: impl RecordService<JobPosting> + 'static) -> Self {
        self.jobs = Some(Arc::new(service));
        self
    }

    pub fn with_resume_service(mut self, service: impl RecordService<ResumeFile> + 'static) -> Self {
        self.resumes = Some(Arc::new(service));
        self
    }

    pub fn with_profile_service(mut self, service: impl RecordService<UserProfile> + 'static) -> Self {
        self.profiles = Some(Arc::new(service));
        self
    }

    /// Validate the configuration, wire the services and seed admin accounts
    pub async fn build_state(self) -> Result<AppState> {
        self.config.validate()?;
        let views = Views::from_config(&self.config)?;

        let identity = self
            .identity
            .unwrap_or_else(|| Arc::new(InMemoryIdentityProvider::new()));
        let accounts = LoginService::new(
            identity,
            SessionStore::new(self.config.accounts.session_ttl_seconds),
            CaptchaStore::new(self.config.captcha.ttl_seconds),
        );

        for admin in &self.config.accounts.admins {
            accounts
                .seed_admin(NewAccount {
                    email: admin.email.clone(),
                    password: admin.password.clone(),
                    first_name: admin.first_name.clone(),
                    last_name: admin.last_name.clone(),
                    role: Role::Admin,
                })
                .await?;
        }

        Ok(AppState {
            config: Arc::new(self.config),
            views: Arc::new(views),
            accounts,
            candidates: self
                .candidates
                .unwrap_or_else(|| Arc::new(InMemoryRecordService::<Candidate>::new())),
            feedback: self
                .feedback
                .unwrap_or_else(|| Arc::new(InMemoryRecordService::<Feedback>::new())),
            jobs: self
                .jobs
                .unwrap_or_else(|| Arc::new(InMemoryRecordService::<JobPosting>::new())),
            resumes: self
                .resumes
                .unwrap_or_else(|| Arc::new(InMemoryRecordService::<ResumeFile>::new())),
            profiles: self
                .profiles
                .unwrap_or_else(|| Arc::new(InMemoryRecordService::<UserProfile>::new())),
            blobs: self
                .blobs
                .unwrap_or_else(|| Arc::new(InMemoryBlobStore::new())),
        })
    }

    /// Build the final router
    pub async fn build(self) -> Result<Router> {
        Ok(build_router(self.build_state().await?))
    }

    /// Serve the application with graceful shutdown
    ///
    /// This will:
    /// - Bind to the configured `server.bind` address
    /// - Start serving requests
    /// - Handle SIGTERM and SIGINT (Ctrl+C) for graceful shutdown
    pub async fn serve(self) -> Result<()> {
        let addr = self.config.bind_addr()?;
        let app = self.build().await?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new(BoardConfig::default())
    }
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
