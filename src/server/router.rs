//! Route table

use crate::server::handlers::{
    create_job, delete_feedback, delete_job, download_resume, export_resumes, health, issue_captcha,
    list_candidates, list_feedback, list_jobs, list_resumes, login, logout, my_profile, my_resumes,
    profile, register, submit_feedback, update_candidate_status, update_job, update_my_profile,
    upload_resume,
};
use crate::server::state::AppState;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post, put},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the board's router
///
/// - GET /health
/// - POST /api/captcha, /api/register, /api/login, /api/logout
/// - GET /api/profile
/// - GET|POST /api/jobs, PUT|DELETE /api/jobs/{id}
/// - GET /api/candidates, PUT /api/candidates/{id}/status
/// - GET|POST /api/feedback, DELETE /api/feedback/{id}
/// - GET|POST /api/resumes, GET /api/resumes/export, GET /api/resumes/{id}/file
/// - GET /api/me/resumes, GET|PUT /api/me/profile
pub fn build_router(state: AppState) -> Router {
    // the upload handler enforces the real limit
    let upload_limit = usize::try_from(state.config.uploads.max_bytes.saturating_mul(2)).unwrap_or(usize::MAX);

    Router::new()
        .route("/health", get(health))
        .route("/api/captcha", post(issue_captcha))
        .route("/api/register", post(register))
        .route("/api/login", post(login))
        .route("/api/logout", post(logout))
        .route("/api/profile", get(profile))
        .route("/api/jobs", get(list_jobs).post(create_job))
        .route("/api/jobs/{id}", put(update_job).delete(delete_job))
        .route("/api/candidates", get(list_candidates))
        .route("/api/candidates/{id}/status", put(update_candidate_status))
        .route("/api/feedback", get(list_feedback).post(submit_feedback))
        .route("/api/feedback/{id}", axum::routing::delete(delete_feedback))
        .route(
            "/api/resumes",
            get(list_resumes)
                .post(upload_resume)
                .layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/resumes/export", get(export_resumes))
        .route("/api/resumes/{id}/file", get(download_resume))
        .route("/api/me/resumes", get(my_resumes))
        .route("/api/me/profile", get(my_profile).put(update_my_profile))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
