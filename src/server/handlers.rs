//! HTTP handlers
//!
//! Handlers stay thin: authorize, load records from the backend seam, run
//! them through the list-view engine and serialize the result.

use crate::accounts::{LoginOutcome, LoginRequest, RegistrationForm, UserAccount};
use crate::core::auth::{AuthPolicy, bearer_token};
use crate::core::captcha::CaptchaChallenge;
use crate::core::error::{AuthError, BoardResult, RecordError, ValidationError};
use crate::core::query::{ViewQuery, ViewResult};
use crate::core::{Entity, Record};
use crate::entities::resume::export_csv;
use crate::entities::{
    Candidate, ContactForm, Feedback, JobForm, JobPosting, ProfileForm, ResumeFile, ResumeUpload,
    StatusUpdate, UserProfile,
};
use crate::server::state::{AppState, ViewSlot};
use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::{Value, json};
use uuid::Uuid;

/// Header carrying the original name of an uploaded file, percent-encoded
/// when it is not plain ASCII
pub const FILE_NAME_HEADER: &str = "x-file-name";

fn file_name_header(headers: &HeaderMap) -> Result<String, ValidationError> {
    let Some(raw) = headers.get(FILE_NAME_HEADER) else {
        return Ok(String::new());
    };
    let invalid = || ValidationError::field("file_name", "File name must be UTF-8; percent-encode non-ASCII names");

    let text = std::str::from_utf8(raw.as_bytes()).map_err(|_| invalid())?;
    urlencoding::decode(text)
        .map(|name| name.into_owned())
        .map_err(|_| invalid())
}

/// `inline` disposition with an ASCII fallback and the RFC 5987 form
fn inline_disposition(file_name: &str) -> String {
    let fallback: String = file_name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c == ' ' || c.is_ascii_graphic() => c,
            _ => '_',
        })
        .collect();
    format!(
        "inline; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(file_name)
    )
}

fn run_view<R>(slot: &ViewSlot, records: Vec<R>, query: ViewQuery) -> BoardResult<Json<ViewResult<R>>>
where
    R: Record + Clone,
{
    let controls = query.into_controls(&slot.view.defaults)?;
    Ok(Json(slot.view.compute(&records, &controls)?))
}

fn not_found<T: Entity>(id: Uuid) -> RecordError {
    RecordError::NotFound {
        record_type: T::resource_name_singular().to_string(),
        id,
    }
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

// === Accounts ===

pub async fn issue_captcha(State(state): State<AppState>) -> BoardResult<Json<CaptchaChallenge>> {
    Ok(Json(state.accounts.captcha().issue()?))
}

pub async fn register(
    State(state): State<AppState>,
    Json(form): Json<RegistrationForm>,
) -> BoardResult<(StatusCode, Json<UserAccount>)> {
    let account = state.accounts.register(form).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> BoardResult<Json<LoginOutcome>> {
    Ok(Json(state.accounts.login(request).await?))
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> BoardResult<StatusCode> {
    state.authorize(&headers, AuthPolicy::Authenticated).await?;
    let token = bearer_token(&headers).ok_or(AuthError::Unauthenticated)?;
    state.accounts.logout(token)?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub display_name: String,
    pub image: String,
    pub email: Option<String>,
}

pub async fn profile(State(state): State<AppState>, headers: HeaderMap) -> BoardResult<Json<ProfileResponse>> {
    let context = state.authorize(&headers, AuthPolicy::AdminOnly).await?;
    let account = state.accounts.account(&context).await?;
    Ok(Json(ProfileResponse {
        display_name: state.config.profile.display_name.clone(),
        image: state.config.profile.image.clone(),
        email: account.map(|a| a.email),
    }))
}

/// The caller's own profile, empty until first saved
pub async fn my_profile(State(state): State<AppState>, headers: HeaderMap) -> BoardResult<Json<UserProfile>> {
    let context = state.authorize(&headers, AuthPolicy::Authenticated).await?;
    let user_id = context.account_id().ok_or(AuthError::Unauthenticated)?;

    let profile = state
        .profiles
        .get(&user_id)
        .await?
        .unwrap_or_else(|| UserProfile::empty(user_id));
    Ok(Json(profile))
}

pub async fn update_my_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(form): Json<ProfileForm>,
) -> BoardResult<Json<UserProfile>> {
    let context = state.authorize(&headers, AuthPolicy::Authenticated).await?;
    let user_id = context.account_id().ok_or(AuthError::Unauthenticated)?;

    let profile = form.into_profile(user_id, Utc::now())?;
    let profile = match state.profiles.get(&user_id).await? {
        Some(_) => state.profiles.update(&user_id, profile).await?,
        None => state.profiles.create(profile).await?,
    };
    tracing::info!(user_id = %user_id, "profile updated");
    Ok(Json(profile))
}

// === Jobs ===

/// Open postings for everyone; admins also see closed ones
pub async fn list_jobs(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ViewQuery>,
) -> BoardResult<Json<ViewResult<JobPosting>>> {
    let slot = &state.views.jobs;
    let context = state.authorize(&headers, slot.policy).await?;

    let now = Utc::now();
    let jobs: Vec<JobPosting> = state
        .jobs
        .list()
        .await?
        .into_iter()
        .filter(|job| context.is_admin() || job.is_open(now))
        .collect();

    run_view(slot, jobs, query)
}

pub async fn create_job(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(form): Json<JobForm>,
) -> BoardResult<(StatusCode, Json<JobPosting>)> {
    state.authorize(&headers, AuthPolicy::AdminOnly).await?;
    let job = state.jobs.create(form.into_posting()?).await?;
    tracing::info!(job_id = %job.id, title = %job.title, "job posted");
    Ok((StatusCode::CREATED, Json(job)))
}

pub async fn update_job(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(form): Json<JobForm>,
) -> BoardResult<Json<JobPosting>> {
    state.authorize(&headers, AuthPolicy::AdminOnly).await?;
    let mut job = state
        .jobs
        .get(&id)
        .await?
        .ok_or_else(|| not_found::<JobPosting>(id))?;
    job.apply(form)?;
    Ok(Json(state.jobs.update(&id, job).await?))
}

pub async fn delete_job(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> BoardResult<StatusCode> {
    state.authorize(&headers, AuthPolicy::AdminOnly).await?;
    state.jobs.delete(&id).await?;
    tracing::info!(job_id = %id, "job removed");
    Ok(StatusCode::NO_CONTENT)
}

// === Candidates ===

pub async fn list_candidates(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ViewQuery>,
) -> BoardResult<Json<ViewResult<Candidate>>> {
    let slot = &state.views.candidates;
    state.authorize(&headers, slot.policy).await?;
    run_view(slot, state.candidates.list().await?, query)
}

pub async fn update_candidate_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(update): Json<StatusUpdate>,
) -> BoardResult<Json<Candidate>> {
    state.authorize(&headers, AuthPolicy::AdminOnly).await?;
    let mut candidate = state
        .candidates
        .get(&id)
        .await?
        .ok_or_else(|| not_found::<Candidate>(id))?;
    candidate.set_status(update.status);

    let candidate = state.candidates.update(&id, candidate).await?;
    tracing::info!(candidate_id = %id, status = %candidate.status, "candidate status changed");
    Ok(Json(candidate))
}

// === Feedback ===

pub async fn list_feedback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ViewQuery>,
) -> BoardResult<Json<ViewResult<Feedback>>> {
    let slot = &state.views.feedback;
    state.authorize(&headers, slot.policy).await?;
    run_view(slot, state.feedback.list().await?, query)
}

pub async fn submit_feedback(
    State(state): State<AppState>,
    Json(form): Json<ContactForm>,
) -> BoardResult<(StatusCode, Json<Feedback>)> {
    let feedback = state.feedback.create(form.into_feedback()?).await?;
    Ok((StatusCode::CREATED, Json(feedback)))
}

pub async fn delete_feedback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> BoardResult<StatusCode> {
    state.authorize(&headers, AuthPolicy::AdminOnly).await?;
    state.feedback.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// === Resumes ===

pub async fn list_resumes(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ViewQuery>,
) -> BoardResult<Json<ViewResult<ResumeFile>>> {
    let slot = &state.views.resumes;
    state.authorize(&headers, slot.policy).await?;
    run_view(slot, state.resumes.list().await?, query)
}

pub async fn export_resumes(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> BoardResult<impl IntoResponse> {
    state.authorize(&headers, AuthPolicy::AdminOnly).await?;
    let csv = export_csv(&state.resumes.list().await?);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"uploaded_cvs.csv\"",
            ),
        ],
        csv,
    ))
}

pub async fn upload_resume(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> BoardResult<(StatusCode, Json<ResumeFile>)> {
    let context = state.authorize(&headers, AuthPolicy::Authenticated).await?;
    let owner_id = context.account_id().ok_or(AuthError::Unauthenticated)?;

    let file_name = file_name_header(&headers)?;
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_default();
    let uploaded_by = state
        .accounts
        .account(&context)
        .await?
        .map(|account| account.display_name())
        .unwrap_or_else(|| owner_id.to_string());

    let upload = ResumeUpload {
        owner_id,
        uploaded_by,
        file_name,
        content_type,
        size_bytes: body.len() as u64,
    };
    upload.validate(state.config.uploads.max_bytes)?;

    let now = Utc::now();
    let key = upload.storage_key(now);
    let location = state
        .blobs
        .put(&key, &upload.media_type(), body.to_vec())
        .await?;
    tracing::debug!(key = %key, location = %location, "resume blob stored");
    let resume = state.resumes.create(upload.into_resume(key, now)).await?;

    tracing::info!(resume_id = %resume.id, owner_id = %owner_id, size = resume.size_bytes, "resume uploaded");
    Ok((StatusCode::CREATED, Json(resume)))
}

/// The caller's own uploads, newest first
pub async fn my_resumes(State(state): State<AppState>, headers: HeaderMap) -> BoardResult<Json<Vec<ResumeFile>>> {
    let context = state.authorize(&headers, AuthPolicy::Authenticated).await?;
    let owner_id = context.account_id().ok_or(AuthError::Unauthenticated)?;

    let mut mine: Vec<ResumeFile> = state
        .resumes
        .list()
        .await?
        .into_iter()
        .filter(|resume| resume.owner_id == owner_id)
        .collect();
    mine.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));

    Ok(Json(mine))
}

/// Stored file for its owner or an admin
pub async fn download_resume(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> BoardResult<impl IntoResponse> {
    let context = state.authorize(&headers, AuthPolicy::Authenticated).await?;
    let resume = state
        .resumes
        .get(&id)
        .await?
        .ok_or_else(|| not_found::<ResumeFile>(id))?;

    if !context.is_admin() && context.account_id() != Some(resume.owner_id) {
        return Err(AuthError::Forbidden {
            message: "Only the owner or an admin can download this file".to_string(),
        }
        .into());
    }

    let Some((content_type, bytes)) = state.blobs.get(&resume.storage_key).await? else {
        tracing::warn!(resume_id = %id, key = %resume.storage_key, "resume blob missing");
        return Err(not_found::<ResumeFile>(id).into());
    };

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, inline_disposition(&resume.file_name)),
        ],
        bytes,
    ))
}
