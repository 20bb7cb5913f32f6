//! Typed error handling for talentboard
//!
//! Every failure surfaced by the crate is a [`BoardError`], which wraps a
//! category-specific error so callers can match on what actually went wrong:
//!
//! - [`ViewError`]: invalid list-view configuration (e.g. a zero page size)
//! - [`RecordError`]: record lookups and conflicts against the record source
//! - [`AuthError`]: captcha, credential, session and permission failures
//! - [`ConfigError`]: configuration parsing and validation
//! - [`ValidationError`]: form and query input validation
//!
//! # Example
//!
//! ```rust,ignore
//! match compute_view(&records, &["name"], &controls) {
//!     Ok(view) => render(view),
//!     Err(ViewError::InvalidConfiguration { field, .. }) => {
//!         panic!("view wired with a bad {field}")
//!     }
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;
use uuid::Uuid;

/// The main error type for talentboard
#[derive(Debug, Error)]
pub enum BoardError {
    /// List-view configuration errors
    #[error(transparent)]
    View(#[from] ViewError),

    /// Record source errors
    #[error(transparent)]
    Record(#[from] RecordError),

    /// Authentication and authorization errors
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Input validation errors
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Unexpected failures from a backend collaborator
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl BoardError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            BoardError::View(_) => StatusCode::BAD_REQUEST,
            BoardError::Record(e) => e.status_code(),
            BoardError::Auth(e) => e.status_code(),
            BoardError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            BoardError::Validation(_) => StatusCode::BAD_REQUEST,
            BoardError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            BoardError::View(_) => "INVALID_CONFIGURATION",
            BoardError::Record(e) => e.error_code(),
            BoardError::Auth(e) => e.error_code(),
            BoardError::Config(_) => "CONFIG_ERROR",
            BoardError::Validation(_) => "VALIDATION_ERROR",
            BoardError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            BoardError::Record(RecordError::NotFound { record_type, id }) => {
                Some(serde_json::json!({
                    "record_type": record_type,
                    "id": id.to_string()
                }))
            }
            BoardError::Validation(ValidationError::FieldErrors(errors)) => {
                Some(serde_json::json!({ "fields": errors }))
            }
            BoardError::Validation(ValidationError::FieldError { field, message }) => {
                let fields = BTreeMap::from([(field.clone(), vec![message.clone()])]);
                Some(serde_json::json!({ "fields": fields }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for BoardError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), "{}", self);
        }
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// View Errors
// =============================================================================

/// Errors raised by the list-view engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewError {
    /// A control value the engine cannot work with
    #[error("Invalid view configuration for '{field}': {message}")]
    InvalidConfiguration { field: String, message: String },
}

// =============================================================================
// Record Errors
// =============================================================================

/// Errors related to records held by the record source
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// Record was not found
    #[error("{record_type} with id '{id}' not found")]
    NotFound { record_type: String, id: Uuid },

    /// Record already exists
    #[error("{record_type} with id '{id}' already exists")]
    AlreadyExists { record_type: String, id: Uuid },
}

impl RecordError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RecordError::NotFound { .. } => StatusCode::NOT_FOUND,
            RecordError::AlreadyExists { .. } => StatusCode::CONFLICT,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            RecordError::NotFound { .. } => "RECORD_NOT_FOUND",
            RecordError::AlreadyExists { .. } => "RECORD_ALREADY_EXISTS",
        }
    }
}

// =============================================================================
// Auth Errors
// =============================================================================

/// Errors related to authentication and authorization
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Captcha answer did not match, or the challenge is unknown or expired
    #[error("Invalid captcha. Please try again.")]
    InvalidCaptcha,

    /// Email/password pair rejected by the identity backend
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// No valid session on the request
    #[error("Authentication required")]
    Unauthenticated,

    /// Session is valid but lacks the required role
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    /// An account already uses this email
    #[error("An account with email '{email}' already exists")]
    EmailTaken { email: String },
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidCaptcha => StatusCode::BAD_REQUEST,
            AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AuthError::EmailTaken { .. } => StatusCode::CONFLICT,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::InvalidCaptcha => "INVALID_CAPTCHA",
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::Unauthenticated => "UNAUTHENTICATED",
            AuthError::Forbidden { .. } => "FORBIDDEN",
            AuthError::EmailTaken { .. } => "EMAIL_TAKEN",
        }
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Failed to parse configuration
    #[error("Failed to parse config{}: {message}", describe_file(.file))]
    ParseError {
        file: Option<String>,
        message: String,
    },

    /// Invalid value in configuration
    #[error("Invalid value '{value}' for field '{field}': {message}")]
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors related to input validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Single field validation error
    #[error("Validation error for field '{field}': {message}")]
    FieldError { field: String, message: String },

    /// Multiple field validation errors, keyed by field name
    #[error("Validation errors: {}", summarize(.0))]
    FieldErrors(BTreeMap<String, Vec<String>>),
}

impl ValidationError {
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError::FieldError {
            field: field.into(),
            message: message.into(),
        }
    }
}

fn describe_file(file: &Option<String>) -> String {
    file.as_ref()
        .map(|f| format!(" file '{}'", f))
        .unwrap_or_default()
}

fn summarize(errors: &BTreeMap<String, Vec<String>>) -> String {
    errors
        .iter()
        .map(|(field, messages)| format!("{}: {}", field, messages.join("; ")))
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<validator::ValidationErrors> for ValidationError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let fields = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let messages = errs
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .collect();
                (field.to_string(), messages)
            })
            .collect();
        ValidationError::FieldErrors(fields)
    }
}

impl From<validator::ValidationErrors> for BoardError {
    fn from(errors: validator::ValidationErrors) -> Self {
        BoardError::Validation(errors.into())
    }
}

// =============================================================================
// Conversions from external errors
// =============================================================================

impl From<serde_yaml::Error> for BoardError {
    fn from(err: serde_yaml::Error) -> Self {
        BoardError::Config(ConfigError::ParseError {
            file: None,
            message: err.to_string(),
        })
    }
}

/// Backend collaborators report through `anyhow`; typed errors they carry
/// are recovered so that e.g. a missing record still maps to 404.
impl From<anyhow::Error> for BoardError {
    fn from(err: anyhow::Error) -> Self {
        let err = match err.downcast::<BoardError>() {
            Ok(board) => return board,
            Err(err) => err,
        };
        let err = match err.downcast::<RecordError>() {
            Ok(record) => return BoardError::Record(record),
            Err(err) => err,
        };
        match err.downcast::<AuthError>() {
            Ok(auth) => BoardError::Auth(auth),
            Err(err) => BoardError::Internal(format!("{:#}", err)),
        }
    }
}

/// A specialized Result type for talentboard operations
pub type BoardResult<T> = Result<T, BoardError>;
