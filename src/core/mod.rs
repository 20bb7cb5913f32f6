//! Core module containing the list-view engine and the traits shared by every view

pub mod auth;
pub mod captcha;
pub mod entity;
pub mod error;
pub mod field;
pub mod query;
pub mod record;
pub mod service;
pub mod view;

pub use auth::{AuthContext, AuthPolicy, AuthProvider, Role, SessionStore};
pub use captcha::{CaptchaChallenge, CaptchaStore};
pub use entity::Entity;
pub use error::{BoardError, BoardResult};
pub use field::FieldValue;
pub use query::{Controls, PaginationMeta, SortDirection, SortSpec, ViewQuery, ViewResult};
pub use record::{DynamicRecord, Record};
pub use service::{BlobStore, IdentityProvider, RecordService};
pub use view::{ListView, compute_view};
