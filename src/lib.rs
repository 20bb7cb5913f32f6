//! # talentboard
//!
//! Backend for a small recruitment board: a public job board, a contact
//! form, resume uploads, and admin dashboards for candidates, feedback and
//! uploaded files.
//!
//! ## Features
//!
//! - **List-view engine**: one pure function ([`core::compute_view`]) does
//!   search, sort and pagination for every table in the app
//! - **Typed records**: candidates, feedback, job postings and resume files
//!   expose their fields through the [`core::Record`] trait
//! - **Server-side authorization**: captcha-guarded login, bearer sessions
//!   and per-view access policies
//! - **Pluggable backend**: records, accounts and files live behind async
//!   service traits with in-memory implementations for development
//! - **Configuration-based**: page sizes, default sorts, policies and seeded
//!   admins come from YAML
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use talentboard::prelude::*;
//!
//! let candidates = vec![
//!     Candidate::new("Ali Raza", "ali@example.com", "Backend Developer", "/r/ali.pdf", 91),
//!     Candidate::new("Sara Ahmed", "sara@example.com", "UI Designer", "/r/sara.pdf", 74),
//! ];
//!
//! let view = ListView::for_entity::<Candidate>();
//! let mut controls = Controls::with_page_size(3);
//! controls.set_search("developer");
//! controls.toggle_sort("match_score");
//!
//! let page = view.compute(&candidates, &controls)?;
//! assert_eq!(page.total_matched(), 1);
//! ```

pub mod accounts;
pub mod config;
pub mod core;
pub mod entities;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Engine ===
    pub use crate::core::{
        Controls, DynamicRecord, Entity, FieldValue, ListView, PaginationMeta, Record,
        SortDirection, SortSpec, ViewQuery, ViewResult, compute_view,
    };

    // === Errors ===
    pub use crate::core::error::{
        AuthError, BoardError, BoardResult, ConfigError, RecordError, ValidationError, ViewError,
    };

    // === Auth ===
    pub use crate::core::{AuthContext, AuthPolicy, AuthProvider, CaptchaStore, Role, SessionStore};

    // === Records ===
    pub use crate::entities::{
        Candidate, CandidateStatus, ContactForm, Feedback, FileKind, JobForm, JobPosting,
        ProfileForm, ResumeFile, ResumeUpload, UserProfile,
    };

    // === Services ===
    pub use crate::accounts::{LoginRequest, LoginService, RegistrationForm, UserAccount};
    pub use crate::core::{BlobStore, IdentityProvider, RecordService};
    pub use crate::storage::{InMemoryBlobStore, InMemoryIdentityProvider, InMemoryRecordService};

    // === Config & Server ===
    pub use crate::config::BoardConfig;
    pub use crate::server::{AppState, ServerBuilder};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use serde::{Deserialize, Serialize};
    pub use uuid::Uuid;
}
