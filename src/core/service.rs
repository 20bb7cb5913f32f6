//! Service traits for the hosted backend
//!
//! The board never talks to a database, an auth server or an object store
//! directly. It goes through these seams, so the in-memory implementations
//! in [`crate::storage`] can be swapped for a real backend.

use crate::accounts::{NewAccount, UserAccount};
use crate::core::entity::Entity;
use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

/// Service trait for managing one kind of record
///
/// `list` returns records in insertion order; list views rely on it as the
/// order of unsorted results.
#[async_trait]
pub trait RecordService<T: Entity>: Send + Sync {
    /// Create a new record
    async fn create(&self, record: T) -> Result<T>;

    /// Get a record by ID
    async fn get(&self, id: &Uuid) -> Result<Option<T>>;

    /// List all records, oldest insertion first
    async fn list(&self) -> Result<Vec<T>>;

    /// Replace an existing record
    async fn update(&self, id: &Uuid, record: T) -> Result<T>;

    /// Delete a record
    async fn delete(&self, id: &Uuid) -> Result<()>;
}

/// Account registry and credential check
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Register a new account; a taken email fails with `AuthError::EmailTaken`
    async fn create_account(&self, account: NewAccount) -> Result<UserAccount>;

    /// Look up an account by credentials, `None` when they do not match
    async fn authenticate(&self, email: &str, password: &str) -> Result<Option<UserAccount>>;

    /// Get an account by ID
    async fn get_account(&self, id: &Uuid) -> Result<Option<UserAccount>>;
}

/// Object storage for uploaded files
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` under `key` and return its download URL
    async fn put(&self, key: &str, content_type: &str, bytes: Vec<u8>) -> Result<String>;

    /// Fetch a stored object with its content type
    async fn get(&self, key: &str) -> Result<Option<(String, Vec<u8>)>>;
}
