//! In-memory backend for testing and development
//!
//! Stands in for the hosted backend: a record store per entity, an account
//! registry with salted password digests, and a blob store for uploads.

use crate::accounts::{NewAccount, UserAccount};
use crate::core::error::{AuthError, RecordError};
use crate::core::{BlobStore, Entity, IdentityProvider, RecordService};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::Utc;
use indexmap::IndexMap;
use rand::Rng;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// In-memory record service
///
/// Records keep their insertion order. Uses RwLock for thread-safe access.
#[derive(Clone)]
pub struct InMemoryRecordService<T> {
    records: Arc<RwLock<IndexMap<Uuid, T>>>,
}

impl<T: Entity> InMemoryRecordService<T> {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(IndexMap::new())),
        }
    }

    /// Service pre-filled with `records`, in the given order
    pub fn with_records(records: impl IntoIterator<Item = T>) -> Self {
        Self {
            records: Arc::new(RwLock::new(
                records.into_iter().map(|r| (r.id(), r)).collect(),
            )),
        }
    }

    fn not_found(id: &Uuid) -> anyhow::Error {
        RecordError::NotFound {
            record_type: T::resource_name_singular().to_string(),
            id: *id,
        }
        .into()
    }
}

impl<T: Entity> Default for InMemoryRecordService<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Entity> RecordService<T> for InMemoryRecordService<T> {
    async fn create(&self, record: T) -> Result<T> {
        let mut records = self
            .records
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        if records.contains_key(&record.id()) {
            return Err(RecordError::AlreadyExists {
                record_type: T::resource_name_singular().to_string(),
                id: record.id(),
            }
            .into());
        }
        records.insert(record.id(), record.clone());

        tracing::debug!(resource = T::resource_name(), id = %record.id(), "created record");
        Ok(record)
    }

    async fn get(&self, id: &Uuid) -> Result<Option<T>> {
        let records = self
            .records
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(records.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<T>> {
        let records = self
            .records
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(records.values().cloned().collect())
    }

    async fn update(&self, id: &Uuid, record: T) -> Result<T> {
        let mut records = self
            .records
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let slot = records.get_mut(id).ok_or_else(|| Self::not_found(id))?;
        *slot = record.clone();

        tracing::debug!(resource = T::resource_name(), %id, "updated record");
        Ok(record)
    }

    async fn delete(&self, id: &Uuid) -> Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        // shift_remove keeps the remaining records in insertion order
        records.shift_remove(id).ok_or_else(|| Self::not_found(id))?;

        tracing::debug!(resource = T::resource_name(), %id, "deleted record");
        Ok(())
    }
}

struct StoredAccount {
    account: UserAccount,
    salt: String,
    digest: String,
}

fn generate_salt() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 16] = rng.random();
    hex::encode(bytes)
}

fn password_digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// In-memory account registry, keyed by lowercased email
#[derive(Clone, Default)]
pub struct InMemoryIdentityProvider {
    accounts: Arc<RwLock<HashMap<String, StoredAccount>>>,
}

impl InMemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn create_account(&self, new: NewAccount) -> Result<UserAccount> {
        let email = new.email.trim().to_lowercase();
        let mut accounts = self
            .accounts
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        if accounts.contains_key(&email) {
            return Err(AuthError::EmailTaken { email }.into());
        }

        let account = UserAccount {
            id: Uuid::new_v4(),
            email: email.clone(),
            first_name: new.first_name,
            last_name: new.last_name,
            role: new.role,
            created_at: Utc::now(),
        };
        let salt = generate_salt();
        let digest = password_digest(&salt, &new.password);
        accounts.insert(
            email,
            StoredAccount {
                account: account.clone(),
                salt,
                digest,
            },
        );

        Ok(account)
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<Option<UserAccount>> {
        let accounts = self
            .accounts
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(accounts
            .get(&email.trim().to_lowercase())
            .filter(|stored| password_digest(&stored.salt, password) == stored.digest)
            .map(|stored| stored.account.clone()))
    }

    async fn get_account(&self, id: &Uuid) -> Result<Option<UserAccount>> {
        let accounts = self
            .accounts
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(accounts
            .values()
            .find(|stored| &stored.account.id == id)
            .map(|stored| stored.account.clone()))
    }
}

/// In-memory object store
#[derive(Clone, Default)]
pub struct InMemoryBlobStore {
    objects: Arc<RwLock<HashMap<String, (String, Vec<u8>)>>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn put(&self, key: &str, content_type: &str, bytes: Vec<u8>) -> Result<String> {
        let mut objects = self
            .objects
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        objects.insert(key.to_string(), (content_type.to_string(), bytes));
        Ok(format!("memory://{}", key))
    }

    async fn get(&self, key: &str) -> Result<Option<(String, Vec<u8>)>> {
        let objects = self
            .objects
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(objects.get(key).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::auth::Role;
    use crate::entities::Feedback;

    #[tokio::test]
    async fn test_record_service_keeps_insertion_order() {
        let service = InMemoryRecordService::new();
        for name in ["Zain Malik", "Ali Raza", "Omar Siddiqui"] {
            service
                .create(Feedback::new(name, "x@example.com", "hi"))
                .await
                .unwrap();
        }

        let names: Vec<String> = service.list().await.unwrap().into_iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["Zain Malik", "Ali Raza", "Omar Siddiqui"]);
    }

    #[tokio::test]
    async fn test_record_service_crud() {
        let service = InMemoryRecordService::new();
        let feedback = service
            .create(Feedback::new("Ali Raza", "ali@example.com", "Great UI!"))
            .await
            .unwrap();

        assert!(service.create(feedback.clone()).await.is_err());

        let mut edited = feedback.clone();
        edited.message = "Great UX!".to_string();
        service.update(&feedback.id, edited).await.unwrap();
        let fetched = service.get(&feedback.id).await.unwrap().unwrap();
        assert_eq!(fetched.message, "Great UX!");

        service.delete(&feedback.id).await.unwrap();
        assert!(service.get(&feedback.id).await.unwrap().is_none());

        let err = service.delete(&feedback.id).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RecordError>(),
            Some(RecordError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_preserves_order_of_the_rest() {
        let records: Vec<Feedback> = ["a", "b", "c", "d"]
            .into_iter()
            .map(|n| Feedback::new(n, "x@example.com", "m"))
            .collect();
        let service = InMemoryRecordService::with_records(records.clone());

        service.delete(&records[1].id).await.unwrap();
        let names: Vec<String> = service.list().await.unwrap().into_iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["a", "c", "d"]);
    }

    #[tokio::test]
    async fn test_identity_provider() {
        let provider = InMemoryIdentityProvider::new();
        let account = provider
            .create_account(NewAccount {
                email: "Fatima@Example.com".to_string(),
                password: "secret1".to_string(),
                first_name: "Fatima".to_string(),
                last_name: "Khan".to_string(),
                role: Role::User,
            })
            .await
            .unwrap();
        assert_eq!(account.display_name(), "Fatima Khan");

        assert_eq!(
            provider.authenticate("fatima@example.com", "secret1").await.unwrap(),
            Some(account.clone())
        );
        assert_eq!(provider.authenticate("fatima@example.com", "secret2").await.unwrap(), None);
        assert_eq!(provider.get_account(&account.id).await.unwrap(), Some(account));
    }

    #[test]
    fn test_password_digest_is_salted() {
        assert_ne!(password_digest("salt-a", "secret"), password_digest("salt-b", "secret"));
        assert_eq!(password_digest("salt-a", "secret").len(), 64);
    }

    #[test]
    fn test_digest_and_salt_are_lowercase_hex() {
        assert_eq!(
            password_digest("", "abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        let salt = generate_salt();
        assert_eq!(salt.len(), 32);
        assert!(salt.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')));
    }

    #[tokio::test]
    async fn test_blob_store_round_trip() {
        let store = InMemoryBlobStore::new();
        let url = store
            .put("resumes/a_1_cv.pdf", "application/pdf", vec![1, 2, 3])
            .await
            .unwrap();
        assert_eq!(url, "memory://resumes/a_1_cv.pdf");
        assert_eq!(
            store.get("resumes/a_1_cv.pdf").await.unwrap(),
            Some(("application/pdf".to_string(), vec![1, 2, 3]))
        );
        assert!(store.get("missing").await.unwrap().is_none());
    }
}
