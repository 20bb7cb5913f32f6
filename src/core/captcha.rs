//! Text captcha challenges for the login and registration forms

use crate::core::error::AuthError;
use anyhow::{Result, anyhow};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// Characters a captcha code is drawn from
const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

pub const CODE_LEN: usize = 6;

/// Default lifetime of an issued challenge
pub const DEFAULT_TTL_SECONDS: u64 = 300;

/// A challenge handed to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptchaChallenge {
    pub id: Uuid,
    pub code: String,
}

/// Generate a random code over `[A-Za-z0-9]`
pub fn generate_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LEN)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

/// Outstanding challenges, each answerable once
#[derive(Clone)]
pub struct CaptchaStore {
    pending: Arc<RwLock<HashMap<Uuid, (String, DateTime<Utc>)>>>,
    ttl: Duration,
}

impl Default for CaptchaStore {
    fn default() -> Self {
        Self::new(DEFAULT_TTL_SECONDS)
    }
}

impl CaptchaStore {
    pub fn new(ttl_seconds: u64) -> Self {
        Self {
            pending: Arc::new(RwLock::new(HashMap::new())),
            ttl: Duration::try_seconds(i64::try_from(ttl_seconds).unwrap_or(i64::MAX))
                .unwrap_or(Duration::MAX),
        }
    }

    /// Issue a fresh challenge
    pub fn issue(&self) -> Result<CaptchaChallenge> {
        self.issue_at(Utc::now())
    }

    pub fn issue_at(&self, now: DateTime<Utc>) -> Result<CaptchaChallenge> {
        let challenge = CaptchaChallenge {
            id: Uuid::new_v4(),
            code: generate_code(),
        };

        let mut pending = self
            .pending
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;
        // expired challenges are dropped whenever a new one is handed out
        pending.retain(|_, (_, issued)| now - *issued <= self.ttl);
        pending.insert(challenge.id, (challenge.code.clone(), now));

        Ok(challenge)
    }

    /// Check an answer; the challenge is consumed either way
    pub fn verify(&self, id: Uuid, answer: &str) -> Result<(), AuthError> {
        self.verify_at(id, answer, Utc::now())
    }

    pub fn verify_at(&self, id: Uuid, answer: &str, now: DateTime<Utc>) -> Result<(), AuthError> {
        let entry = match self.pending.write() {
            Ok(mut pending) => pending.remove(&id),
            Err(e) => {
                tracing::error!("captcha store lock poisoned: {}", e);
                None
            }
        };

        match entry {
            Some((code, issued)) if now - issued <= self.ttl && code == answer.trim() => Ok(()),
            _ => Err(AuthError::InvalidCaptcha),
        }
    }
}
