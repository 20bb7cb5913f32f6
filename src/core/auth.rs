//! Authorization for talentboard
//!
//! Requests carry an opaque bearer token issued at login. The
//! [`SessionStore`] resolves it into an [`AuthContext`], and every handler
//! checks the context against the [`AuthPolicy`] configured for its route.
//! Role decisions always happen here, on the server.

use crate::core::error::AuthError;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// Account role, stored with the account by the identity backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    /// Dashboard a freshly logged-in account lands on
    pub fn landing_route(self) -> &'static str {
        match self {
            Role::User => "/user",
            Role::Admin => "/admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authorization context extracted from a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthContext {
    /// Signed-in candidate
    User { user_id: Uuid },

    /// Signed-in administrator
    Admin { admin_id: Uuid },

    /// No session (public access)
    Anonymous,
}

impl AuthContext {
    /// Context for a signed-in account of the given role
    pub fn for_account(account_id: Uuid, role: Role) -> Self {
        match role {
            Role::User => AuthContext::User {
                user_id: account_id,
            },
            Role::Admin => AuthContext::Admin {
                admin_id: account_id,
            },
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, AuthContext::Admin { .. })
    }

    pub fn is_authenticated(&self) -> bool {
        !matches!(self, AuthContext::Anonymous)
    }

    /// Id of the signed-in account, whatever its role
    pub fn account_id(&self) -> Option<Uuid> {
        match self {
            AuthContext::User { user_id } => Some(*user_id),
            AuthContext::Admin { admin_id } => Some(*admin_id),
            AuthContext::Anonymous => None,
        }
    }

    pub fn role(&self) -> Option<Role> {
        match self {
            AuthContext::User { .. } => Some(Role::User),
            AuthContext::Admin { .. } => Some(Role::Admin),
            AuthContext::Anonymous => None,
        }
    }
}

/// Authorization policy for a route
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthPolicy {
    /// Public access (no auth required)
    Public,

    /// Any signed-in account
    #[default]
    Authenticated,

    /// Admin only
    AdminOnly,
}

impl AuthPolicy {
    /// Check if auth context satisfies this policy
    pub fn check(&self, context: &AuthContext) -> bool {
        match self {
            AuthPolicy::Public => true,
            AuthPolicy::Authenticated => context.is_authenticated(),
            AuthPolicy::AdminOnly => context.is_admin(),
        }
    }

    /// Like [`check`](Self::check), but says why access was refused
    pub fn require(&self, context: &AuthContext) -> Result<(), AuthError> {
        if self.check(context) {
            return Ok(());
        }
        if !context.is_authenticated() {
            return Err(AuthError::Unauthenticated);
        }
        Err(AuthError::Forbidden {
            message: format!("requires {} access", self.as_str()),
        })
    }

    /// Parse policy from string (for YAML config)
    pub fn parse_policy(s: &str) -> Self {
        match s {
            "public" => AuthPolicy::Public,
            "authenticated" => AuthPolicy::Authenticated,
            "admin_only" => AuthPolicy::AdminOnly,
            _ => AuthPolicy::Authenticated, // Default
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AuthPolicy::Public => "public",
            AuthPolicy::Authenticated => "authenticated",
            AuthPolicy::AdminOnly => "admin_only",
        }
    }
}

/// Trait for auth providers
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Extract auth context from request headers
    async fn extract_context(&self, headers: &HeaderMap) -> Result<AuthContext>;
}

/// Token in an `Authorization: Bearer <token>` header, if any
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Sessions last a day unless configured otherwise
pub const DEFAULT_SESSION_TTL_SECONDS: u64 = 86_400;

/// Opaque bearer tokens mapped to the context they were issued for
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, (AuthContext, DateTime<Utc>)>>>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TTL_SECONDS)
    }
}

impl SessionStore {
    pub fn new(ttl_seconds: u64) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl: Duration::try_seconds(i64::try_from(ttl_seconds).unwrap_or(i64::MAX))
                .unwrap_or(Duration::MAX),
        }
    }

    /// Start a session and return its token
    pub fn issue(&self, context: AuthContext) -> Result<String> {
        self.issue_at(context, Utc::now())
    }

    pub fn issue_at(&self, context: AuthContext, now: DateTime<Utc>) -> Result<String> {
        let token = Uuid::new_v4().simple().to_string();
        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;
        sessions.retain(|_, (_, issued)| now - *issued <= self.ttl);
        sessions.insert(token.clone(), (context, now));
        Ok(token)
    }

    /// Context for `token`; unknown and expired tokens are anonymous
    pub fn resolve(&self, token: &str) -> Result<AuthContext> {
        self.resolve_at(token, Utc::now())
    }

    pub fn resolve_at(&self, token: &str, now: DateTime<Utc>) -> Result<AuthContext> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;
        match sessions.get(token) {
            Some((context, issued)) if now - *issued <= self.ttl => Ok(*context),
            Some(_) => {
                sessions.remove(token);
                tracing::debug!("expired session token rejected");
                Ok(AuthContext::Anonymous)
            }
            None => Ok(AuthContext::Anonymous),
        }
    }

    /// Number of sessions still held, expired or not
    pub fn session_count(&self) -> Result<usize> {
        let sessions = self
            .sessions
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;
        Ok(sessions.len())
    }

    /// End a session; returns whether it existed
    pub fn revoke(&self, token: &str) -> Result<bool> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;
        Ok(sessions.remove(token).is_some())
    }
}

#[async_trait]
impl AuthProvider for SessionStore {
    async fn extract_context(&self, headers: &HeaderMap) -> Result<AuthContext> {
        match bearer_token(headers) {
            Some(token) => self.resolve(token),
            None => Ok(AuthContext::Anonymous),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_policy_check() {
        let user = AuthContext::User {
            user_id: Uuid::new_v4(),
        };
        let admin = AuthContext::Admin {
            admin_id: Uuid::new_v4(),
        };
        let anon = AuthContext::Anonymous;

        assert!(AuthPolicy::Public.check(&anon));
        assert!(!AuthPolicy::Authenticated.check(&anon));
        assert!(AuthPolicy::Authenticated.check(&user));
        assert!(AuthPolicy::Authenticated.check(&admin));
        assert!(!AuthPolicy::AdminOnly.check(&user));
        assert!(AuthPolicy::AdminOnly.check(&admin));
    }

    #[test]
    fn test_require_distinguishes_anonymous_from_forbidden() {
        let user = AuthContext::User {
            user_id: Uuid::new_v4(),
        };
        assert_eq!(
            AuthPolicy::AdminOnly.require(&AuthContext::Anonymous),
            Err(AuthError::Unauthenticated)
        );
        assert!(matches!(
            AuthPolicy::AdminOnly.require(&user),
            Err(AuthError::Forbidden { .. })
        ));
        assert_eq!(AuthPolicy::Authenticated.require(&user), Ok(()));
    }

    #[test]
    fn test_parse_policy() {
        assert_eq!(AuthPolicy::parse_policy("public"), AuthPolicy::Public);
        assert_eq!(AuthPolicy::parse_policy("admin_only"), AuthPolicy::AdminOnly);
        assert_eq!(AuthPolicy::parse_policy("authenticated"), AuthPolicy::Authenticated);
        assert_eq!(AuthPolicy::parse_policy("something_unknown"), AuthPolicy::Authenticated);
    }

    #[test]
    fn test_context_accessors() {
        let id = Uuid::new_v4();
        let admin = AuthContext::for_account(id, Role::Admin);
        assert!(admin.is_admin());
        assert_eq!(admin.account_id(), Some(id));
        assert_eq!(admin.role(), Some(Role::Admin));

        let user = AuthContext::for_account(id, Role::User);
        assert!(!user.is_admin());
        assert_eq!(user.role().map(Role::landing_route), Some("/user"));

        assert_eq!(AuthContext::Anonymous.account_id(), None);
    }

    #[test]
    fn test_bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
        assert_eq!(bearer_token(&headers), Some("abc123"));
    }

    #[tokio::test]
    async fn test_session_store_issue_resolve_revoke() {
        let store = SessionStore::default();
        let context = AuthContext::User {
            user_id: Uuid::new_v4(),
        };
        let token = store.issue(context).unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );
        assert_eq!(store.extract_context(&headers).await.unwrap(), context);

        assert!(store.revoke(&token).unwrap());
        assert!(!store.revoke(&token).unwrap());
        assert_eq!(
            store.extract_context(&headers).await.unwrap(),
            AuthContext::Anonymous
        );
    }

    #[test]
    fn test_expired_session_is_rejected_and_pruned() {
        let store = SessionStore::new(60);
        let context = AuthContext::Admin {
            admin_id: Uuid::new_v4(),
        };
        let issued = Utc::now();
        let token = store.issue_at(context, issued).unwrap();

        assert_eq!(store.resolve_at(&token, issued + Duration::seconds(60)).unwrap(), context);
        assert_eq!(
            store.resolve_at(&token, issued + Duration::seconds(61)).unwrap(),
            AuthContext::Anonymous
        );
        assert_eq!(store.session_count().unwrap(), 0);

        // issuing drops other stale sessions
        store.issue_at(context, issued).unwrap();
        store.issue_at(context, issued + Duration::seconds(120)).unwrap();
        assert_eq!(store.session_count().unwrap(), 1);
    }
}
