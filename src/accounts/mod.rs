//! Registration, login and logout
//!
//! Every flow checks its captcha before anything else, then validates the
//! form, then talks to the [`IdentityProvider`]. Roles always come from the
//! account record held by the identity backend, never from the client.

use crate::core::auth::{AuthContext, Role, SessionStore};
use crate::core::captcha::CaptchaStore;
use crate::core::error::{AuthError, BoardResult, ValidationError};
use crate::core::service::IdentityProvider;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// An account as the identity backend stores it, minus credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl UserAccount {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Everything needed to create an account
#[derive(Debug, Clone, Deserialize)]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

fn accepted(terms: &bool) -> Result<(), validator::ValidationError> {
    if !*terms {
        return Err(validator::ValidationError::new("terms")
            .with_message("Please agree to the terms and conditions".into()));
    }
    Ok(())
}

/// Sign-up form
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RegistrationForm {
    #[validate(length(min = 1, message = "Please fill in all fields"))]
    pub first_name: String,

    #[validate(length(min = 1, message = "Please fill in all fields"))]
    pub last_name: String,

    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,

    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub confirm_password: String,

    #[serde(default)]
    #[validate(custom(function = "accepted"))]
    pub terms: bool,

    pub captcha_id: Uuid,
    pub captcha: String,
}

/// Sign-in form
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    /// Dashboard the user asks for
    pub role: Option<Role>,
    pub captcha_id: Uuid,
    pub captcha: String,
}

/// Result of a successful login
#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    pub token: String,
    pub role: Role,
    pub redirect_to: String,
    pub account: UserAccount,
}

/// Account flows on top of an identity backend
#[derive(Clone)]
pub struct LoginService {
    identity: Arc<dyn IdentityProvider>,
    sessions: SessionStore,
    captcha: CaptchaStore,
}

impl LoginService {
    pub fn new(identity: Arc<dyn IdentityProvider>, sessions: SessionStore, captcha: CaptchaStore) -> Self {
        Self {
            identity,
            sessions,
            captcha,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn captcha(&self) -> &CaptchaStore {
        &self.captcha
    }

    /// Create a candidate account
    pub async fn register(&self, form: RegistrationForm) -> BoardResult<UserAccount> {
        self.captcha.verify(form.captcha_id, &form.captcha)?;

        let form = RegistrationForm {
            first_name: form.first_name.trim().to_string(),
            last_name: form.last_name.trim().to_string(),
            email: form.email.trim().to_lowercase(),
            ..form
        };
        form.validate()?;

        let account = self
            .identity
            .create_account(NewAccount {
                email: form.email,
                password: form.password,
                first_name: form.first_name,
                last_name: form.last_name,
                role: Role::User,
            })
            .await?;

        tracing::info!(account_id = %account.id, "registered new account");
        Ok(account)
    }

    /// Check credentials and open a session
    pub async fn login(&self, request: LoginRequest) -> BoardResult<LoginOutcome> {
        self.captcha.verify(request.captcha_id, &request.captcha)?;

        let email = request.email.trim().to_lowercase();
        let requested = match request.role {
            Some(role) if !email.is_empty() && !request.password.is_empty() => role,
            _ => {
                return Err(ValidationError::field("form", "Please fill in all fields").into());
            }
        };

        let Some(account) = self.identity.authenticate(&email, &request.password).await? else {
            tracing::warn!("login rejected: invalid credentials");
            return Err(AuthError::InvalidCredentials.into());
        };

        if requested == Role::Admin && account.role != Role::Admin {
            tracing::warn!(account_id = %account.id, "login rejected: admin dashboard requested by non-admin");
            return Err(AuthError::Forbidden {
                message: "Invalid admin credentials".to_string(),
            }
            .into());
        }

        let token = self
            .sessions
            .issue(AuthContext::for_account(account.id, requested))?;

        tracing::info!(account_id = %account.id, role = %requested, "login succeeded");
        Ok(LoginOutcome {
            token,
            role: requested,
            redirect_to: requested.landing_route().to_string(),
            account,
        })
    }

    /// Account record behind a session
    pub async fn account(&self, context: &AuthContext) -> BoardResult<Option<UserAccount>> {
        match context.account_id() {
            Some(id) => Ok(self.identity.get_account(&id).await?),
            None => Ok(None),
        }
    }

    /// End the session behind `token`
    pub fn logout(&self, token: &str) -> BoardResult<bool> {
        Ok(self.sessions.revoke(token)?)
    }

    /// Register a configured administrator unless the email is already known
    pub async fn seed_admin(&self, admin: NewAccount) -> BoardResult<()> {
        let email = admin.email.clone();
        match self.identity.create_account(NewAccount { role: Role::Admin, ..admin }).await {
            Ok(account) => {
                tracing::info!(account_id = %account.id, "seeded admin account");
                Ok(())
            }
            Err(err) if matches!(err.downcast_ref::<AuthError>(), Some(AuthError::EmailTaken { .. })) => {
                tracing::debug!(%email, "admin account already present");
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::BoardError;
    use crate::storage::InMemoryIdentityProvider;

    fn service() -> LoginService {
        LoginService::new(
            Arc::new(InMemoryIdentityProvider::new()),
            SessionStore::default(),
            CaptchaStore::default(),
        )
    }

    fn registration(service: &LoginService, email: &str) -> RegistrationForm {
        let challenge = service.captcha().issue().unwrap();
        RegistrationForm {
            first_name: "Sara".to_string(),
            last_name: "Ahmed".to_string(),
            email: email.to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret1".to_string(),
            terms: true,
            captcha_id: challenge.id,
            captcha: challenge.code,
        }
    }

    fn login_request(service: &LoginService, email: &str, password: &str, role: Role) -> LoginRequest {
        let challenge = service.captcha().issue().unwrap();
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
            role: Some(role),
            captcha_id: challenge.id,
            captcha: challenge.code,
        }
    }

    #[tokio::test]
    async fn test_register_then_login_as_user() {
        let service = service();
        let account = service
            .register(registration(&service, "Sara@Example.com"))
            .await
            .unwrap();
        assert_eq!(account.role, Role::User);
        assert_eq!(account.email, "sara@example.com");

        let outcome = service
            .login(login_request(&service, "sara@example.com", "secret1", Role::User))
            .await
            .unwrap();
        assert_eq!(outcome.redirect_to, "/user");
        assert_eq!(
            service.sessions().resolve(&outcome.token).unwrap(),
            AuthContext::User { user_id: account.id }
        );
    }

    #[tokio::test]
    async fn test_register_checks_captcha_first() {
        let service = service();
        let mut form = registration(&service, "not-an-email");
        form.captcha = "wrong!".to_string();
        let err = service.register(form).await.unwrap_err();
        assert!(matches!(err, BoardError::Auth(AuthError::InvalidCaptcha)));
    }

    #[tokio::test]
    async fn test_register_validation() {
        let service = service();
        let mut form = registration(&service, "sara@example.com");
        form.password = "abc".to_string();
        form.confirm_password = "abcd".to_string();
        form.terms = false;

        match service.register(form).await.unwrap_err() {
            BoardError::Validation(ValidationError::FieldErrors(fields)) => {
                assert!(fields.contains_key("password"));
                assert!(fields.contains_key("confirm_password"));
                assert!(fields.contains_key("terms"));
            }
            other => panic!("expected field errors, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let service = service();
        service.register(registration(&service, "sara@example.com")).await.unwrap();
        let err = service
            .register(registration(&service, "sara@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, BoardError::Auth(AuthError::EmailTaken { .. })));
    }

    #[tokio::test]
    async fn test_non_admin_cannot_open_admin_dashboard() {
        let service = service();
        service.register(registration(&service, "sara@example.com")).await.unwrap();
        let err = service
            .login(login_request(&service, "sara@example.com", "secret1", Role::Admin))
            .await
            .unwrap_err();
        assert!(matches!(err, BoardError::Auth(AuthError::Forbidden { .. })));
    }

    #[tokio::test]
    async fn test_seeded_admin_logs_in() {
        let service = service();
        let admin = NewAccount {
            email: "admin@example.com".to_string(),
            password: "admin-pass".to_string(),
            first_name: "Board".to_string(),
            last_name: "Admin".to_string(),
            role: Role::User,
        };
        service.seed_admin(admin.clone()).await.unwrap();
        // seeding twice is harmless
        service.seed_admin(admin).await.unwrap();

        let outcome = service
            .login(login_request(&service, "admin@example.com", "admin-pass", Role::Admin))
            .await
            .unwrap();
        assert_eq!(outcome.role, Role::Admin);
        assert_eq!(outcome.redirect_to, "/admin");
        assert!(service.sessions().resolve(&outcome.token).unwrap().is_admin());
    }

    #[tokio::test]
    async fn test_login_failures() {
        let service = service();
        service.register(registration(&service, "sara@example.com")).await.unwrap();

        let err = service
            .login(login_request(&service, "sara@example.com", "wrong-pass", Role::User))
            .await
            .unwrap_err();
        assert!(matches!(err, BoardError::Auth(AuthError::InvalidCredentials)));

        let mut missing_role = login_request(&service, "sara@example.com", "secret1", Role::User);
        missing_role.role = None;
        let err = service.login(missing_role).await.unwrap_err();
        assert!(matches!(err, BoardError::Validation(_)));
    }

    #[tokio::test]
    async fn test_logout_revokes_session() {
        let service = service();
        service.register(registration(&service, "sara@example.com")).await.unwrap();
        let outcome = service
            .login(login_request(&service, "sara@example.com", "secret1", Role::User))
            .await
            .unwrap();

        assert!(service.logout(&outcome.token).unwrap());
        assert_eq!(
            service.sessions().resolve(&outcome.token).unwrap(),
            AuthContext::Anonymous
        );
    }
}
