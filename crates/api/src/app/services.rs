//! Service wiring and the credential flows.
//!
//! `AppServices` holds the external collaborators (credential store, password
//! verifier, token codec) behind trait objects so routes and tests can swap
//! implementations freely.

use std::sync::Arc;

use chrono::{Duration, Utc};
use thiserror::Error;

use rolegate_auth::{
    BcryptVerifier, Hs256TokenCodec, Identity, PasswordError, PasswordVerifier, TokenCodec,
    TokenError, default_lifetime,
};
use rolegate_core::{RoleId, UserId};
use rolegate_store::{CredentialStore, MenuNode, RoleRecord, StoreError, UserRecord};

use crate::context::CurrentUser;

/// Role granted to fresh registrations.
const DEFAULT_ROLE: &str = "staff";

#[derive(Debug, Error)]
pub enum AuthFlowError {
    /// Unknown username or wrong password; deliberately one variant so the
    /// two cases cannot be told apart.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("username is already taken")]
    UsernameTaken,

    #[error("role is invalid or not held by the user")]
    RoleNotOwned,

    #[error("validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Successful login: an unscoped token plus the role set to choose from.
pub struct LoginOutcome {
    pub token: String,
    pub user: UserRecord,
    pub roles: Vec<RoleRecord>,
}

/// Successful role selection: a re-minted scoped token.
pub struct SelectedRole {
    pub token: String,
    pub role: RoleRecord,
}

pub struct AppServices {
    store: Arc<dyn CredentialStore>,
    passwords: Arc<dyn PasswordVerifier>,
    tokens: Arc<dyn TokenCodec>,
    token_lifetime: Duration,
}

impl AppServices {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        passwords: Arc<dyn PasswordVerifier>,
        tokens: Arc<dyn TokenCodec>,
        token_lifetime: Duration,
    ) -> Self {
        Self {
            store,
            passwords,
            tokens,
            token_lifetime,
        }
    }

    /// Production wiring: bcrypt at default cost, HS256 with the given
    /// secret, one-day tokens.
    pub fn with_defaults(store: Arc<dyn CredentialStore>, jwt_secret: &str) -> Self {
        Self::new(
            store,
            Arc::new(BcryptVerifier::default()),
            Arc::new(Hs256TokenCodec::new(jwt_secret.as_bytes())),
            default_lifetime(),
        )
    }

    pub fn store(&self) -> &dyn CredentialStore {
        self.store.as_ref()
    }

    pub fn tokens(&self) -> Arc<dyn TokenCodec> {
        Arc::clone(&self.tokens)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Authentication flow
    // ─────────────────────────────────────────────────────────────────────

    /// Validate credentials and mint an unscoped session token.
    ///
    /// Idempotent; no side effects beyond the lookups.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, AuthFlowError> {
        let user = self
            .store
            .find_user_by_username(username)
            .await?
            .ok_or(AuthFlowError::InvalidCredentials)?;

        let matches = self
            .verify_password(password.to_string(), user.password_digest.clone())
            .await?;
        if !matches {
            return Err(AuthFlowError::InvalidCredentials);
        }

        let roles = self.store.list_roles_for_user(user.id).await?;

        let identity = Identity::unscoped(user.id, user.username.clone());
        let token = self.tokens.encode(identity, Utc::now(), self.token_lifetime)?;

        Ok(LoginOutcome { token, user, roles })
    }

    /// Create a user and grant the default role (best effort).
    pub async fn register(&self, username: &str, password: &str) -> Result<UserRecord, AuthFlowError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AuthFlowError::Validation(
                "username and password are required".to_string(),
            ));
        }

        if self.store.find_user_by_username(username).await?.is_some() {
            return Err(AuthFlowError::UsernameTaken);
        }

        let digest = self.digest_password(password.to_string()).await?;

        // The pre-check above races with concurrent registrations; the
        // store's uniqueness constraint arbitrates.
        let user = match self.store.create_user(username, &digest).await {
            Ok(user) => user,
            Err(StoreError::UniqueViolation(_)) => return Err(AuthFlowError::UsernameTaken),
            Err(e) => return Err(e.into()),
        };

        // Best effort: the user record stands even if the grant fails.
        if let Err(e) = self.grant_default_role(user.id).await {
            tracing::error!(
                error = %e,
                user_id = %user.id,
                role = DEFAULT_ROLE,
                "default role assignment failed during registration"
            );
        }

        Ok(user)
    }

    async fn grant_default_role(&self, user_id: UserId) -> Result<(), StoreError> {
        let role = self
            .store
            .find_role_by_name(DEFAULT_ROLE)
            .await?
            .ok_or_else(|| {
                StoreError::Query(format!("default role '{DEFAULT_ROLE}' is not in the catalog"))
            })?;
        self.store.assign_role(user_id, role.id).await
    }

    // ─────────────────────────────────────────────────────────────────────
    // Role selection flow
    // ─────────────────────────────────────────────────────────────────────

    /// Re-mint the caller's token scoped to `role_id`.
    ///
    /// The caller must already be authenticated (this never accepts raw
    /// credentials) and must hold the role *now*; token validity alone is
    /// not enough. The new token gets a fresh expiry window.
    pub async fn select_role(
        &self,
        user: &CurrentUser,
        role_id: RoleId,
    ) -> Result<SelectedRole, AuthFlowError> {
        let owned = self
            .store
            .has_role_assignment(user.user_id(), role_id)
            .await?;
        if !owned {
            return Err(AuthFlowError::RoleNotOwned);
        }

        let role = self
            .store
            .find_role_by_id(role_id)
            .await?
            .ok_or(AuthFlowError::RoleNotOwned)?;

        let identity = user.identity().with_role(role.id, role.name.clone());
        let token = self.tokens.encode(identity, Utc::now(), self.token_lifetime)?;

        Ok(SelectedRole { token, role })
    }

    // ─────────────────────────────────────────────────────────────────────
    // Menu access resolver
    // ─────────────────────────────────────────────────────────────────────

    /// The menu nodes `role_id` may see. Empty is a valid answer.
    pub async fn menus_for_role(&self, role_id: RoleId) -> Result<Vec<MenuNode>, AuthFlowError> {
        Ok(self.store.list_menu_nodes_for_role(role_id).await?)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Password helpers
    // ─────────────────────────────────────────────────────────────────────

    // bcrypt is CPU-bound; run it off the async executor so one login does
    // not park unrelated requests.

    async fn digest_password(&self, plaintext: String) -> Result<String, AuthFlowError> {
        let passwords = Arc::clone(&self.passwords);
        tokio::task::spawn_blocking(move || passwords.digest(&plaintext))
            .await
            .map_err(|e| AuthFlowError::Internal(format!("hashing task failed: {e}")))?
            .map_err(Into::into)
    }

    async fn verify_password(
        &self,
        plaintext: String,
        digest: String,
    ) -> Result<bool, AuthFlowError> {
        let passwords = Arc::clone(&self.passwords);
        tokio::task::spawn_blocking(move || passwords.matches(&plaintext, &digest))
            .await
            .map_err(|e| AuthFlowError::Internal(format!("hashing task failed: {e}")))?
            .map_err(Into::into)
    }
}
