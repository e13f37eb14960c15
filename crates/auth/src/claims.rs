use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use rolegate_core::{RoleId, UserId};

/// Identity claims carried by a session token.
///
/// A token is either *unscoped* (the user is authenticated but has not yet
/// committed to a role) or *scoped* to one active role. Modeling this as a
/// tagged variant rather than nullable fields lets downstream authorization
/// code match exhaustively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum Identity {
    Unscoped {
        sub: UserId,
        username: String,
    },
    Scoped {
        sub: UserId,
        username: String,
        role_id: RoleId,
        role_name: String,
    },
}

impl Identity {
    pub fn unscoped(sub: UserId, username: impl Into<String>) -> Self {
        Self::Unscoped {
            sub,
            username: username.into(),
        }
    }

    pub fn sub(&self) -> UserId {
        match self {
            Self::Unscoped { sub, .. } | Self::Scoped { sub, .. } => *sub,
        }
    }

    pub fn username(&self) -> &str {
        match self {
            Self::Unscoped { username, .. } | Self::Scoped { username, .. } => username,
        }
    }

    /// The active role scope, if any.
    pub fn active_role(&self) -> Option<(RoleId, &str)> {
        match self {
            Self::Unscoped { .. } => None,
            Self::Scoped {
                role_id, role_name, ..
            } => Some((*role_id, role_name)),
        }
    }

    /// Derive a scoped identity from this one, preserving the subject.
    ///
    /// Selecting a role from an already-scoped identity replaces the scope.
    pub fn with_role(&self, role_id: RoleId, role_name: impl Into<String>) -> Self {
        Self::Scoped {
            sub: self.sub(),
            username: self.username().to_string(),
            role_id,
            role_name: role_name.into(),
        }
    }
}

/// Session token claims (transport-agnostic).
///
/// This is the claim set a token carries once the codec has verified the
/// signature. The time window lives here, next to the identity, so claim
/// validation stays a pure function of (claims, now).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    #[serde(flatten)]
    pub identity: Identity,

    /// Issued-at timestamp.
    pub issued_at: DateTime<Utc>,

    /// Expiration timestamp.
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,
}

/// Deterministically validate session claims.
///
/// Note: this validates the *claims* only. Signature verification is the
/// codec's job.
pub fn validate_claims(
    claims: &SessionClaims,
    now: DateTime<Utc>,
) -> Result<(), TokenValidationError> {
    if claims.expires_at <= claims.issued_at {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.issued_at {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.expires_at {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}
