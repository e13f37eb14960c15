//! Session token codec.
//!
//! Encodes and decodes the signed claim bundle that stands in for a server
//! side session. The signing secret is process-wide configuration injected at
//! construction; rotating it invalidates every outstanding token, which is
//! the only revocation mechanism this system has.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use crate::claims::{Identity, SessionClaims, TokenValidationError, validate_claims};

/// Default token lifetime: one day.
pub fn default_lifetime() -> Duration {
    Duration::days(1)
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("failed to encode token")]
    Encode(#[source] jsonwebtoken::errors::Error),

    /// Malformed input or signature mismatch. Deliberately carries no detail;
    /// callers must not be able to distinguish the two.
    #[error("invalid token")]
    Invalid,

    #[error(transparent)]
    Validation(#[from] TokenValidationError),
}

/// Mints and verifies session tokens.
pub trait TokenCodec: Send + Sync {
    /// Produce a signed token embedding `identity` with a time window of
    /// `[now, now + lifetime)`.
    fn encode(
        &self,
        identity: Identity,
        now: DateTime<Utc>,
        lifetime: Duration,
    ) -> Result<String, TokenError>;

    /// Verify signature and time window, returning the embedded claims.
    fn decode(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenError>;

    /// Decode **without** verifying signature or expiry.
    ///
    /// For non-trust-sensitive introspection only. MUST NOT be used for
    /// authorization decisions.
    fn peek(&self, token: &str) -> Result<SessionClaims, TokenError>;
}

/// HS256 codec backed by `jsonwebtoken`.
///
/// Built-in `exp` validation is disabled: the claim window is checked by
/// [`validate_claims`] under an injected clock, with no leeway, so expiry
/// behaves deterministically at the boundary.
pub struct Hs256TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    header: Header,
    validation: Validation,
}

impl Hs256TokenCodec {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            header: Header::new(Algorithm::HS256),
            validation: claims_only_validation(false),
        }
    }
}

fn claims_only_validation(skip_signature: bool) -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.required_spec_claims.clear();
    if skip_signature {
        validation.insecure_disable_signature_validation();
    }
    validation
}

impl TokenCodec for Hs256TokenCodec {
    fn encode(
        &self,
        identity: Identity,
        now: DateTime<Utc>,
        lifetime: Duration,
    ) -> Result<String, TokenError> {
        let claims = SessionClaims {
            identity,
            issued_at: now,
            expires_at: now + lifetime,
        };
        jsonwebtoken::encode(&self.header, &claims, &self.encoding).map_err(TokenError::Encode)
    }

    fn decode(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenError> {
        let data = jsonwebtoken::decode::<SessionClaims>(token, &self.decoding, &self.validation)
            .map_err(|_| TokenError::Invalid)?;
        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }

    fn peek(&self, token: &str) -> Result<SessionClaims, TokenError> {
        // Signature intentionally unverified; an all-zero key suffices.
        let data = jsonwebtoken::decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(&[]),
            &claims_only_validation(true),
        )
        .map_err(|_| TokenError::Invalid)?;
        Ok(data.claims)
    }
}
