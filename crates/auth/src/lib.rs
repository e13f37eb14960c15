//! `rolegate-auth` — pure authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage.

pub mod authorize;
pub mod claims;
pub mod password;
pub mod roles;
pub mod token;

pub use authorize::{AuthzError, authorize_roles};
pub use claims::{Identity, SessionClaims, TokenValidationError, validate_claims};
pub use password::{BcryptVerifier, PasswordError, PasswordVerifier};
pub use roles::RoleName;
pub use token::{Hs256TokenCodec, TokenCodec, TokenError, default_lifetime};
