//! Role layer of the authorization guard.
//!
//! This layer always re-queries the subject's current role assignments. The
//! token's embedded scope is never an authorization input: membership can
//! change after a token is minted and there is no revocation mechanism, so
//! the embedded role is display state only.

use axum::http::StatusCode;
use axum::response::Response;

use rolegate_auth::{RoleName, authorize_roles, roles};
use rolegate_store::CredentialStore;

use crate::app::errors;
use crate::context::CurrentUser;

/// Operations restricted to administrators.
pub const ADMIN_ONLY: &[RoleName] = &[roles::ADMIN];

/// Operations restricted to managers.
pub const MANAJER_ONLY: &[RoleName] = &[roles::MANAJER];

/// Operations for regular members (either catalog spelling).
pub const STAFF_OR_USER: &[RoleName] = &[roles::USER, roles::STAFF];

/// Check that the subject currently holds at least one of `allowed`.
///
/// Forbidden responses name the required roles; store failures are logged
/// with detail and surfaced generically.
pub async fn require_any_of(
    store: &dyn CredentialStore,
    user: &CurrentUser,
    allowed: &[RoleName],
) -> Result<(), Response> {
    let held = store
        .list_roles_for_user(user.user_id())
        .await
        .map_err(|e| {
            tracing::error!(
                error = %e,
                user_id = %user.user_id(),
                "role lookup failed during authorization"
            );
            errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "store_error",
                "authorization check failed",
            )
        })?;

    let held: Vec<RoleName> = held.into_iter().map(|r| RoleName::new(r.name)).collect();

    authorize_roles(&held, allowed)
        .map_err(|e| errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string()))
}
