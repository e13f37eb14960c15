use std::collections::HashSet;

use thiserror::Error;

use crate::roles::RoleName;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("access denied: role must be one of: {0}")]
    Forbidden(String),
}

/// Authorize a subject's current role set against a required set.
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
///
/// Succeeds when the intersection of `held` and `required` is non-empty.
/// An empty `required` set denies: operations that need no role simply do
/// not invoke this check.
pub fn authorize_roles(held: &[RoleName], required: &[RoleName]) -> Result<(), AuthzError> {
    let names: HashSet<&str> = held.iter().map(|r| r.as_str()).collect();

    if required.iter().any(|r| names.contains(r.as_str())) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(
            required
                .iter()
                .map(|r| r.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        ))
    }
}
