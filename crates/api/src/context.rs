use rolegate_auth::Identity;
use rolegate_core::{RoleId, UserId};

/// Authenticated identity for a request.
///
/// Inserted into request extensions by the auth middleware once the bearer
/// token's signature and expiry have been verified. The active role carried
/// here reflects the token the client presented, not current membership;
/// role-gated operations re-check membership via `authz`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    identity: Identity,
}

impl CurrentUser {
    pub fn new(identity: Identity) -> Self {
        Self { identity }
    }

    pub fn user_id(&self) -> UserId {
        self.identity.sub()
    }

    pub fn username(&self) -> &str {
        self.identity.username()
    }

    pub fn active_role(&self) -> Option<(RoleId, &str)> {
        self.identity.active_role()
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }
}
