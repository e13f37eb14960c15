use async_trait::async_trait;

use rolegate_core::{RoleId, UserId};

use crate::error::StoreError;
use crate::records::{MenuNode, RoleRecord, UserRecord};

/// Narrow interface to the durable credential store.
///
/// Implementations must enforce username uniqueness themselves (two
/// concurrent registrations race here; the loser gets
/// [`StoreError::UniqueViolation`]). This trait does not serialize callers.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Exact-match lookup by username.
    async fn find_user_by_username(&self, username: &str)
    -> Result<Option<UserRecord>, StoreError>;

    async fn create_user(
        &self,
        username: &str,
        password_digest: &str,
    ) -> Result<UserRecord, StoreError>;

    async fn find_role_by_name(&self, name: &str) -> Result<Option<RoleRecord>, StoreError>;

    async fn find_role_by_id(&self, role_id: RoleId) -> Result<Option<RoleRecord>, StoreError>;

    async fn assign_role(&self, user_id: UserId, role_id: RoleId) -> Result<(), StoreError>;

    /// All roles currently assigned to the user.
    async fn list_roles_for_user(&self, user_id: UserId) -> Result<Vec<RoleRecord>, StoreError>;

    async fn has_role_assignment(
        &self,
        user_id: UserId,
        role_id: RoleId,
    ) -> Result<bool, StoreError>;

    /// Menu nodes the role has been granted. An empty result is a valid
    /// answer, not an error.
    async fn list_menu_nodes_for_role(&self, role_id: RoleId)
    -> Result<Vec<MenuNode>, StoreError>;
}
