use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use rolegate_core::{MenuId, RoleId, UserId};

use crate::credential::CredentialStore;
use crate::error::StoreError;
use crate::records::{MenuNode, RoleRecord, UserRecord};

#[derive(Debug, Default)]
struct State {
    users: HashMap<UserId, UserRecord>,
    usernames: HashMap<String, UserId>,
    roles: HashMap<RoleId, RoleRecord>,
    assignments: HashSet<(UserId, RoleId)>,
    menus: HashMap<MenuId, MenuNode>,
    menu_access: HashSet<(RoleId, MenuId)>,
}

/// In-memory credential store.
///
/// Intended for tests/dev. Enforces the same username-uniqueness constraint
/// a relational store would, so registration races behave identically.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    state: RwLock<State>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, State>, StoreError> {
        self.state
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, State>, StoreError> {
        self.state
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Seeding (dev/tests)
    // ─────────────────────────────────────────────────────────────────────

    pub fn seed_role(&self, name: &str) -> RoleRecord {
        let role = RoleRecord {
            id: RoleId::new(),
            name: name.to_string(),
        };
        self.state
            .write()
            .expect("seeding before the store is shared")
            .roles
            .insert(role.id, role.clone());
        role
    }

    pub fn seed_menu(&self, name: &str, path: &str, parent_id: Option<MenuId>) -> MenuNode {
        let node = MenuNode {
            id: MenuId::new(),
            name: name.to_string(),
            path: path.to_string(),
            parent_id,
        };
        self.state
            .write()
            .expect("seeding before the store is shared")
            .menus
            .insert(node.id, node.clone());
        node
    }

    pub fn seed_menu_access(&self, role_id: RoleId, menu_id: MenuId) {
        self.state
            .write()
            .expect("seeding before the store is shared")
            .menu_access
            .insert((role_id, menu_id));
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserRecord>, StoreError> {
        let state = self.read()?;
        Ok(state
            .usernames
            .get(username)
            .and_then(|id| state.users.get(id))
            .cloned())
    }

    async fn create_user(
        &self,
        username: &str,
        password_digest: &str,
    ) -> Result<UserRecord, StoreError> {
        let mut state = self.write()?;

        if state.usernames.contains_key(username) {
            return Err(StoreError::UniqueViolation("users.username".to_string()));
        }

        let user = UserRecord {
            id: UserId::new(),
            username: username.to_string(),
            full_name: None,
            password_digest: password_digest.to_string(),
            created_at: Utc::now(),
        };
        state.usernames.insert(user.username.clone(), user.id);
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_role_by_name(&self, name: &str) -> Result<Option<RoleRecord>, StoreError> {
        let state = self.read()?;
        Ok(state.roles.values().find(|r| r.name == name).cloned())
    }

    async fn find_role_by_id(&self, role_id: RoleId) -> Result<Option<RoleRecord>, StoreError> {
        let state = self.read()?;
        Ok(state.roles.get(&role_id).cloned())
    }

    async fn assign_role(&self, user_id: UserId, role_id: RoleId) -> Result<(), StoreError> {
        let mut state = self.write()?;

        if !state.users.contains_key(&user_id) || !state.roles.contains_key(&role_id) {
            return Err(StoreError::Query(
                "foreign key violation: user_roles".to_string(),
            ));
        }
        state.assignments.insert((user_id, role_id));
        Ok(())
    }

    async fn list_roles_for_user(&self, user_id: UserId) -> Result<Vec<RoleRecord>, StoreError> {
        let state = self.read()?;
        let mut roles: Vec<RoleRecord> = state
            .assignments
            .iter()
            .filter(|(uid, _)| *uid == user_id)
            .filter_map(|(_, rid)| state.roles.get(rid))
            .cloned()
            .collect();
        roles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(roles)
    }

    async fn has_role_assignment(
        &self,
        user_id: UserId,
        role_id: RoleId,
    ) -> Result<bool, StoreError> {
        let state = self.read()?;
        Ok(state.assignments.contains(&(user_id, role_id)))
    }

    async fn list_menu_nodes_for_role(
        &self,
        role_id: RoleId,
    ) -> Result<Vec<MenuNode>, StoreError> {
        let state = self.read()?;
        let mut nodes: Vec<MenuNode> = state
            .menu_access
            .iter()
            .filter(|(rid, _)| *rid == role_id)
            .filter_map(|(_, mid)| state.menus.get(mid))
            .cloned()
            .collect();
        nodes.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(nodes)
    }
}
