use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use rolegate_core::{MenuId, RoleId, UserId};

/// A stored user account.
///
/// Not `Serialize` on purpose: the password digest must never travel past
/// the service layer. Response shaping picks the public fields explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: UserId,
    pub username: String,
    pub full_name: Option<String>,
    pub password_digest: String,
    pub created_at: DateTime<Utc>,
}

/// A role catalog entry. Immutable reference data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRecord {
    pub id: RoleId,
    pub name: String,
}

/// An addressable entry in the navigable menu hierarchy.
///
/// `parent_id = None` marks a root node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuNode {
    pub id: MenuId,
    pub name: String,
    pub path: String,
    pub parent_id: Option<MenuId>,
}
