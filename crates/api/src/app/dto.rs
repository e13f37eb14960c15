use serde::Deserialize;
use serde_json::json;

use rolegate_store::UserRecord;

use crate::app::services::{LoginOutcome, SelectedRole};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SelectRoleRequest {
    // Optional so a missing field yields a 400 with a message rather than a
    // deserialization failure.
    pub role_id: Option<String>,
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn login_to_json(outcome: &LoginOutcome) -> serde_json::Value {
    json!({
        "token": outcome.token,
        "user": {
            "id": outcome.user.id,
            "username": outcome.user.username,
            "full_name": outcome.user.full_name,
        },
        "roles": outcome.roles.iter().map(|r| json!({
            "id": r.id,
            "name": r.name,
        })).collect::<Vec<_>>(),
    })
}

pub fn registered_to_json(user: &UserRecord) -> serde_json::Value {
    json!({
        "message": "registration successful",
        "user": {
            "id": user.id,
            "username": user.username,
            "created_at": user.created_at,
        },
    })
}

pub fn selected_role_to_json(selected: &SelectedRole) -> serde_json::Value {
    json!({
        "token": selected.token,
        "selected_role": {
            "id": selected.role.id,
            "name": selected.role.name,
        },
    })
}
