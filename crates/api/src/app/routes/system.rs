use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

use crate::context::CurrentUser;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// Echo the authenticated identity, including active role scope if the
/// presented token was role-scoped. Debug aid; makes no store queries.
pub async fn whoami(Extension(user): Extension<CurrentUser>) -> impl IntoResponse {
    Json(serde_json::json!({
        "user_id": user.user_id(),
        "username": user.username(),
        "active_role": user.active_role().map(|(id, name)| serde_json::json!({
            "id": id,
            "name": name,
        })),
    }))
}
