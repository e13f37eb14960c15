//! Authentication routes: login, registration, and role selection.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};

use rolegate_core::RoleId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::CurrentUser;

/// Routes that accept raw credentials.
pub fn public_router() -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
}

/// Routes that require an authenticated identity.
pub fn protected_router() -> Router {
    Router::new().route("/select-role", post(select_role))
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::LoginRequest>,
) -> axum::response::Response {
    match services.login(&body.username, &body.password).await {
        Ok(outcome) => (StatusCode::OK, Json(dto::login_to_json(&outcome))).into_response(),
        Err(e) => errors::flow_error_to_response(e),
    }
}

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::RegisterRequest>,
) -> axum::response::Response {
    match services.register(&body.username, &body.password).await {
        Ok(user) => (StatusCode::CREATED, Json(dto::registered_to_json(&user))).into_response(),
        Err(e) => errors::flow_error_to_response(e),
    }
}

pub async fn select_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
    Json(body): Json<dto::SelectRoleRequest>,
) -> axum::response::Response {
    let Some(role_id) = body.role_id else {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "role_id is required",
        );
    };

    let role_id: RoleId = match role_id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid role id");
        }
    };

    match services.select_role(&user, role_id).await {
        Ok(selected) => (
            StatusCode::OK,
            Json(dto::selected_role_to_json(&selected)),
        )
            .into_response(),
        Err(e) => errors::flow_error_to_response(e),
    }
}
