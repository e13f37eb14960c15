//! Menu access resolution routes.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use rolegate_core::RoleId;

use crate::app::errors;
use crate::app::services::{AppServices, AuthFlowError};
use crate::context::CurrentUser;

pub fn router() -> Router {
    Router::new().route("/role/:role_id", get(menus_for_role))
}

/// GET /menus/role/:role_id returns the menu nodes the role may see.
///
/// An empty grant set is a valid, empty response.
pub async fn menus_for_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(_user): Extension<CurrentUser>,
    Path(role_id): Path<String>,
) -> axum::response::Response {
    let role_id: RoleId = match role_id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid role id");
        }
    };

    match services.menus_for_role(role_id).await {
        Ok(nodes) => (StatusCode::OK, Json(nodes)).into_response(),
        Err(AuthFlowError::Store(e)) => {
            tracing::error!(error = %e, role_id = %role_id, "menu lookup failed");
            errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "store_error",
                "failed to retrieve menus",
            )
        }
        Err(e) => errors::flow_error_to_response(e),
    }
}
