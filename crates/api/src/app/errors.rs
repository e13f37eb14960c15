use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use crate::app::services::AuthFlowError;

/// Map a flow error to its HTTP response.
///
/// Client-caused failures carry a safe, non-enumerating message; collaborator
/// failures are logged with detail and answered generically.
pub fn flow_error_to_response(err: AuthFlowError) -> axum::response::Response {
    match err {
        AuthFlowError::InvalidCredentials => json_error(
            StatusCode::UNAUTHORIZED,
            "invalid_credentials",
            "invalid credentials",
        ),
        AuthFlowError::UsernameTaken => json_error(
            StatusCode::BAD_REQUEST,
            "username_taken",
            "username is already taken",
        ),
        AuthFlowError::RoleNotOwned => json_error(
            StatusCode::BAD_REQUEST,
            "role_not_owned",
            "role is invalid or not held by the user",
        ),
        AuthFlowError::Validation(msg) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", msg)
        }
        AuthFlowError::Store(e) => {
            tracing::error!(error = %e, "credential store failure");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "store_error",
                "internal error",
            )
        }
        AuthFlowError::Token(e) => {
            tracing::error!(error = %e, "token codec failure");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "token_error",
                "internal error",
            )
        }
        AuthFlowError::Password(e) => {
            tracing::error!(error = %e, "password verifier failure");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "hash_error",
                "internal error",
            )
        }
        AuthFlowError::Internal(msg) => {
            tracing::error!(error = %msg, "internal failure");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "internal error",
            )
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
