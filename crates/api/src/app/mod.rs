//! HTTP API application wiring (Axum router + service wiring).
//!
//! Layout:
//! - `services.rs`: collaborator wiring and the credential flows
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs` and tests).
pub fn build_app(services: Arc<AppServices>) -> Router {
    let auth_state = middleware::AuthState {
        tokens: services.tokens(),
    };

    // Protected routes: bearer token required.
    let protected = Router::new()
        .route("/whoami", get(routes::system::whoami))
        .nest("/auth", routes::auth::protected_router())
        .nest("/menus", routes::menus::router())
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/auth", routes::auth::public_router())
        .merge(protected)
        .layer(Extension(services))
}
