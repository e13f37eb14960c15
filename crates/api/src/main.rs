use std::sync::Arc;

use rolegate_api::app::{self, services::AppServices};
use rolegate_store::{CredentialStore, InMemoryCredentialStore, PostgresCredentialStore};

#[tokio::main]
async fn main() {
    rolegate_observability::init();

    let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
        tracing::warn!("JWT_SECRET not set; using insecure dev default");
        "dev-secret".to_string()
    });

    let store: Arc<dyn CredentialStore> = match std::env::var("DATABASE_URL") {
        Ok(url) => {
            let pool = sqlx::postgres::PgPoolOptions::new()
                .connect(&url)
                .await
                .expect("failed to connect to DATABASE_URL");
            Arc::new(PostgresCredentialStore::new(pool))
        }
        Err(_) => {
            tracing::warn!("DATABASE_URL not set; using in-memory dev store");
            let store = InMemoryCredentialStore::new();
            for name in ["admin", "manajer", "staff", "user"] {
                store.seed_role(name);
            }
            Arc::new(store)
        }
    };

    let services = Arc::new(AppServices::with_defaults(store, &jwt_secret));
    let app = app::build_app(services);

    let bind = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {bind}: {e}"));

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
