use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::json;
use uuid::Uuid;

use rolegate_api::app::{build_app, services::AppServices};
use rolegate_auth::{BcryptVerifier, Hs256TokenCodec, PasswordVerifier, TokenCodec};
use rolegate_store::{CredentialStore, InMemoryCredentialStore, UserRecord};

const JWT_SECRET: &str = "test-secret";
const TOKEN_LIFETIME_MINUTES: i64 = 10;

// MIN_COST bcrypt keeps the suite fast; production wiring uses the default.
const TEST_BCRYPT_COST: u32 = 4;

struct TestServer {
    base_url: String,
    store: Arc<InMemoryCredentialStore>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Build the prod router over a fresh in-memory store and bind it to an
    /// ephemeral port.
    async fn spawn() -> Self {
        let store = Arc::new(InMemoryCredentialStore::new());
        let services = Arc::new(AppServices::new(
            Arc::clone(&store) as Arc<dyn CredentialStore>,
            Arc::new(BcryptVerifier::new(TEST_BCRYPT_COST)),
            Arc::new(Hs256TokenCodec::new(JWT_SECRET.as_bytes())),
            Duration::minutes(TOKEN_LIFETIME_MINUTES),
        ));
        let app = build_app(services);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            store,
            handle,
        }
    }

    async fn seed_user(&self, username: &str, password: &str) -> UserRecord {
        let digest = BcryptVerifier::new(TEST_BCRYPT_COST).digest(password).unwrap();
        self.store.create_user(username, &digest).await.unwrap()
    }

    async fn login(&self, client: &reqwest::Client, username: &str, password: &str) -> String {
        let res = client
            .post(format!("{}/auth/login", self.base_url))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body: serde_json::Value = res.json().await.unwrap();
        body["token"].as_str().unwrap().to_string()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn codec() -> Hs256TokenCodec {
    Hs256TokenCodec::new(JWT_SECRET.as_bytes())
}

/// Mint a token outside the codec, the way a hostile or stale client might.
fn mint_raw_token(
    secret: &str,
    sub: Uuid,
    username: &str,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
) -> String {
    let claims = json!({
        "scope": "unscoped",
        "sub": sub,
        "username": username,
        "issued_at": issued_at,
        "expires_at": expires_at,
    });
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("failed to encode jwt")
}

#[tokio::test]
async fn protected_endpoints_require_a_token() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(format!("{}/menus/role/{}", srv.base_url, Uuid::now_v7()))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .bearer_auth("not-a-token")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_mints_an_unscoped_token_and_lists_roles() {
    let srv = TestServer::spawn().await;
    let staff = srv.store.seed_role("staff");
    let user = srv.seed_user("efrino", "evrino123").await;
    srv.store.assign_role(user.id, staff.id).await.unwrap();

    let client = reqwest::Client::new();
    let res = client
        .post(format!("{}/auth/login", srv.base_url))
        .json(&json!({ "username": "efrino", "password": "evrino123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["user"]["username"], "efrino");
    assert_eq!(body["roles"], json!([{ "id": staff.id, "name": "staff" }]));

    let claims = codec()
        .decode(body["token"].as_str().unwrap(), Utc::now())
        .unwrap();
    assert_eq!(claims.identity.username(), "efrino");
    assert_eq!(claims.identity.sub(), user.id);
    assert_eq!(claims.identity.active_role(), None);
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let srv = TestServer::spawn().await;
    srv.seed_user("efrino", "evrino123").await;

    let client = reqwest::Client::new();

    let wrong_password = client
        .post(format!("{}/auth/login", srv.base_url))
        .json(&json!({ "username": "efrino", "password": "wrong" }))
        .send()
        .await
        .unwrap();
    let unknown_user = client
        .post(format!("{}/auth/login", srv.base_url))
        .json(&json!({ "username": "nobody", "password": "evrino123" }))
        .send()
        .await
        .unwrap();

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);

    let a: serde_json::Value = wrong_password.json().await.unwrap();
    let b: serde_json::Value = unknown_user.json().await.unwrap();
    assert_eq!(a, b);
}

#[tokio::test]
async fn register_grants_the_default_role() {
    let srv = TestServer::spawn().await;
    srv.store.seed_role("staff");

    let client = reqwest::Client::new();
    let res = client
        .post(format!("{}/auth/register", srv.base_url))
        .json(&json!({ "username": "newcomer", "password": "s3cret" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["user"]["username"], "newcomer");

    let res = client
        .post(format!("{}/auth/login", srv.base_url))
        .json(&json!({ "username": "newcomer", "password": "s3cret" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["roles"][0]["name"], "staff");
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let srv = TestServer::spawn().await;
    srv.store.seed_role("staff");
    srv.seed_user("efrino", "evrino123").await;

    let client = reqwest::Client::new();
    let res = client
        .post(format!("{}/auth/register", srv.base_url))
        .json(&json!({ "username": "efrino", "password": "whatever" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "username_taken");
}

#[tokio::test]
async fn registration_survives_a_missing_default_role() {
    // No "staff" role seeded: the grant fails, the user still exists.
    let srv = TestServer::spawn().await;

    let client = reqwest::Client::new();
    let res = client
        .post(format!("{}/auth/register", srv.base_url))
        .json(&json!({ "username": "orphan", "password": "s3cret" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client
        .post(format!("{}/auth/login", srv.base_url))
        .json(&json!({ "username": "orphan", "password": "s3cret" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["roles"], json!([]));
}

#[tokio::test]
async fn empty_registration_fields_are_rejected() {
    let srv = TestServer::spawn().await;

    let client = reqwest::Client::new();
    let res = client
        .post(format!("{}/auth/register", srv.base_url))
        .json(&json!({ "username": "  ", "password": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn select_role_requires_ownership() {
    let srv = TestServer::spawn().await;
    let staff = srv.store.seed_role("staff");
    let admin = srv.store.seed_role("admin");
    let user = srv.seed_user("efrino", "evrino123").await;
    srv.store.assign_role(user.id, staff.id).await.unwrap();

    let client = reqwest::Client::new();
    let token = srv.login(&client, "efrino", "evrino123").await;

    // A role the user does not hold, even though it exists.
    let res = client
        .post(format!("{}/auth/select-role", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "role_id": admin.id }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "role_not_owned");
}

#[tokio::test]
async fn select_role_remints_a_scoped_token() {
    let srv = TestServer::spawn().await;
    let staff = srv.store.seed_role("staff");
    let user = srv.seed_user("efrino", "evrino123").await;
    srv.store.assign_role(user.id, staff.id).await.unwrap();

    let client = reqwest::Client::new();
    let token = srv.login(&client, "efrino", "evrino123").await;

    let res = client
        .post(format!("{}/auth/select-role", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "role_id": staff.id }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["selected_role"], json!({ "id": staff.id, "name": "staff" }));

    let scoped = body["token"].as_str().unwrap();
    let claims = codec().decode(scoped, Utc::now()).unwrap();
    assert_eq!(claims.identity.sub(), user.id);
    assert_eq!(claims.identity.active_role(), Some((staff.id, "staff")));

    // Selecting a role restarts the lifetime window from now.
    assert_eq!(
        claims.expires_at - claims.issued_at,
        Duration::minutes(TOKEN_LIFETIME_MINUTES)
    );
    let original = codec().decode(&token, Utc::now()).unwrap();
    assert!(claims.issued_at >= original.issued_at);

    // The scoped token authenticates and reports its scope.
    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .bearer_auth(scoped)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["active_role"]["name"], "staff");
}

#[tokio::test]
async fn select_role_validates_the_request_body() {
    let srv = TestServer::spawn().await;
    let staff = srv.store.seed_role("staff");
    let user = srv.seed_user("efrino", "evrino123").await;
    srv.store.assign_role(user.id, staff.id).await.unwrap();

    let client = reqwest::Client::new();
    let token = srv.login(&client, "efrino", "evrino123").await;

    let res = client
        .post(format!("{}/auth/select-role", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .post(format!("{}/auth/select-role", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "role_id": "not-a-uuid" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn expired_and_foreign_tokens_are_rejected() {
    let srv = TestServer::spawn().await;
    let user = srv.seed_user("efrino", "evrino123").await;

    let client = reqwest::Client::new();

    let expired = mint_raw_token(
        JWT_SECRET,
        *user.id.as_uuid(),
        "efrino",
        Utc::now() - Duration::hours(2),
        Utc::now() - Duration::hours(1),
    );
    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .bearer_auth(expired)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let foreign = mint_raw_token(
        "some-other-secret",
        *user.id.as_uuid(),
        "efrino",
        Utc::now(),
        Utc::now() + Duration::hours(1),
    );
    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .bearer_auth(foreign)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn menus_reflect_role_grants() {
    let srv = TestServer::spawn().await;
    let staff = srv.store.seed_role("staff");
    let manajer = srv.store.seed_role("manajer");
    let user = srv.seed_user("efrino", "evrino123").await;
    srv.store.assign_role(user.id, staff.id).await.unwrap();

    let dashboard = srv.store.seed_menu("Dashboard", "/dashboard", None);
    let reports = srv.store.seed_menu("Reports", "/reports", Some(dashboard.id));
    srv.store.seed_menu_access(staff.id, dashboard.id);
    srv.store.seed_menu_access(staff.id, reports.id);

    let client = reqwest::Client::new();
    let token = srv.login(&client, "efrino", "evrino123").await;

    let res = client
        .get(format!("{}/menus/role/{}", srv.base_url, staff.id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(
        body,
        json!([
            { "id": dashboard.id, "name": "Dashboard", "path": "/dashboard", "parent_id": null },
            { "id": reports.id, "name": "Reports", "path": "/reports", "parent_id": dashboard.id },
        ])
    );

    // A role with zero grants sees an empty list, not an error.
    let res = client
        .get(format!("{}/menus/role/{}", srv.base_url, manajer.id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body, json!([]));
}
