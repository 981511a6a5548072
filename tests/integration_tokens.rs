mod common;

use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{
    TEST_PASSWORD, TEST_SECRET, TestApp, body_json, get, post_json, setup_test_app,
    setup_test_app_with_expiration,
};
use gatehouse::router::init_router;
use gatehouse::state::AppState;
use gatehouse_auth::{
    ClaimSet, CredentialStore, CredentialStoreError, Identity, Role, TokenCodec, UserId,
};
use gatehouse_config::{CorsConfig, JwtConfig};
use gatehouse_db::{Account, AccountStore, NewAccount};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde_json::{Value, json};
use tower::ServiceExt;

fn sign(header: Header, claims: &Value, secret: &str) -> String {
    encode(&header, claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
}

fn claims_for(identity: &Identity) -> Value {
    let now = Utc::now();
    json!({
        "sub": identity.login_name,
        "userId": identity.id,
        "roles": [identity.role.authority()],
        "iat": now.timestamp(),
        "exp": (now + Duration::hours(1)).timestamp(),
        "issuedAtMillis": now.timestamp_millis(),
        "expiresAtMillis": (now + Duration::hours(1)).timestamp_millis(),
        "ver": 2
    })
}

async fn status_and_kind(app: &TestApp, token: &str) -> (StatusCode, Value) {
    let response = app
        .router
        .clone()
        .oneshot(get("/api/users/me", Some(token)))
        .await
        .unwrap();
    let status = response.status();
    (status, body_json(response).await["kind"].clone())
}

#[tokio::test]
async fn test_expired_token() {
    let app = setup_test_app();
    let account = app.create_user(Role::Student).await;
    let token = app
        .codec()
        .issue_at(
            &account.identity.login_name,
            ClaimSet::for_identity(&account.identity),
            Duration::hours(1),
            Utc::now() - Duration::hours(2),
        )
        .unwrap();

    let (status, kind) = status_and_kind(&app, token.as_str()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(kind, "token_expired");
}

#[tokio::test]
async fn test_token_signed_with_another_secret() {
    let app = setup_test_app();
    let account = app.create_user(Role::Admin).await;
    let token = sign(
        Header::new(Algorithm::HS256),
        &claims_for(&account.identity),
        "some-other-secret-0123456789abcdef",
    );

    let (status, kind) = status_and_kind(&app, &token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(kind, "token_bad_signature");
}

#[tokio::test]
async fn test_token_with_unexpected_algorithm() {
    let app = setup_test_app();
    let account = app.create_user(Role::Admin).await;
    let token = sign(
        Header::new(Algorithm::HS512),
        &claims_for(&account.identity),
        TEST_SECRET,
    );

    let (status, kind) = status_and_kind(&app, &token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(kind, "token_unsupported_format");
}

#[tokio::test]
async fn test_malformed_token() {
    let app = setup_test_app();

    let (status, kind) = status_and_kind(&app, "garbage").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(kind, "token_malformed");
}

#[tokio::test]
async fn test_token_without_user_id_is_malformed() {
    let app = setup_test_app();
    let account = app.create_user(Role::Student).await;
    let mut claims = claims_for(&account.identity);
    claims.as_object_mut().unwrap().remove("userId");
    let token = sign(Header::new(Algorithm::HS256), &claims, TEST_SECRET);

    let (status, kind) = status_and_kind(&app, &token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(kind, "token_malformed");
}

#[tokio::test]
async fn test_legacy_singular_role_token_is_accepted() {
    let app = setup_test_app();
    let account = app.create_user(Role::Admin).await;
    let now = Utc::now();
    let token = sign(
        Header::new(Algorithm::HS256),
        &json!({
            "sub": account.identity.login_name,
            "userId": account.identity.id,
            "role": "ADMIN",
            "iat": now.timestamp(),
            "exp": (now + Duration::hours(1)).timestamp()
        }),
        TEST_SECRET,
    );

    let response = app
        .router
        .oneshot(get("/api/users", Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_token_for_deleted_account() {
    let app = setup_test_app();
    let (account, token) = app.login_as(Role::Admin).await;
    assert!(app.store.remove(account.identity.id).await);

    let (status, kind) = status_and_kind(&app, &token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(kind, "invalid_token");
}

#[tokio::test]
async fn test_demoted_account_loses_access() {
    let app = setup_test_app();
    let (account, token) = app.login_as(Role::Admin).await;

    let mut demoted = account.identity.clone();
    demoted.role = Role::Student;
    assert!(app.store.replace(demoted).await);

    let (status, kind) = status_and_kind(&app, &token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(kind, "invalid_token");
}

#[tokio::test]
async fn test_token_roles_must_match_stored_role() {
    let app = setup_test_app();
    let account = app.create_user(Role::Student).await;
    let mut claims = claims_for(&account.identity);
    claims["roles"] = json!([Role::Admin.authority()]);
    let token = sign(Header::new(Algorithm::HS256), &claims, TEST_SECRET);

    let (status, kind) = status_and_kind(&app, &token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(kind, "invalid_token");
}

#[tokio::test]
async fn test_unsecured_token_is_unsupported() {
    let app = setup_test_app();
    let account = app.create_user(Role::Admin).await;
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims_for(&account.identity).to_string());
    let token = format!("{}.{}.", header, payload);

    let (status, kind) = status_and_kind(&app, &token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(kind, "token_unsupported_format");
}

#[tokio::test]
async fn test_non_bearer_scheme_is_anonymous() {
    let app = setup_test_app();

    let request = axum::http::Request::builder()
        .uri("/api/users/me")
        .header("authorization", "Basic dXNlcjpwYXNz")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["kind"], "unauthenticated");
}

#[tokio::test]
async fn test_token_lifetime_in_milliseconds() {
    let app = setup_test_app_with_expiration(1000);
    let account = app.create_user(Role::Student).await;

    let login = app
        .router
        .clone()
        .oneshot(post_json(
            "/api/users/login",
            json!({ "username": account.identity.login_name, "password": TEST_PASSWORD }),
        ))
        .await
        .unwrap();
    assert_eq!(login.status(), StatusCode::OK);
    let token = body_json(login).await["token"].as_str().unwrap().to_string();

    let claims = app.codec().decode(&token).unwrap();
    assert_eq!(claims.expires_at_millis() - claims.issued_at_millis(), 1000);

    let (status, _) = status_and_kind(&app, &token).await;
    assert_eq!(status, StatusCode::OK);

    tokio::time::sleep(StdDuration::from_millis(1100)).await;

    let (status, kind) = status_and_kind(&app, &token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(kind, "token_expired");
}

struct FailingStore;

#[async_trait]
impl CredentialStore for FailingStore {
    async fn find_by_login_name(
        &self,
        _login_name: &str,
    ) -> Result<Option<Identity>, CredentialStoreError> {
        Err(CredentialStoreError::Unavailable("connection refused".into()))
    }

    async fn find_by_id(&self, _id: UserId) -> Result<Option<Identity>, CredentialStoreError> {
        Err(CredentialStoreError::Unavailable("connection refused".into()))
    }
}

#[async_trait]
impl AccountStore for FailingStore {
    async fn create(&self, _account: NewAccount) -> Result<Account, CredentialStoreError> {
        Err(CredentialStoreError::Unavailable("connection refused".into()))
    }

    async fn find_account(&self, _id: UserId) -> Result<Option<Account>, CredentialStoreError> {
        Err(CredentialStoreError::Unavailable("connection refused".into()))
    }

    async fn list(&self) -> Result<Vec<Account>, CredentialStoreError> {
        Err(CredentialStoreError::Unavailable("connection refused".into()))
    }

    async fn update_password(
        &self,
        _login_name: &str,
        _password_hash: &str,
    ) -> Result<bool, CredentialStoreError> {
        Err(CredentialStoreError::Unavailable("connection refused".into()))
    }
}

#[tokio::test]
async fn test_store_outage() {
    let config = JwtConfig::new(TEST_SECRET, 3_600_000);
    let state = AppState::new(
        Arc::new(FailingStore),
        &config,
        CorsConfig::from_origins("http://localhost:3000"),
    )
    .unwrap();
    let router = init_router(state);

    let identity = Identity::new(1, "admin@test.com", "hash", Role::Admin);
    let token = TokenCodec::new(&config)
        .unwrap()
        .issue_for(&identity)
        .unwrap();

    let me = router
        .clone()
        .oneshot(get("/api/users/me", Some(token.as_str())))
        .await
        .unwrap();
    assert_eq!(me.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(me).await["kind"], "invalid_token");

    let login = router
        .oneshot(post_json(
            "/api/users/login",
            json!({ "username": "admin@test.com", "password": "password123" }),
        ))
        .await
        .unwrap();
    assert_eq!(login.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
