use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, header};
use fake::Fake;
use fake::faker::internet::en::SafeEmail;
use gatehouse::router::init_router;
use gatehouse::state::AppState;
use gatehouse_auth::{Role, TokenCodec};
use gatehouse_config::{CorsConfig, JwtConfig};
use gatehouse_core::hash_password_with_cost;
use gatehouse_db::{Account, AccountStore, InMemoryCredentialStore, NewAccount};
use http_body_util::BodyExt;
use serde_json::Value;

pub const TEST_SECRET: &str = "integration-test-secret-0123456789abcdef";
pub const TEST_PASSWORD: &str = "testpass123";

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: Arc<InMemoryCredentialStore>,
}

#[allow(dead_code)]
impl TestApp {
    pub fn codec(&self) -> &TokenCodec {
        &self.state.codec
    }

    /// Stores an account with [`TEST_PASSWORD`] and returns it.
    pub async fn create_user(&self, role: Role) -> Account {
        let password_hash = hash_password_with_cost(TEST_PASSWORD, 4).unwrap();
        self.store
            .create(NewAccount {
                login_name: generate_unique_email(),
                password_hash,
                role,
            })
            .await
            .unwrap()
    }

    /// Stores an account and issues a token for it.
    pub async fn login_as(&self, role: Role) -> (Account, String) {
        let account = self.create_user(role).await;
        let token = self.codec().issue_for(&account.identity).unwrap();
        (account, token.value)
    }
}

pub fn setup_test_app() -> TestApp {
    setup_test_app_with_expiration(3_600_000)
}

pub fn setup_test_app_with_expiration(expiration_millis: i64) -> TestApp {
    let store = Arc::new(InMemoryCredentialStore::new());
    let state = AppState::new(
        store.clone(),
        &JwtConfig::new(TEST_SECRET, expiration_millis),
        CorsConfig::from_origins("http://localhost:3000"),
    )
    .unwrap();

    TestApp {
        router: init_router(state.clone()),
        state,
        store,
    }
}

static EMAIL_COUNTER: AtomicUsize = AtomicUsize::new(0);

#[allow(dead_code)]
pub fn generate_unique_email() -> String {
    let email: String = SafeEmail().fake();
    format!("{}.{}", EMAIL_COUNTER.fetch_add(1, Ordering::SeqCst), email)
}

#[allow(dead_code)]
pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

#[allow(dead_code)]
pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}
