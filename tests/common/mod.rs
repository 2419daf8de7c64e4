//! Common test utilities

// Each test binary uses a different subset of these helpers
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, Response, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};
use synapse_checkout::api::{self, AppState, CheckoutRequest};
use synapse_checkout::domain::BcryptHasher;
use synapse_checkout::notify::{Notifier, NotifyError, WelcomeMessage};
use synapse_checkout::store::InMemoryDirectoryStore;
use synapse_checkout::{NotifyMode, SignupHandler, SignupSettings};

/// Records every welcome message; optionally fails each delivery
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<WelcomeMessage>>,
    pub attempts: AtomicUsize,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<WelcomeMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn channel(&self) -> &'static str {
        "recording"
    }

    async fn send_welcome(&self, message: &WelcomeMessage) -> Result<(), NotifyError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(NotifyError::Email(
                "SMTP 535 authentication failed".to_string(),
            ));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryDirectoryStore>,
    pub notifier: Arc<RecordingNotifier>,
}

/// Router over an empty in-memory directory, awaiting notifications
pub fn setup_app(notifier: RecordingNotifier) -> TestApp {
    let store = Arc::new(InMemoryDirectoryStore::new());
    let notifier = Arc::new(notifier);

    let handler = SignupHandler::new(
        store.clone(),
        Arc::new(BcryptHasher::new(4)),
        notifier.clone(),
        SignupSettings {
            notify_mode: NotifyMode::Await,
            ..SignupSettings::default()
        },
    );

    TestApp {
        router: api::app(AppState::new(handler), None),
        store,
        notifier,
    }
}

pub fn checkout_payload() -> CheckoutRequest {
    CheckoutRequest {
        nome: "Ana".to_string(),
        email: "ana@x.com".to_string(),
        cpf_cnpj: "123".to_string(),
        whatsapp: "11999999999".to_string(),
        empresa: "Lab1".to_string(),
        senha: "secret1".to_string(),
        plano: "pro".to_string(),
        metodo: "card".to_string(),
    }
}

pub fn checkout_request(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/checkout")
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap()
}

pub fn json_request(payload: &CheckoutRequest) -> Request<Body> {
    checkout_request(serde_json::to_string(payload).unwrap())
}

/// Split a response into its status and JSON body
pub async fn read_json(response: Response<Body>) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

const SCHEMA: &str = include_str!("../../migrations/0001_signup_directory.sql");

/// Setup test database - connect and make sure the directory schema exists
///
/// Returns `None` when `DATABASE_URL` is not set so the suite still runs without
/// a database. Tests use fresh organization names instead of truncating, since
/// they share the tables while running in parallel.
pub async fn setup_test_db() -> Option<PgPool> {
    dotenvy::dotenv().ok();
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping Postgres directory test");
        return None;
    };

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
        .expect("Failed to connect to DB");

    // Serialize schema creation across concurrently starting tests
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    sqlx::query("SELECT pg_advisory_lock(7341)")
        .execute(&mut *conn)
        .await
        .expect("Failed to take schema lock");
    // Plain string, so the statements go out as one simple query
    (&mut *conn)
        .execute(SCHEMA)
        .await
        .expect("Failed to apply schema");
    sqlx::query("SELECT pg_advisory_unlock(7341)")
        .execute(&mut *conn)
        .await
        .expect("Failed to release schema lock");
    drop(conn);

    Some(pool)
}

/// Organization name no other test run will use
pub fn unique_company(prefix: &str) -> String {
    format!("{} {}", prefix, uuid::Uuid::new_v4())
}
