//! Common test utilities and fixtures for integration tests.
//!
//! This module provides shared test infrastructure including:
//! - TestContext backed by the in-memory store (no external services)
//! - PgTestContext backed by PostgreSQL
//! - Authentication helpers
//!
//! # Requirements
//! PgTestContext needs a PostgreSQL database (set DATABASE_URL env var);
//! tests using it are marked `#[ignore = "requires database"]`.

#![allow(dead_code)]

pub mod fixtures;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::http::HeaderValue;
use axum::Router;
use axum_test::TestServer;

use vocab_trainer_backend::db::{Database, MemoryRepository};
use vocab_trainer_backend::{app, AppState};

const SEED: u64 = 7;

/// Test context over a fresh in-memory store.
pub struct TestContext {
    pub repo: Arc<MemoryRepository>,
    app: Router,
}

impl TestContext {
    pub fn new() -> Self {
        let repo = Arc::new(MemoryRepository::with_seed(SEED));
        let state = AppState::with_seed(repo.clone(), SEED);

        Self {
            repo,
            app: app(state),
        }
    }

    /// Get the router for use with axum-test.
    pub fn router(&self) -> Router {
        self.app.clone()
    }

    pub fn server(&self) -> TestServer {
        TestServer::new(self.router()).unwrap()
    }
}

/// Test context over PostgreSQL.
///
/// # Panics
/// Panics if DATABASE_URL is not set or database connection fails.
pub struct PgTestContext {
    pub db: Arc<Database>,
    app: Router,
}

impl PgTestContext {
    pub async fn new() -> Self {
        dotenvy::dotenv().ok();

        let database_url =
            std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for integration tests");

        let db = Database::connect(&database_url, 5)
            .await
            .expect("Failed to connect to test database");

        db.run_migrations()
            .await
            .expect("Failed to run migrations");

        let db = Arc::new(db);
        let state = AppState::with_seed(db.clone(), SEED);

        Self {
            db,
            app: app(state),
        }
    }

    pub fn server(&self) -> TestServer {
        TestServer::new(self.app.clone()).unwrap()
    }

    /// Create a language with a unique name and return its id.
    pub async fn create_language(&self) -> i64 {
        self.db
            .insert_language(&unique_name("lang"))
            .await
            .expect("Failed to create language")
    }

    /// Remove everything a test user created, plus the language.
    pub async fn cleanup(&self, user_id: &str, language_id: i64) {
        let _ = sqlx::query("DELETE FROM learning_sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(self.db.pool())
            .await;

        let _ = sqlx::query("DELETE FROM activity_logs WHERE user_id = $1")
            .bind(user_id)
            .execute(self.db.pool())
            .await;

        // Words, groups and challenges cascade from the language
        let _ = sqlx::query("DELETE FROM languages WHERE id = $1")
            .bind(language_id)
            .execute(self.db.pool())
            .await;
    }
}

/// Authorization header value for a user subject.
pub fn bearer(user_id: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {}", user_id)).unwrap()
}

/// Name that does not collide across test runs against a shared database.
pub fn unique_name(prefix: &str) -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{}-{}-{}", prefix, nanos, COUNTER.fetch_add(1, Ordering::Relaxed))
}
