pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::{Arc, Mutex, PoisonError};

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::db::{CachedWordRepository, Database, LearningRepository, MemoryRepository};
use crate::services::notifier::{ActivityLogger, ActivityNotifier};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn LearningRepository>,
    pub notifier: Arc<ActivityNotifier>,
    rng: Arc<Mutex<StdRng>>,
}

impl AppState {
    /// State with the activity logger attached as the only observer.
    pub fn new(repo: Arc<dyn LearningRepository>) -> Self {
        Self::with_rng(repo, StdRng::from_entropy())
    }

    /// Same as [`AppState::new`] with reproducible word picks and shuffles.
    pub fn with_seed(repo: Arc<dyn LearningRepository>, seed: u64) -> Self {
        Self::with_rng(repo, StdRng::seed_from_u64(seed))
    }

    fn with_rng(repo: Arc<dyn LearningRepository>, rng: StdRng) -> Self {
        let mut notifier = ActivityNotifier::new();
        notifier.attach(Arc::new(ActivityLogger::new(repo.clone())));

        Self {
            repo,
            notifier: Arc::new(notifier),
            rng: Arc::new(Mutex::new(rng)),
        }
    }

    /// Random source for one request, derived from the shared generator.
    pub fn request_rng(&self) -> StdRng {
        let mut parent = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        StdRng::seed_from_u64(parent.gen())
    }
}

/// Build the application router
pub fn app(state: AppState) -> Router {
    let protected_routes = Router::new()
        // Word and group routes
        .route("/api/groups", get(routes::groups::list))
        .route("/api/words", get(routes::words::list))
        .route("/api/words/:id", get(routes::words::get))
        // Learning routes
        .route(
            "/api/learning/session",
            post(routes::learning::start_session).delete(routes::learning::end_session),
        )
        .route("/api/learning/question", get(routes::learning::question))
        .route("/api/learning/answer", post(routes::learning::answer))
        .route("/api/learning/repeatable", get(routes::learning::repeatable))
        // Challenge routes
        .route("/api/challenge", get(routes::challenge::today))
        .route("/api/challenge/:id/complete", post(routes::challenge::complete))
        // Report routes
        .route("/api/reports/activity", get(routes::reports::activity))
        .layer(middleware::from_fn(routes::auth::auth_middleware));

    Router::new()
        .route("/health", get(health_check))
        .merge(protected_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.log_level))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let repo: Arc<dyn LearningRepository> = match &config.database_url {
        Some(url) => {
            tracing::info!("Connecting to database...");
            let db = Database::connect(url, config.database_max_connections).await?;

            tracing::info!("Running migrations...");
            db.run_migrations().await?;

            Arc::new(CachedWordRepository::new(db))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory store; data is lost on restart");
            Arc::new(CachedWordRepository::new(MemoryRepository::new()))
        }
    };

    let app = app(AppState::new(repo));

    let addr = config.bind_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
