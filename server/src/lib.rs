//! HTTP boundary of assay.
//!
//! | method | path | |
//! |---|---|---|
//! | GET  | `/api/health` | liveness |
//! | GET  | `/api/problems` | every problem |
//! | GET  | `/api/problems/{id}` | one problem, or 404 |
//! | POST | `/api/evaluate` | compile, test and review a submission |

pub mod error;
mod routes;

use std::sync::Arc;

use anyhow::Context as _;
use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use assay_core::{BuiltinCatalog, Config, Evaluator, ProblemCatalog};

pub use error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub evaluator: Arc<Evaluator>,
    pub catalog: Arc<dyn ProblemCatalog>,
}

impl AppState {
    pub fn new(evaluator: Evaluator, catalog: impl ProblemCatalog + 'static) -> Self {
        Self {
            evaluator: Arc::new(evaluator),
            catalog: Arc::new(catalog),
        }
    }

    /// The built-in catalog plus an evaluator for `config`.
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let catalog = BuiltinCatalog::load().context("Failed to load the problem catalog")?;
        let evaluator = Evaluator::new(config)?;
        Ok(Self::new(evaluator, catalog))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(routes::health))
        .route("/api/problems", get(routes::list_problems))
        .route("/api/problems/{id}", get(routes::get_problem))
        .route("/api/evaluate", post(routes::evaluate))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

pub async fn serve(config: Config) -> anyhow::Result<()> {
    let addr = config.server.bind_addr;
    let state = AppState::from_config(config)?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    serve_with(listener, state).await
}

pub async fn serve_with(listener: TcpListener, state: AppState) -> anyhow::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        log::info!("assay server listening on http://{}", addr);
        log::info!("Problems: http://{}/api/problems", addr);
    }
    axum::serve(listener, router(state))
        .await
        .context("Server terminated unexpectedly")
}
