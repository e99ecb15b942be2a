//! HTTP API for the terminal UI.
//!
//! Each submitted line of interactive input is a fresh request carrying
//! the accumulated stdin; there is no streaming protocol. The pipeline is
//! blocking, so handlers move it onto the blocking thread pool.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::{
    Ecosystem, ExecutionOutcome, OutcomeStatus, ProjectCatalog, ProjectMetadata,
    ReferenceOverrides, SourceKind,
};
use crate::error::ExecuteError;
use crate::ops::Orchestrator;

/// Configuration for the HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind_addr: SocketAddr,
    /// Enable permissive CORS
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            enable_cors: true,
        }
    }
}

impl ServerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bind address.
    pub fn with_bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Parse and set the bind address from a string.
    pub fn with_bind_addr_str(mut self, addr: &str) -> Result<Self> {
        self.bind_addr = addr
            .parse()
            .with_context(|| format!("invalid bind address `{}`", addr))?;
        Ok(self)
    }

    /// Enable or disable CORS.
    pub fn with_cors(mut self, enable: bool) -> Self {
        self.enable_cors = enable;
        self
    }
}

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub catalog: Arc<ProjectCatalog>,
}

/// Body of the execute endpoints.
///
/// The older field names used by the site's terminal are accepted too.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteRequest {
    pub project_id: String,
    #[serde(default, alias = "sourceLocation")]
    pub source_kind: Option<SourceKind>,
    #[serde(default, rename = "remoteURL", alias = "remoteUrl", alias = "repoUrl")]
    pub remote_url: Option<String>,
    #[serde(default, alias = "mainClass", alias = "mainFile")]
    pub entry_point: Option<String>,
    #[serde(default, alias = "input")]
    pub stdin: Option<String>,
}

/// Successful execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteResponse {
    pub output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    pub status: String,
}

impl From<ExecutionOutcome> for ExecuteResponse {
    fn from(outcome: ExecutionOutcome) -> Self {
        ExecuteResponse {
            output: outcome.output().to_string(),
            exit_code: outcome.exit_code(),
            status: outcome.status().as_str().to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProjectsQuery {
    ecosystem: Option<Ecosystem>,
}

/// An [`ExecuteError`] rendered as `{ "error": ... }`.
#[derive(Debug)]
pub struct ApiError(pub ExecuteError);

impl From<ExecuteError> for ApiError {
    fn from(err: ExecuteError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = Json(json!({
            "error": self.0.to_string(),
            "type": self.0.error_type(),
        }));
        (status, body).into_response()
    }
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn projects_handler(
    State(state): State<AppState>,
    Query(query): Query<ProjectsQuery>,
) -> Json<Vec<ProjectMetadata>> {
    let projects = match query.ecosystem {
        Some(ecosystem) => state.catalog.by_ecosystem(ecosystem).cloned().collect(),
        None => state.catalog.all().to_vec(),
    };
    Json(projects)
}

async fn execute_java_handler(
    state: State<AppState>,
    body: std::result::Result<Json<ExecuteRequest>, JsonRejection>,
) -> std::result::Result<Json<ExecuteResponse>, ApiError> {
    execute(state, Ecosystem::Java, body).await
}

async fn execute_python_handler(
    state: State<AppState>,
    body: std::result::Result<Json<ExecuteRequest>, JsonRejection>,
) -> std::result::Result<Json<ExecuteResponse>, ApiError> {
    execute(state, Ecosystem::Python, body).await
}

async fn execute(
    State(state): State<AppState>,
    ecosystem: Ecosystem,
    body: std::result::Result<Json<ExecuteRequest>, JsonRejection>,
) -> std::result::Result<Json<ExecuteResponse>, ApiError> {
    let Json(request) = body.map_err(|e| ExecuteError::invalid_request(e.body_text()))?;
    tracing::info!("Execute request for {} project {}", ecosystem, request.project_id);

    let overrides = ReferenceOverrides {
        source: request.source_kind,
        remote_url: request.remote_url,
        entry_point: request.entry_point,
    };
    let reference = state
        .catalog
        .reference(ecosystem, &request.project_id, overrides)?;

    let orchestrator = state.orchestrator.clone();
    let stdin = request.stdin;
    let outcome = tokio::task::spawn_blocking(move || {
        orchestrator.execute(&reference, stdin.as_deref())
    })
    .await
    .map_err(|e| ExecuteError::Other(anyhow::anyhow!("execution task failed: {}", e)))??;

    if outcome.status() == OutcomeStatus::TimedOutWithOutput {
        tracing::debug!("Returning partial output of a still-running program");
    }
    Ok(Json(outcome.into()))
}

/// The runway HTTP server.
pub struct RunwayServer {
    state: AppState,
    config: ServerConfig,
}

impl RunwayServer {
    /// Create a server around an orchestrator and a catalog.
    pub fn new(orchestrator: Orchestrator, catalog: ProjectCatalog) -> Self {
        RunwayServer {
            state: AppState {
                orchestrator: Arc::new(orchestrator),
                catalog: Arc::new(catalog),
            },
            config: ServerConfig::default(),
        }
    }

    /// Set the server configuration.
    pub fn with_config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build the router with all routes and middleware.
    pub fn build_router(&self) -> Router {
        let mut router = Router::new()
            .route("/health", get(health_handler))
            .route("/api/projects", get(projects_handler))
            .route("/api/execute/java", post(execute_java_handler))
            .route("/api/execute/python", post(execute_python_handler))
            .with_state(self.state.clone())
            .layer(TraceLayer::new_for_http());

        if self.config.enable_cors {
            router = router.layer(CorsLayer::permissive());
        }

        router
    }

    /// Start the server and listen for connections.
    pub async fn serve(self) -> Result<()> {
        self.serve_with_shutdown(std::future::pending()).await
    }

    /// Start the server, stopping when `shutdown_signal` resolves.
    pub async fn serve_with_shutdown<F>(self, shutdown_signal: F) -> Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let router = self.build_router();
        let listener = TcpListener::bind(self.config.bind_addr)
            .await
            .with_context(|| format!("failed to bind to {}", self.config.bind_addr))?;

        tracing::info!("runway server listening on {}", self.config.bind_addr);
        tracing::info!("Health check: http://{}/health", self.config.bind_addr);

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal)
            .await
            .context("server error")?;

        Ok(())
    }
}
