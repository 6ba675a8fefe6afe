//! Router assembly and the HTTP server.

use std::sync::Arc;

use axum::{
    http::{HeaderValue, Method},
    routing::{get, post, MethodRouter},
    Json, Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::prompt::RelayTask;
use super::types::HealthResponse;
use crate::config::{Config, Credentials};
use crate::llm::{self, LlmClient};

/// Shared state for every relay handler.
pub struct AppState {
    pub config: Config,
    pub llm: Arc<dyn LlmClient>,
    pub credentials: Credentials,
}

impl AppState {
    /// State backed by the configured provider and its key variable.
    pub fn from_config(config: Config) -> Result<Self, reqwest::Error> {
        let llm = llm::build_client(&config.llm)?;
        let credentials = Credentials::Env(config.llm.api_key_env.clone());
        Ok(Self {
            config,
            llm,
            credentials,
        })
    }
}

fn task_route(task: RelayTask) -> MethodRouter<Arc<AppState>> {
    let route = match task {
        RelayTask::Suggest => post(handlers::suggest),
        RelayTask::Scholar => post(handlers::scholar),
        RelayTask::Literature => post(handlers::literature),
        RelayTask::PreProposal => post(handlers::pre_proposal),
        RelayTask::Summarize => post(handlers::summarize),
        RelayTask::Evaluate => post(handlers::evaluate),
        RelayTask::TranslateTopic => post(handlers::translate_topic),
        RelayTask::GeneralTranslate => post(handlers::general_translate),
        RelayTask::ChatBot => post(handlers::chat_bot),
    };
    route.fallback(handlers::method_not_allowed)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    if origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(parsed)
}

/// Build the relay router: one POST route per task plus `/health`.
pub fn build_router(state: Arc<AppState>) -> Router {
    let router = RelayTask::ALL
        .iter()
        .fold(Router::new(), |router, task| {
            router.route(task.path(), task_route(*task))
        })
        .route("/health", get(health));

    router
        .layer(cors_layer(&state.config.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind the configured address and serve until Ctrl-C.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let state = Arc::new(AppState::from_config(config)?);

    if state.credentials.api_key().is_none() {
        tracing::warn!(
            env = %state.config.llm.api_key_env,
            "Provider API key is not set; relay calls will fail with 500"
        );
    }

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, version = env!("CARGO_PKG_VERSION"), "Relay listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Ctrl-C received; shutting down");
        })
        .await?;

    Ok(())
}
