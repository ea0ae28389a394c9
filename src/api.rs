use std::sync::Arc;

use anyhow::{Error, Result};
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::{
    clients::{health::HealthChecker, links::SiteLinks, rules::RuleRepository},
    config::Config,
    messages::user_messages,
    models::{
        document::DocumentEvent,
        health::HealthStatus,
        response::{ApiResponse, EventReport},
    },
    notifier::Notifier,
};

pub struct AppState {
    config: Config,
    notifier: Notifier,
    health_checker: HealthChecker,
}

impl AppState {
    pub fn new(config: Config, repository: Arc<dyn RuleRepository>) -> Self {
        let links = Arc::new(SiteLinks::new(config.site_url.clone()));

        Self {
            notifier: Notifier::new(repository.clone(), links),
            health_checker: HealthChecker::new(config.clone(), repository),
            config,
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/v1/events", post(handle_document_event))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_api_server(config: Config, repository: Arc<dyn RuleRepository>) -> Result<(), Error> {
    let addr = format!("0.0.0.0:{}", config.server_port);
    let state = Arc::new(AppState::new(config, repository));

    let listener = TcpListener::bind(&addr).await?;

    info!(address = %addr, "Notification server started");

    axum::serve(listener, router(state)).await?;

    Ok(())
}

async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_checker.check_all();

    let status_code = match health.status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

async fn handle_document_event(
    State(state): State<Arc<AppState>>,
    Json(event): Json<DocumentEvent>,
) -> impl IntoResponse {
    match state.notifier.handle_event(&event, &state.config).await {
        Ok(summary) => {
            let messages = user_messages(&summary);
            let message = format!("Document event processed: {}", summary.status);
            (
                StatusCode::OK,
                Json(ApiResponse::success(EventReport { summary, messages }, message)),
            )
        }
        Err(e) => {
            error!(document = %event.name, error = %e, "Failed to process document event");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<EventReport>::error(
                    e.to_string(),
                    "Failed to process document event".to_string(),
                )),
            )
        }
    }
}
