//! HTTP boundary: routes, error conversion and the serve loop.

use anyhow::Context;
use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde_json::Value;
use std::{net::SocketAddr, sync::Arc};
use tower_http::trace::TraceLayer;
use weather_core::{ApiError, WeatherReport, WeatherService};

const HOME_PAGE: &str = "<p><h2>Weather advisor: POST /weather for a forecast with advice.</h2></p>";

/// Shared application state.
#[derive(Debug)]
pub struct AppState {
    pub service: WeatherService,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/weather", post(weather))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves until Ctrl+C or SIGTERM.
pub async fn run(addr: SocketAddr, service: WeatherService) -> anyhow::Result<()> {
    let app = router(Arc::new(AppState { service }));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!(%addr, "Weather server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        () = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}

/// [`ApiError`] on its way out: status from the error, body `{message, ...payload}`.
#[derive(Debug)]
pub struct ErrorReply(ApiError);

impl From<ApiError> for ErrorReply {
    fn from(err: ApiError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ErrorReply {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::BAD_GATEWAY);
        tracing::debug!(status = status.as_u16(), message = %self.0, "Request failed");
        (status, Json(self.0.to_body())).into_response()
    }
}

async fn home() -> Html<&'static str> {
    Html(HOME_PAGE)
}

async fn weather(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<WeatherReport>, ErrorReply> {
    let payload: Value = serde_json::from_slice(&body)
        .map_err(|_| ApiError::validation("request body must be valid JSON"))?;

    let report = state.service.report(&payload).await?;
    Ok(Json(report))
}
