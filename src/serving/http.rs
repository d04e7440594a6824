//! HTTP transport for the recommend endpoint.

use std::future::Future;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::net::TcpListener;
use tracing::{error, info};

use super::service::{HealthReport, RecommendResponse, RecommendService};
use crate::error::ServeError;

/// Default listening port.
pub const DEFAULT_PORT: u16 = 30502;

impl ServeError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServeError::Request(_) => StatusCode::BAD_REQUEST,
            ServeError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ServeError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServeError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "recommend request failed");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

/// Routes: `POST /api/recommend`, its alias `POST /api/recommender`, and
/// `GET /health`.
pub fn router(service: Arc<RecommendService>) -> Router {
    Router::new()
        .route("/api/recommend", post(recommend))
        .route("/api/recommender", post(recommend))
        .route("/health", get(health))
        .with_state(service)
}

/// Serve on `listener` until `shutdown` resolves.
pub async fn serve<F>(
    listener: TcpListener,
    service: Arc<RecommendService>,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "recommend endpoint listening");
    }
    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown)
        .await
}

async fn recommend(
    State(service): State<Arc<RecommendService>>,
    body: Bytes,
) -> Result<Json<RecommendResponse>, ServeError> {
    // Reloading reads and parses the snapshot file.
    let response = tokio::task::spawn_blocking(move || service.recommend_json(&body))
        .await
        .map_err(|err| ServeError::Internal(err.to_string()))??;
    Ok(Json(response))
}

async fn health(State(service): State<Arc<RecommendService>>) -> Json<HealthReport> {
    Json(service.health())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RequestError;

    #[test]
    fn status_codes() {
        assert_eq!(
            ServeError::from(RequestError::MissingSongs).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServeError::Unavailable {
                reason: "none".into()
            }
            .status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ServeError::Internal("panic".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
