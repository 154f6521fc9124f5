mod guard;
mod handlers;

use std::{any::Any, sync::Arc, time::Duration};

use axum::{
    Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::{catch_panic::CatchPanicLayer, timeout::TimeoutLayer};

use crate::{AdmissionService, ApiErr};

pub use guard::require_auth;

/// Builds the HTTP router of the service.
///
/// # Routes
/// - `POST /login` - Exchange credentials for a bearer token
/// - `POST /predict` - Score one profile (authenticated)
/// - `POST /predict_batch` - Score a list of profiles (authenticated)
/// - `GET /health` - Liveness and model status
pub fn router(service: Arc<AdmissionService>, timeout: Duration) -> Router {
    let protected = Router::new()
        .route("/predict", post(handlers::predict))
        .route("/predict_batch", post(handlers::predict_batch))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&service),
            require_auth,
        ));

    Router::new()
        .route("/login", post(handlers::login))
        .route("/health", get(handlers::health))
        .merge(protected)
        .layer(TimeoutLayer::new(timeout))
        .layer(middleware::map_response(timeout_body))
        .layer(CatchPanicLayer::custom(panic_response))
        .with_state(service)
}

/// Gives the bare 408 of the timeout layer the usual error body.
async fn timeout_body(response: Response) -> Response {
    if response.status() == StatusCode::REQUEST_TIMEOUT {
        ApiErr::Timeout.into_response()
    } else {
        response
    }
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());

    ApiErr::Internal(format!("handler panicked: {detail}")).into_response()
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use serde_json::Value;

    use super::*;

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn timeouts_carry_an_error_kind() {
        let bare = Response::builder()
            .status(StatusCode::REQUEST_TIMEOUT)
            .body(Body::empty())
            .unwrap();

        let response = timeout_body(bare).await;
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);

        let body = json_body(response).await;
        assert_eq!(body["status"], "error");
        assert_eq!(body["error"]["kind"], "request_timeout");
    }

    #[tokio::test]
    async fn other_responses_pass_through() {
        let ok = Response::builder()
            .status(StatusCode::OK)
            .body(Body::from("fine"))
            .unwrap();

        let response = timeout_body(ok).await;
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"fine");
    }

    #[tokio::test]
    async fn panics_become_internal_errors() {
        let response = panic_response(Box::new("index out of bounds"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = json_body(response).await;
        assert_eq!(body["error"]["kind"], "internal_error");
        assert_eq!(body["error"]["message"], "Internal server error");
    }
}
