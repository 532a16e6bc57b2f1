//! HTTP surface of the optimizer: `POST /optimize`

use crate::optimizer::{FareSource, Optimizer, ServiceError};
use crate::{ErrorBody, OptimizationResult, SearchRequest};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::InvalidRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::OriginResolution(_) | ServiceError::NoDestinationsResolved => {
                StatusCode::BAD_REQUEST
            }
            ServiceError::NoViableFlights => StatusCode::NOT_FOUND,
            ServiceError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::HttpError(_)
            | ServiceError::Upstream { .. }
            | ServiceError::CityNotFound(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(status = %status, error = %self, "Optimize request failed");
        } else {
            warn!(status = %status, error = %self, "Optimize request rejected");
        }

        (status, Json(ErrorBody { detail: self.to_string() })).into_response()
    }
}

async fn optimize_handler<S: FareSource + 'static>(
    State(optimizer): State<Arc<Optimizer<S>>>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<OptimizationResult>, ServiceError> {
    let Json(request) =
        payload.map_err(|rejection| ServiceError::InvalidRequest(rejection.body_text()))?;

    info!(
        origin = %request.origin,
        destinations = request.destinations.len(),
        currency = %request.currency,
        "Optimize request received"
    );
    let result = optimizer.optimize(request).await?;
    Ok(Json(result))
}

/// Router exposing `POST /optimize`, open to any origin
pub fn router<S: FareSource + 'static>(optimizer: Arc<Optimizer<S>>) -> Router {
    Router::new()
        .route("/optimize", post(optimize_handler::<S>))
        .with_state(optimizer)
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ServiceError::InvalidRequest("bad".into()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ServiceError::OriginResolution("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::NoDestinationsResolved.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ServiceError::NoViableFlights.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ServiceError::Upstream { status: 503, body: String::new() }.status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[tokio::test]
    async fn test_error_response_body_carries_detail() {
        let response = ServiceError::NoViableFlights.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.detail, "No viable flights found in the next ~24 hours.");
    }
}
