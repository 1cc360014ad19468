use axum::{http::StatusCode, Json};
use serde_json::json;
use thiserror::Error;

/// Failure talking to the upstream backend.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("backend unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),
    #[error("API returned {status}")]
    Upstream { status: u16 },
    #[error("not authenticated")]
    Unauthenticated,
    #[error("unexpected response body: {0}")]
    Decode(#[source] reqwest::Error),
}

impl GatewayError {
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Upstream { status } => Some(*status),
            GatewayError::Unauthenticated => Some(401),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        let status = match &err {
            GatewayError::Upstream { status } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            GatewayError::Unauthenticated => StatusCode::UNAUTHORIZED,
            GatewayError::Unreachable(_) | GatewayError::Decode(_) => StatusCode::BAD_GATEWAY,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_status_is_preserved() {
        let err = AppError::from(GatewayError::Upstream { status: 404 });
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.message, "API returned 404");
    }

    #[test]
    fn unauthenticated_maps_to_401() {
        let err = AppError::from(GatewayError::Unauthenticated);
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(GatewayError::Unauthenticated.status(), Some(401));
    }

    #[test]
    fn nonsense_upstream_status_becomes_bad_gateway() {
        let err = AppError::from(GatewayError::Upstream { status: 42 });
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
    }
}
