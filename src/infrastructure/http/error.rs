//! Mapping of service errors onto HTTP responses

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::shared::errors::{AmmError, ServiceError};

/// Code reported for bodies that could not be decoded at all
pub const MALFORMED_REQUEST: u16 = 1000;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: u16,
}

#[derive(Debug)]
pub enum ApiError {
    Service(ServiceError),
    Malformed(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Malformed(_) => StatusCode::BAD_REQUEST,
            ApiError::Service(ServiceError::Execution(_)) => StatusCode::BAD_GATEWAY,
            ApiError::Service(ServiceError::Amm(err)) => match err {
                AmmError::PoolNotFound(_) | AmmError::FarmNotFound(_) => StatusCode::NOT_FOUND,
                AmmError::AlreadyExists(_) => StatusCode::CONFLICT,
                _ => StatusCode::BAD_REQUEST,
            },
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError::Service(err)
    }
}

impl From<AmmError> for ApiError {
    fn from(err: AmmError) -> Self {
        ApiError::Service(err.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Malformed(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::Service(err) => ErrorBody {
                code: err.code(),
                error: err.to_string(),
            },
            ApiError::Malformed(message) => ErrorBody {
                code: MALFORMED_REQUEST,
                error: message,
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::errors::ExecutionError;

    #[test]
    fn test_status_mapping() {
        let status = |err: ApiError| err.into_response().status();

        assert_eq!(status(AmmError::PoolNotFound("1-2".into()).into()), StatusCode::NOT_FOUND);
        assert_eq!(status(AmmError::FarmNotFound("1-2".into()).into()), StatusCode::NOT_FOUND);
        assert_eq!(status(AmmError::AlreadyExists("1-2".into()).into()), StatusCode::CONFLICT);
        assert_eq!(
            status(AmmError::DeadlineExpired { deadline: 1, now: 2 }.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(ServiceError::from(ExecutionError::Unavailable).into()),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(status(ApiError::Malformed("eof".into())), StatusCode::BAD_REQUEST);
    }
}
