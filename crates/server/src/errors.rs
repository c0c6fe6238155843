use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use common::types::ErrorBody;
use service::errors::ServiceError;
use tracing::{error, warn};

/// HTTP face of a [`ServiceError`]: status code plus `{"error", "code"}` body.
#[derive(Debug)]
pub struct ApiError(pub ServiceError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            ServiceError::Validation(_) | ServiceError::Model(_) => StatusCode::BAD_REQUEST,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ServiceError::Hash(_)
            | ServiceError::Token(_)
            | ServiceError::Storage(_)
            | ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody { error: self.0.to_string(), code: self.0.code() };
        if status.is_server_error() {
            error!(status = status.as_u16(), code = body.code, error = %body.error, "request failed");
        } else {
            warn!(status = status.as_u16(), code = body.code, error = %body.error, "request rejected");
        }
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use service::storage::{BackendError, StoreError};

    #[test]
    fn maps_service_errors_to_status() {
        let cases = [
            (ServiceError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (ServiceError::Conflict("x".into()), StatusCode::CONFLICT),
            (ServiceError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (ServiceError::not_found("user"), StatusCode::NOT_FOUND),
            (ServiceError::Upstream("x".into()), StatusCode::BAD_GATEWAY),
            (
                StoreError::Backend(BackendError::Unavailable("disk".into())).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError(err).status(), status);
        }
    }

    #[test]
    fn response_carries_code() {
        let resp = ApiError(ServiceError::Conflict("taken".into())).into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }
}
