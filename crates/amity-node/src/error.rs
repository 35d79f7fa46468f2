//! HTTP error responses

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::{debug, error};

use amity_core::AmityError;
use amity_protocol::ErrorBody;

/// Errors a handler can return
#[derive(Debug)]
pub enum ApiError {
    /// A domain or storage failure
    Domain(AmityError),
    /// Missing or unusable bearer credentials
    Unauthenticated(String),
    /// Body that could not be parsed as the expected JSON
    Malformed(String),
}

impl From<AmityError> for ApiError {
    fn from(err: AmityError) -> Self {
        ApiError::Domain(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Malformed(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Malformed(rejection.body_text())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Malformed(_) => StatusCode::BAD_REQUEST,
            ApiError::Domain(err) => match err {
                AmityError::SelfRequest
                | AmityError::SelfStatus
                | AmityError::Conflict(_)
                | AmityError::Validation(_)
                | AmityError::Authentication(_) => StatusCode::BAD_REQUEST,
                AmityError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
                AmityError::UserNotFound(_) | AmityError::RequestNotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                AmityError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
                AmityError::Storage(_)
                | AmityError::InvalidConfig(_)
                | AmityError::Serialization(_)
                | AmityError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    pub fn body(&self) -> ErrorBody {
        match self {
            ApiError::Unauthenticated(message) => plain(message, "NOT_AUTHENTICATED"),
            ApiError::Malformed(message) => plain(message, "MALFORMED_REQUEST"),
            ApiError::Domain(AmityError::Validation(fields)) => ErrorBody {
                error: "Validation failed".to_string(),
                code: "VALIDATION_ERROR".to_string(),
                messages: fields.messages(),
                fields: fields.fields().clone(),
            },
            ApiError::Domain(err) if !err.is_client_error() => {
                plain("Internal server error", err.error_code())
            }
            ApiError::Domain(err) => plain(&err.to_string(), err.error_code()),
        }
    }
}

fn plain(message: &str, code: &str) -> ErrorBody {
    ErrorBody {
        error: message.to_string(),
        code: code.to_string(),
        messages: vec![message.to_string()],
        fields: Default::default(),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = ?self, "Request failed");
        } else {
            debug!(status = status.as_u16(), error = ?self, "Request rejected");
        }

        let mut response = (status, Json(self.body())).into_response();
        if let ApiError::Domain(AmityError::RateLimited { retry_after_secs }) = self {
            if let Ok(value) = HeaderValue::from_str(&retry_after_secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}

/// Result type for handlers
pub type ApiResult<T> = std::result::Result<T, ApiError>;
