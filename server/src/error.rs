use std::{error::Error, fmt};

use auth::AuthErr;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use log::error;
use model::ValidationErr;
use serde_json::json;

pub type Result<T> = std::result::Result<T, ApiErr>;

/// Every failure a request can end in.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiErr {
    Auth(AuthErr),
    Validation(ValidationErr),
    BadRequest(String),
    ModelUnavailable(String),
    Timeout,
    Internal(String),
}

impl ApiErr {
    /// Machine readable identifier of this error.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiErr::Auth(e) => e.kind(),
            ApiErr::Validation(e) => match e {
                ValidationErr::NotAnObject => "bad_request",
                ValidationErr::MissingField(_) => "missing_field",
                ValidationErr::TypeError { .. } => "type_error",
                ValidationErr::RangeError { .. } => "range_error",
            },
            ApiErr::BadRequest(_) => "bad_request",
            ApiErr::ModelUnavailable(_) => "model_unavailable",
            ApiErr::Timeout => "request_timeout",
            ApiErr::Internal(_) => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiErr::Auth(_) => StatusCode::UNAUTHORIZED,
            ApiErr::Validation(_) | ApiErr::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiErr::ModelUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiErr::Timeout => StatusCode::REQUEST_TIMEOUT,
            ApiErr::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ApiErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiErr::Auth(e) => write!(f, "{e}"),
            ApiErr::Validation(e) => write!(f, "{e}"),
            ApiErr::BadRequest(reason) => write!(f, "{reason}"),
            ApiErr::ModelUnavailable(reason) => write!(f, "Model not available: {reason}"),
            ApiErr::Timeout => write!(f, "Request timed out"),
            ApiErr::Internal(_) => write!(f, "Internal server error"),
        }
    }
}

impl Error for ApiErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ApiErr::Auth(e) => Some(e),
            ApiErr::Validation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<AuthErr> for ApiErr {
    fn from(value: AuthErr) -> Self {
        Self::Auth(value)
    }
}

impl From<ValidationErr> for ApiErr {
    fn from(value: ValidationErr) -> Self {
        Self::Validation(value)
    }
}

impl IntoResponse for ApiErr {
    fn into_response(self) -> Response {
        if let ApiErr::Internal(detail) = &self {
            error!("request failed: {detail}");
        }

        let body = json!({
            "status": "error",
            "error": {
                "kind": self.kind(),
                "message": self.to_string(),
            },
        });

        (self.status(), Json(body)).into_response()
    }
}
