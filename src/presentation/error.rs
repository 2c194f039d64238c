// HTTP error mapping for gateway and routing failures
use crate::domain::error::GatewayError;
use crate::domain::tenant::UnknownTenant;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::{json, Value};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    UnknownTenant(#[from] UnknownTenant),

    /// Body missing, not JSON, or missing `query`
    #[error("invalid request body")]
    InvalidBody(#[from] JsonRejection),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::UnknownTenant(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::Gateway(e) => match e {
                GatewayError::CredentialNotFound { .. } => StatusCode::UNAUTHORIZED,
                GatewayError::Upstream { status, .. } => {
                    StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
                }
                GatewayError::Query { .. } => StatusCode::BAD_REQUEST,
                GatewayError::Transport(_) => StatusCode::INTERNAL_SERVER_ERROR,
                GatewayError::MalformedResponse(_) => StatusCode::BAD_GATEWAY,
            },
        }
    }

    /// `{error, details?}`
    pub fn body(&self) -> Value {
        let details = match self {
            ApiError::Gateway(GatewayError::Upstream { body, .. }) => Some(Value::String(body.clone())),
            ApiError::Gateway(GatewayError::Query { details }) => Some(details.clone()),
            ApiError::InvalidBody(rejection) => Some(Value::String(rejection.body_text())),
            _ => None,
        };

        match details {
            Some(details) => json!({ "error": self.to_string(), "details": details }),
            None => json!({ "error": self.to_string() }),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}
