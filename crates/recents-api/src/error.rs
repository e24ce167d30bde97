use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use recents_persist::PersistError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{source}")]
    Persist {
        source: PersistError,
        expose_details: bool,
    },
}

impl ApiError {
    pub fn invalid_action(method: &str) -> Self {
        ApiError::BadRequest(format!("Invalid action for {} request", method))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, details) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message, None),
            ApiError::Persist { source, expose_details } => match source {
                PersistError::Validation(message) => (StatusCode::BAD_REQUEST, message, None),
                PersistError::NotFound(message) => (StatusCode::NOT_FOUND, message, None),
                other => {
                    tracing::error!("Request failed: {}", other);
                    let details = expose_details.then(|| other.to_string());
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal server error".to_string(),
                        details,
                    )
                }
            },
        };

        let body = match details {
            Some(details) => json!({ "error": message, "details": details }),
            None => json!({ "error": message }),
        };

        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn persist(source: PersistError, expose_details: bool) -> ApiError {
        ApiError::Persist { source, expose_details }
    }

    #[test]
    fn test_status_mapping() {
        let cases = [
            (persist(PersistError::Validation("userId is required".into()), true), StatusCode::BAD_REQUEST),
            (persist(PersistError::NotFound("row".into()), true), StatusCode::NOT_FOUND),
            (persist(PersistError::FeedUnavailable("down".into()), true), StatusCode::INTERNAL_SERVER_ERROR),
            (persist(PersistError::BatchWriteFailed("abort".into()), false), StatusCode::INTERNAL_SERVER_ERROR),
            (ApiError::invalid_action("GET"), StatusCode::BAD_REQUEST),
        ];

        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }
}
