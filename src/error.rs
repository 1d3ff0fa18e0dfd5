use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

pub type DispatchResult<T> = std::result::Result<T, DispatchError>;

/// Every way a dispatch can fail. The variant only shows up in the message;
/// callers always receive a 400.
#[derive(thiserror::Error, Debug)]
pub enum DispatchError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Configuration(String),

    #[error("{0}")]
    Upstream(String),
}

impl DispatchError {
    pub fn validation(message: impl Into<String>) -> Self {
        DispatchError::Validation(message.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        DispatchError::Configuration(message.into())
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        DispatchError::Upstream(message.into())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            DispatchError::Validation(_) => "validation",
            DispatchError::Configuration(_) => "configuration",
            DispatchError::Upstream(_) => "upstream",
        }
    }
}

impl From<reqwest::Error> for DispatchError {
    fn from(error: reqwest::Error) -> Self {
        DispatchError::Upstream(error.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for DispatchError {
    fn from(error: jsonwebtoken::errors::Error) -> Self {
        DispatchError::Configuration(format!("could not sign assertion: {}", error))
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
        };

        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn every_kind_maps_to_bad_request() {
        let errors = [
            DispatchError::validation("userId missing"),
            DispatchError::configuration("FIREBASE_PROJECT_ID is not set"),
            DispatchError::upstream("OAuth token not obtained"),
        ];

        for error in errors {
            let message = error.to_string();
            let response = error.into_response();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);

            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(body, serde_json::json!({ "error": message }));
        }
    }
}
