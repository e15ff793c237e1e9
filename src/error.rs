use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::{models::InvalidTodoId, repository::StoreError};

/// Everything a handler can fail with. Each variant maps to exactly one
/// status; the body is always `{"error": "<message>"}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    InvalidId(#[from] InvalidTodoId),
    #[error("{0}")]
    InvalidBody(String),
    #[error("todo not found")]
    NotFound,
    /// `message` goes to the client, `source` only to the log.
    #[error("{message}: {source}")]
    Store {
        message: &'static str,
        #[source]
        source: StoreError,
    },
}

impl ApiError {
    /// Adapter for `map_err` that tags a datastore failure with the message
    /// the client will see.
    pub fn store(message: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |source| Self::Store { message, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidId(_) | Self::InvalidBody(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidBody(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::InvalidId(InvalidTodoId(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            Self::InvalidId(_) => "Invalid ID".to_string(),
            Self::InvalidBody(reason) => reason.clone(),
            Self::NotFound => "Todo not found".to_string(),
            Self::Store { message, source } => {
                tracing::error!(error = %source, "{message}");
                message.to_string()
            }
        };
        (self.status(), Json(json!({ "error": message }))).into_response()
    }
}
