use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Upstream request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Error: {}, {}", .status.as_u16(), .status)]
    UpstreamStatus { status: reqwest::StatusCode },

    #[error("Failed to decode upstream response: {0}")]
    Decode(String),

    #[error("Upstream RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Upstream request timed out on page {page}")]
    Timeout { page: u32 },

    #[error("Holder export cancelled")]
    Cancelled,

    #[error("Pagination exceeded the configured limit of {max_pages} pages")]
    PageLimitExceeded { max_pages: u32 },

    #[error("CSV processing error: {0}")]
    Csv(#[from] csv::Error),
}

impl AppError {
    /// Classify a reqwest failure for the given page
    pub fn from_request(err: reqwest::Error, page: u32) -> Self {
        if err.is_timeout() {
            AppError::Timeout { page }
        } else if err.is_decode() {
            AppError::Decode(err.to_string())
        } else {
            AppError::Transport(err)
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.to_string()
        }));

        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_message_embeds_code_and_reason() {
        let err = AppError::UpstreamStatus {
            status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
        };
        assert_eq!(err.to_string(), "Error: 500, 500 Internal Server Error");
    }

    #[test]
    fn test_every_error_is_internal_server_error() {
        let errors = vec![
            AppError::Decode("bad json".to_string()),
            AppError::Rpc {
                code: -32602,
                message: "invalid params".to_string(),
            },
            AppError::Timeout { page: 2 },
            AppError::Cancelled,
            AppError::PageLimitExceeded { max_pages: 10 },
        ];

        for err in errors {
            let response = err.into_response();
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }
}
