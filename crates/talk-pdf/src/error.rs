//! Error types for talk-pdf

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type alias for talk-pdf operations
pub type Result<T> = std::result::Result<T, Error>;

/// Message shown when a question arrives before any document was processed
pub const NOT_READY_MESSAGE: &str = "Please upload and process documents before asking questions.";

/// talk-pdf errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// File parsing error
    #[error("Failed to parse file '{filename}': {message}")]
    FileParse { filename: String, message: String },

    /// Process action invoked without any file
    #[error("No documents were provided")]
    NoDocuments,

    /// Nothing to index after extraction and chunking
    #[error("No text could be extracted from the provided documents")]
    EmptyIndex,

    /// Embedding error
    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    /// Vector index error
    #[error("Vector index error: {0}")]
    VectorDb(String),

    /// Hosted LLM error
    #[error("LLM error: {0}")]
    Llm(String),

    /// Rejected query
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Malformed request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Upload exceeds the configured size limit
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// Question asked before documents were processed
    #[error("{}", NOT_READY_MESSAGE)]
    NotReady,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a file parse error
    pub fn file_parse(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FileParse {
            filename: filename.into(),
            message: message.into(),
        }
    }

    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    /// Create a vector index error
    pub fn vector_db(message: impl Into<String>) -> Self {
        Self::VectorDb(message.into())
    }

    /// Create an LLM error
    pub fn llm(message: impl Into<String>) -> Self {
        Self::Llm(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Stable machine-readable error kind
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Config(_) => "config_error",
            Error::FileParse { .. } => "parse_error",
            Error::NoDocuments => "no_documents",
            Error::EmptyIndex => "empty_index",
            Error::Embedding(_) => "embedding_error",
            Error::VectorDb(_) => "vector_db_error",
            Error::Llm(_) => "llm_error",
            Error::InvalidQuery(_) => "invalid_query",
            Error::BadRequest(_) => "bad_request",
            Error::PayloadTooLarge(_) => "payload_too_large",
            Error::NotReady => "not_ready",
            Error::Io(_) => "io_error",
            Error::Json(_) => "json_error",
            Error::Http(_) => "http_error",
            Error::Internal(_) => "internal_error",
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Error::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::FileParse { .. }
            | Error::NoDocuments
            | Error::EmptyIndex
            | Error::InvalidQuery(_)
            | Error::BadRequest(_)
            | Error::Json(_) => StatusCode::BAD_REQUEST,
            Error::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Error::NotReady => StatusCode::CONFLICT,
            Error::Embedding(_) | Error::Llm(_) => StatusCode::SERVICE_UNAVAILABLE,
            Error::Http(_) => StatusCode::BAD_GATEWAY,
            Error::VectorDb(_) | Error::Io(_) | Error::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = Json(json!({
            "error": {
                "type": self.kind(),
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_ready_message() {
        assert_eq!(Error::NotReady.to_string(), NOT_READY_MESSAGE);
        assert_eq!(Error::NotReady.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_file_parse_display() {
        let err = Error::file_parse("report.pdf", "not a PDF");
        assert_eq!(err.to_string(), "Failed to parse file 'report.pdf': not a PDF");
        assert_eq!(err.kind(), "parse_error");
    }

    #[test]
    fn test_client_error_statuses() {
        let too_large = Error::PayloadTooLarge("limit".to_string());
        assert_eq!(too_large.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(too_large.kind(), "payload_too_large");
        assert_eq!(
            Error::BadRequest("bad".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }
}
