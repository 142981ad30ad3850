//! Document upload and listing endpoints

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::session::{ProcessSummary, UploadedFile};

/// Processed document listing
#[derive(Debug, Serialize)]
pub struct DocumentList {
    pub documents: Vec<String>,
    pub chunks: usize,
}

/// POST /api/documents - Upload PDFs and rebuild the knowledge base
pub async fn process_documents(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ProcessSummary>> {
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        // Plain form fields carry no file
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };

        let data = field.bytes().await.map_err(multipart_error)?;

        tracing::info!("Received file: {} ({} bytes)", filename, data.len());
        files.push(UploadedFile::new(filename, data.to_vec()));
    }

    let summary = state.session().process_documents(files).await?;
    Ok(Json(summary))
}

/// GET /api/documents - Currently processed documents
pub async fn list_documents(State(state): State<AppState>) -> Json<DocumentList> {
    let session = state.session();
    Json(DocumentList {
        documents: session.documents(),
        chunks: session.chunk_count(),
    })
}

/// Keep the client-facing status of a multipart failure
fn multipart_error(e: MultipartError) -> Error {
    let message = e.body_text();
    match e.status() {
        StatusCode::PAYLOAD_TOO_LARGE => Error::PayloadTooLarge(message),
        status if status.is_client_error() => Error::BadRequest(message),
        _ => Error::internal(format!("Failed to read multipart upload: {}", message)),
    }
}
