//! PDF upload endpoint

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::time::Instant;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::ingestion::{size_exceeded_message, validate_pdf_upload, UploadedFile};
use crate::server::state::AppState;
use crate::types::{ErrorResponseBody, UploadResponse};

/// POST /api/upload - Upload, parse, embed and store a PDF
pub async fn upload_pdf(State(state): State<AppState>, multipart: Multipart) -> Response {
    let upload = match read_upload(&state, multipart).await {
        Ok(upload) => upload,
        Err(response) => return response,
    };

    if let Err(e) = validate_pdf_upload(upload.as_ref(), &state.config().upload) {
        return (StatusCode::BAD_REQUEST, Json(ErrorResponseBody::new(e.to_string()))).into_response();
    }
    let Some(upload) = upload else {
        return (StatusCode::BAD_REQUEST, Json(ErrorResponseBody::new("No file uploaded."))).into_response();
    };

    let document_id = Uuid::new_v4();
    match process_upload(&state, &document_id, &upload).await {
        Ok(chunks_processed) => Json(UploadResponse::processed(
            document_id.to_string(),
            upload.file_name,
            chunks_processed,
        ))
        .into_response(),
        Err(e) => {
            tracing::error!("[{}] Error in upload: {}", document_id, e);
            let status = e.status_code();
            let body = ErrorResponseBody::new("PDF processing failed")
                .with_details(e.to_string())
                .with_timestamp();
            (status, Json(body)).into_response()
        }
    }
}

/// Pull the PDF field out of the multipart body, ignoring other fields
async fn read_upload(
    state: &AppState,
    mut multipart: Multipart,
) -> std::result::Result<Option<UploadedFile>, Response> {
    let field_name = &state.config().upload.field_name;
    let mut upload = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return Err(multipart_error(state, e)),
        };

        if field.name() != Some(field_name.as_str()) {
            continue;
        }

        let file_name = field
            .file_name()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "document.pdf".to_string());
        let content_type = field.content_type().map(|s| s.to_string());
        let data = field.bytes().await.map_err(|e| multipart_error(state, e))?;

        upload = Some(UploadedFile {
            file_name,
            content_type,
            data,
        });
    }

    Ok(upload)
}

/// Bodies over the route limit are reported like any other oversized file
fn multipart_error(state: &AppState, e: axum::extract::multipart::MultipartError) -> Response {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        let body = ErrorResponseBody::new(size_exceeded_message(&state.config().upload));
        return (StatusCode::BAD_REQUEST, Json(body)).into_response();
    }
    let body = ErrorResponseBody::new("Invalid multipart body.").with_details(e.body_text());
    (e.status(), Json(body)).into_response()
}

async fn process_upload(state: &AppState, document_id: &Uuid, upload: &UploadedFile) -> Result<usize> {
    let started = Instant::now();
    tracing::info!("[{}] Starting processing for: {}", document_id, upload.file_name);
    tracing::info!(
        "[{}] File size: {:.2}MB",
        document_id,
        upload.size() as f64 / 1024.0 / 1024.0
    );

    tracing::info!("[{}] Parsing PDF with {}...", document_id, state.parser().name());
    let chunks = state.parser().parse(&upload.file_name, &upload.data).await?;
    let chunks: Vec<_> = chunks.into_iter().filter(|c| c.has_text()).collect();
    if chunks.is_empty() {
        return Err(Error::NoContent);
    }
    tracing::info!("[{}] PDF parsed into {} chunks.", document_id, chunks.len());

    tracing::info!("[{}] Starting embedding and storage process...", document_id);
    let stored = state.ingest().process_and_store(&chunks, document_id).await?;

    tracing::info!(
        "[{}] Processing complete in {:.1}s.",
        document_id,
        started.elapsed().as_secs_f64()
    );
    Ok(stored)
}
