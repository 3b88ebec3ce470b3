//! HTTP handlers for the certificate API

use anyhow::Context;
use axum::{
    body::Bytes,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, Path, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use certificate::{assemble, normalize, GenerateRequest, MediaType};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::error::ApiError;
use crate::state::AppState;

/// Multipart field carrying the template file
const TEMPLATE_FIELD: &str = "template";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub filename: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub message: String,
    pub output_path: String,
}

/// Health check endpoint
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Store an uploaded template in normalized single-page PDF form
pub async fn upload(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut multipart = multipart.map_err(|_| ApiError::NoFile)?;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, "failed to read multipart body"))?
    {
        if field.name() != Some(TEMPLATE_FIELD) {
            continue;
        }
        let content_type = field.content_type().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e, "failed to read uploaded file"))?;
        upload = Some((content_type, data));
        break;
    }

    let (content_type, data) = match upload {
        Some((content_type, data)) if !data.is_empty() => (content_type, data),
        _ => return Err(ApiError::NoFile),
    };

    let media_type = MediaType::from_content_type(&content_type)?;
    tracing::info!(content_type = %content_type, bytes = data.len(), "template upload");

    let storage = state.storage.clone();
    let filename = tokio::task::spawn_blocking(move || -> certificate::Result<String> {
        let template = normalize(&data, media_type)?;
        storage.save_template(&template)
    })
    .await
    .context("upload task failed")??;

    tracing::info!(filename = %filename, "template stored");

    Ok(Json(UploadResponse {
        message: "File uploaded successfully".to_string(),
        filename,
    }))
}

/// Body limit overruns are reported as such; anything else is internal
fn multipart_error(err: MultipartError, context: &'static str) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge
    } else {
        ApiError::Internal(anyhow::Error::new(err).context(context))
    }
}

/// Render one certificate per record and store the merged document
///
/// The body is parsed here rather than by the `Json` extractor so that a
/// malformed body is reported like every other generate failure.
pub async fn generate(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<GenerateResponse>, ApiError> {
    let storage = state.storage.clone();
    let output_path = tokio::task::spawn_blocking(move || -> certificate::Result<_> {
        let request = GenerateRequest::from_json(&body)?;
        request.validate()?;
        tracing::info!(
            template = %request.template_filename,
            records = request.data.len(),
            fields = request.positions.len(),
            "generating certificates"
        );

        let template = storage.load_template(&request.template_filename)?;
        let pdf = assemble(&template, &request.data, &request.positions)?;
        storage.write_output(&pdf)
    })
    .await
    .context("generate task failed")??;

    tracing::info!(output = %output_path.display(), "certificates generated");

    Ok(Json(GenerateResponse {
        message: "Certificates generated successfully".to_string(),
        output_path: output_path.display().to_string(),
    }))
}

/// Download a generated document by file name
pub async fn download(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    let path = state
        .storage
        .output_path(&filename)
        .ok_or(ApiError::NotFound)?;

    let data = match tokio::fs::read(&path).await {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(ApiError::NotFound),
        Err(e) => return Err(anyhow::Error::from(e).into()),
    };

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        data,
    )
        .into_response())
}
