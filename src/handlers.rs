use crate::config::UploadConfig;
use crate::constants::{BYTES_PER_KB, LOG_PREVIEW_BYTES, NO_FILE_MESSAGE};
use crate::error::Result;
use crate::models::*;
use crate::policy::{self, Decision};
use crate::storage;
use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::{header, HeaderMap},
    Json,
};
use std::sync::Arc;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(upload, get_config),
    components(schemas(
        UploadForm,
        UploadResponse,
        UploadFailure,
        ConfigResponse,
        FileCategory,
        StorageMode
    )),
    tags(
        (name = "files", description = "Single file upload with size and type limits")
    ),
    info(
        title = "upbox API",
        version = "0.1.0",
        description = "Accepts one file per request and checks it against the configured limits.\n\n\
                      ## Limits\n\
                      - Files larger than the configured size are rejected with 413\n\
                      - Files outside the allowed categories (image, pdf, any) are rejected with 415\n\
                      - Accepted files are kept in memory or written to disk, per server configuration",
        license(name = "MIT"),
    )
)]
pub struct ApiDoc;

/// Upload a single file
///
/// The `file` part is checked against the allowed types as soon as its headers
/// arrive, and against the size limit while it streams in. A request without a
/// file part still returns 200, with `error: true` in the body.
#[utoipa::path(
    post,
    path = "/files/upload",
    tag = "files",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "File received, or no file provided (error: true)", body = UploadResponse),
        (status = 400, description = "Malformed multipart body or unexpected file field"),
        (status = 413, description = "File too large, or whole request body too large"),
        (status = 415, description = "File type not allowed")
    )
)]
pub async fn upload(
    State(config): State<Arc<UploadConfig>>,
    headers: HeaderMap,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<UploadResult> {
    let is_multipart = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("multipart/form-data"))
        .unwrap_or(false);

    let file = match multipart {
        Ok(mut multipart) => storage::receive_single_file(&config, &mut multipart).await?,
        Err(rejection) => {
            tracing::debug!("Request body is not multipart: {}", rejection);
            None
        }
    };

    let Some(file) = file else {
        tracing::warn!("No file received");
        return Ok(UploadResult::Failed(UploadFailure::new(NO_FILE_MESSAGE)));
    };

    debug_assert_eq!(
        policy::evaluate(&config, file.meta()),
        Decision::Accept(file.storage_mode())
    );

    let buffered = match file.buffer() {
        Some(bytes) => format!(
            "yes, buffer {} bytes, first bytes {}",
            bytes.len(),
            hex_preview(bytes)
        ),
        None => "no".to_string(),
    };

    tracing::info!(
        "File received: name={:?} size={} KB type={} multipart={} in_memory={}",
        file.original_name,
        (file.size_bytes as f64 / BYTES_PER_KB as f64).round(),
        file.mime_type,
        is_multipart,
        buffered
    );

    Ok(UploadResult::Accepted(UploadResponse::from(&file)))
}

/// Inspect the active upload configuration
#[utoipa::path(
    get,
    path = "/files/config",
    tag = "files",
    responses(
        (status = 200, description = "Active upload limits", body = ConfigResponse)
    )
)]
pub async fn get_config(State(config): State<Arc<UploadConfig>>) -> Json<ConfigResponse> {
    Json(ConfigResponse {
        max_file_size_kb: config.max_file_size_kb(),
        allowed_types: config.allowed_categories().to_vec(),
        storage: config.storage_mode(),
    })
}

fn hex_preview(bytes: &[u8]) -> String {
    bytes
        .iter()
        .take(LOG_PREVIEW_BYTES)
        .map(|b| format!("{:02x}", b))
        .collect()
}
