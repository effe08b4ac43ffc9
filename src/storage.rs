//! Multipart intake: pulls the single `file` part out of a request body and
//! stores it in the backend chosen by the upload config.
//!
//! Disk uploads are written to a temp file in the upload directory and only
//! renamed to their final name once the whole body has been read. Until then
//! the temp file is removed on drop, so an aborted request leaves nothing behind.

use crate::config::UploadConfig;
use crate::constants::{BYTES_PER_KB, DEFAULT_PART_MIME_TYPE, UPLOAD_FIELD};
use crate::error::{AppError, Result};
use crate::models::{IncomingFile, StorageMode, StoredContent};
use axum::extract::multipart::{Field, Multipart, MultipartError};
use axum::http::StatusCode;
use bytes::{Bytes, BytesMut};
use std::path::{Path, PathBuf};
use tempfile::{NamedTempFile, TempPath};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Bytes of a part that has been read but not yet handed over
enum Pending {
    Memory(Bytes),
    Disk(TempPath),
}

struct ReceivedPart {
    original_name: String,
    mime_type: String,
    size_bytes: u64,
    content: Pending,
}

/// Reads every part of the body and returns the uploaded file, if any.
///
/// Text fields are ignored. A file part under any name other than `file`, or a
/// second `file` part, fails the whole request and nothing is kept.
pub async fn receive_single_file(
    config: &UploadConfig,
    multipart: &mut Multipart,
) -> Result<Option<IncomingFile>> {
    let mut received: Option<ReceivedPart> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| map_multipart_error(config, e))?
    {
        let Some(original_name) = field.file_name().map(str::to_string) else {
            // Plain form field
            continue;
        };

        let field_name = field.name().unwrap_or("").to_string();
        if field_name != UPLOAD_FIELD || received.is_some() {
            return Err(AppError::BadRequest(format!("Unexpected field: {}", field_name)));
        }

        received = Some(store_part(config, field, original_name).await?);
    }

    received.map(|part| commit(config, part)).transpose()
}

async fn store_part(
    config: &UploadConfig,
    mut field: Field<'_>,
    original_name: String,
) -> Result<ReceivedPart> {
    let mime_type = field
        .content_type()
        .unwrap_or(DEFAULT_PART_MIME_TYPE)
        .to_string();

    let filter = config.file_filter();
    filter(&mime_type)?;

    let (content, size_bytes) = match config.storage_mode() {
        StorageMode::Memory => {
            let mut buffer = BytesMut::new();
            while let Some(chunk) = next_chunk(config, &mut field).await? {
                config.enforce_size_limit((buffer.len() + chunk.len()) as u64)?;
                buffer.extend_from_slice(&chunk);
            }
            let size_bytes = buffer.len() as u64;
            (Pending::Memory(buffer.freeze()), size_bytes)
        }
        StorageMode::Disk => {
            let (temp_path, size_bytes) = write_to_disk(config, &mut field).await?;
            (Pending::Disk(temp_path), size_bytes)
        }
    };

    tracing::debug!(
        "Received part {:?} ({} bytes, {}) in {}",
        original_name,
        size_bytes,
        mime_type,
        config.storage_mode()
    );

    Ok(ReceivedPart {
        original_name,
        mime_type,
        size_bytes,
        content,
    })
}

async fn write_to_disk(config: &UploadConfig, field: &mut Field<'_>) -> Result<(TempPath, u64)> {
    let dir = config.upload_dir().clone();
    let temp = tokio::task::spawn_blocking(move || NamedTempFile::new_in(dir))
        .await
        .map_err(anyhow::Error::from)??;

    // `temp_path` removes the file when dropped, also when this future is dropped mid-upload
    let (std_file, temp_path) = temp.into_parts();
    let mut file = fs::File::from_std(std_file);
    let mut written: u64 = 0;

    while let Some(chunk) = next_chunk(config, field).await? {
        written += chunk.len() as u64;
        config.enforce_size_limit(written)?;
        file.write_all(&chunk).await?;
    }

    file.sync_all().await?;
    Ok((temp_path, written))
}

/// Hands a fully read part over to the handler, renaming disk uploads to their final name
fn commit(config: &UploadConfig, part: ReceivedPart) -> Result<IncomingFile> {
    let content = match part.content {
        Pending::Memory(bytes) => StoredContent::Memory(bytes),
        Pending::Disk(temp_path) => {
            let path = final_path(config.upload_dir());
            temp_path.persist(&path).map_err(|e| e.error)?;
            StoredContent::Disk(path)
        }
    };

    Ok(IncomingFile {
        original_name: part.original_name,
        mime_type: part.mime_type,
        size_bytes: part.size_bytes,
        content,
    })
}

fn final_path(upload_dir: &Path) -> PathBuf {
    upload_dir.join(uuid::Uuid::new_v4().simple().to_string())
}

async fn next_chunk(config: &UploadConfig, field: &mut Field<'_>) -> Result<Option<Bytes>> {
    field
        .chunk()
        .await
        .map_err(|e| map_multipart_error(config, e))
}

/// The router's body limit surfaces as a multipart error. It bounds the whole
/// request, so it is reported apart from the per-file size limit.
fn map_multipart_error(config: &UploadConfig, err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::BodyTooLarge {
            max_kb: config.body_limit() as u64 / BYTES_PER_KB,
        }
    } else {
        AppError::BadRequest(format!("Failed to parse multipart: {}", err.body_text()))
    }
}

/// Creates the disk upload directory so the first upload does not race it
pub async fn prepare(config: &UploadConfig) -> std::io::Result<()> {
    if config.storage_mode() == StorageMode::Disk {
        fs::create_dir_all(config.upload_dir()).await?;
    }
    Ok(())
}
