use axum::{
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use utoipa::ToSchema;

/// Coarse file type groups an upload config can allow
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Image, // any image/* type
    Pdf,   // application/pdf only
    Any,
}

impl std::fmt::Display for FileCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileCategory::Image => write!(f, "image"),
            FileCategory::Pdf => write!(f, "pdf"),
            FileCategory::Any => write!(f, "any"),
        }
    }
}

impl std::str::FromStr for FileCategory {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" => Ok(FileCategory::Image),
            "pdf" => Ok(FileCategory::Pdf),
            "any" => Ok(FileCategory::Any),
            _ => Err(format!("Invalid file category: {}", s)),
        }
    }
}

/// Where accepted bytes end up
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StorageMode {
    #[default]
    Memory,
    Disk,
}

impl StorageMode {
    /// Human readable label reported back to uploaders
    pub fn label(&self) -> &'static str {
        match self {
            StorageMode::Memory => "memory (RAM)",
            StorageMode::Disk => "disk",
        }
    }
}

impl std::fmt::Display for StorageMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageMode::Memory => write!(f, "memory"),
            StorageMode::Disk => write!(f, "disk"),
        }
    }
}

impl std::str::FromStr for StorageMode {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "memory" => Ok(StorageMode::Memory),
            "disk" => Ok(StorageMode::Disk),
            _ => Err(format!("Invalid storage mode: {}", s)),
        }
    }
}

/// Metadata the upload policy decides on
#[derive(Debug, Clone, Copy)]
pub struct FileMeta<'a> {
    pub mime_type: &'a str,
    pub size_bytes: u64,
}

/// Accepted file bytes, held by whichever backend the policy picked
#[derive(Debug)]
pub enum StoredContent {
    Memory(Bytes),
    Disk(PathBuf),
}

/// A file part that passed the upload policy and was fully received
#[derive(Debug)]
pub struct IncomingFile {
    pub original_name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub content: StoredContent,
}

impl IncomingFile {
    pub fn storage_mode(&self) -> StorageMode {
        match self.content {
            StoredContent::Memory(_) => StorageMode::Memory,
            StoredContent::Disk(_) => StorageMode::Disk,
        }
    }

    /// Buffered bytes, only available in memory mode
    pub fn buffer(&self) -> Option<&Bytes> {
        match &self.content {
            StoredContent::Memory(bytes) => Some(bytes),
            StoredContent::Disk(_) => None,
        }
    }

    pub fn meta(&self) -> FileMeta<'_> {
        FileMeta {
            mime_type: &self.mime_type,
            size_bytes: self.size_bytes,
        }
    }
}

/// Multipart form accepted by the upload endpoint (documentation only)
#[derive(Debug, ToSchema)]
pub struct UploadForm {
    /// The file to upload
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    #[schema(example = "File received successfully")]
    pub message: String,

    /// File name as sent by the client
    #[schema(example = "dog.png")]
    pub original_name: String,

    /// Size in bytes
    #[schema(example = 51200)]
    pub size: u64,

    #[schema(example = "image/png")]
    pub mimetype: String,

    /// Storage backend label
    #[schema(example = "memory (RAM)")]
    pub storage: String,
}

impl From<&IncomingFile> for UploadResponse {
    fn from(file: &IncomingFile) -> Self {
        Self {
            message: crate::constants::UPLOAD_OK_MESSAGE.to_string(),
            original_name: file.original_name.clone(),
            size: file.size_bytes,
            mimetype: file.mime_type.clone(),
            storage: file.storage_mode().label().to_string(),
        }
    }
}

/// Body returned when the request reached the handler without a file
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadFailure {
    pub error: bool,
    #[schema(example = "No file provided")]
    pub message: String,
}

impl UploadFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: true,
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum UploadResult {
    Accepted(UploadResponse),
    Failed(UploadFailure),
}

impl IntoResponse for UploadResult {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfigResponse {
    #[schema(example = 150)]
    pub max_file_size_kb: u64,
    pub allowed_types: Vec<FileCategory>,
    pub storage: StorageMode,
}
