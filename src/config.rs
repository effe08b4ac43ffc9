use crate::constants::{BYTES_PER_KB, DEFAULT_MAX_FILE_SIZE_KB, DEFAULT_PORT, FORM_FIELDS_ALLOWANCE};
use crate::models::{FileCategory, StorageMode};
use std::env;
use std::path::PathBuf;

/// Upload limits and storage choice, fixed once the service starts
#[derive(Debug, Clone, PartialEq)]
pub struct UploadConfig {
    max_file_size_kb: u64,
    allowed_categories: Vec<FileCategory>,
    storage_mode: StorageMode,
    upload_dir: PathBuf,
}

impl UploadConfig {
    /// Duplicate categories are dropped, first occurrence wins.
    pub fn new(
        max_file_size_kb: u64,
        allowed_categories: impl IntoIterator<Item = FileCategory>,
        storage_mode: StorageMode,
    ) -> anyhow::Result<Self> {
        anyhow::ensure!(max_file_size_kb > 0, "max file size must be greater than 0 KB");

        let mut categories = Vec::new();
        for category in allowed_categories {
            if !categories.contains(&category) {
                categories.push(category);
            }
        }

        Ok(Self {
            max_file_size_kb,
            allowed_categories: categories,
            storage_mode,
            upload_dir: env::temp_dir(),
        })
    }

    pub fn with_upload_dir(mut self, upload_dir: impl Into<PathBuf>) -> Self {
        self.upload_dir = upload_dir.into();
        self
    }

    pub fn max_file_size_kb(&self) -> u64 {
        self.max_file_size_kb
    }

    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_kb.saturating_mul(BYTES_PER_KB)
    }

    pub fn allowed_categories(&self) -> &[FileCategory] {
        &self.allowed_categories
    }

    pub fn storage_mode(&self) -> StorageMode {
        self.storage_mode
    }

    pub fn upload_dir(&self) -> &PathBuf {
        &self.upload_dir
    }

    /// Request body limit handed to the router. Only the file part is held to
    /// `max_file_size_bytes`, text fields get their own allowance.
    pub fn body_limit(&self) -> usize {
        usize::try_from(self.max_file_size_bytes())
            .unwrap_or(usize::MAX)
            .saturating_add(FORM_FIELDS_ALLOWANCE)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub upload: UploadConfig,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup, `from_env` passes the process environment
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let port = match lookup("PORT") {
            Some(port) => port.parse()?,
            None => DEFAULT_PORT,
        };

        let max_file_size_kb = match lookup("UPLOAD_MAX_FILE_SIZE_KB") {
            Some(kb) => kb
                .trim()
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid UPLOAD_MAX_FILE_SIZE_KB {:?}: {}", kb, e))?,
            None => DEFAULT_MAX_FILE_SIZE_KB,
        };

        let allowed_categories = match lookup("UPLOAD_ALLOWED_TYPES") {
            Some(list) => parse_categories(&list)?,
            None => vec![FileCategory::Image],
        };

        let storage_mode = lookup("UPLOAD_STORAGE")
            .map(|mode| mode.trim().parse::<StorageMode>())
            .transpose()
            .map_err(anyhow::Error::msg)?
            .unwrap_or_default();

        let mut upload = UploadConfig::new(max_file_size_kb, allowed_categories, storage_mode)?;
        if let Some(dir) = lookup("UPLOAD_DIR").filter(|dir| !dir.trim().is_empty()) {
            upload = upload.with_upload_dir(dir);
        }

        Ok(Self { port, upload })
    }
}

/// Comma separated list, blank entries skipped, so an empty string means "no restriction"
fn parse_categories(list: &str) -> anyhow::Result<Vec<FileCategory>> {
    list.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| entry.parse::<FileCategory>().map_err(anyhow::Error::msg))
        .collect()
}
