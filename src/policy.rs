//! Upload acceptance policy.
//!
//! The size limit is a hard limit checked against the running byte count while
//! a part streams in. The type filter runs once per file part, from its headers,
//! before any bytes are stored.

use crate::config::UploadConfig;
use crate::error::AppError;
use crate::models::{FileCategory, FileMeta, StorageMode};

const IMAGE_PREFIX: &str = "image/";
const PDF_MIME_TYPE: &str = "application/pdf";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    TooLarge,
    DisallowedType,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::TooLarge => write!(f, "file too large"),
            RejectReason::DisallowedType => write!(f, "disallowed file type"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accept(StorageMode),
    Reject(RejectReason),
}

/// Full decision for a file whose size is already known
pub fn evaluate(config: &UploadConfig, file: FileMeta<'_>) -> Decision {
    if !check_size(config, file.size_bytes) {
        return Decision::Reject(RejectReason::TooLarge);
    }
    if !check_type(config, file.mime_type) {
        return Decision::Reject(RejectReason::DisallowedType);
    }
    Decision::Accept(config.storage_mode())
}

pub fn check_size(config: &UploadConfig, size_bytes: u64) -> bool {
    size_bytes <= config.max_file_size_bytes()
}

pub fn check_type(config: &UploadConfig, mime_type: &str) -> bool {
    let allowed = config.allowed_categories();
    if allowed.is_empty() || allowed.contains(&FileCategory::Any) {
        return true;
    }
    if allowed.contains(&FileCategory::Image) && mime_type.starts_with(IMAGE_PREFIX) {
        return true;
    }
    allowed.contains(&FileCategory::Pdf) && mime_type == PDF_MIME_TYPE
}

impl UploadConfig {
    /// Per-part filter for the multipart intake, called with the declared MIME type
    pub fn file_filter(&self) -> impl Fn(&str) -> Result<(), AppError> + '_ {
        move |mime_type| {
            if check_type(self, mime_type) {
                Ok(())
            } else {
                Err(AppError::TypeDisallowed {
                    mime_type: mime_type.to_string(),
                })
            }
        }
    }

    /// Hard limit on bytes received so far for one part
    pub fn enforce_size_limit(&self, received_bytes: u64) -> Result<(), AppError> {
        if check_size(self, received_bytes) {
            Ok(())
        } else {
            Err(AppError::SizeExceeded {
                max_kb: self.max_file_size_kb(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KB: u64 = 1024;

    fn config(categories: &[FileCategory]) -> UploadConfig {
        UploadConfig::new(150, categories.iter().copied(), StorageMode::Memory).unwrap()
    }

    fn meta(mime_type: &str, size_bytes: u64) -> FileMeta<'_> {
        FileMeta { mime_type, size_bytes }
    }

    const SAMPLE_TYPES: &[&str] = &[
        "image/png",
        "image/jpeg",
        "image/svg+xml",
        "application/pdf",
        "application/octet-stream",
        "text/plain",
        "",
    ];

    #[test]
    fn any_accepts_every_type_within_limit() {
        let config = config(&[FileCategory::Any]);
        for mime in SAMPLE_TYPES {
            for size in [0, 1, 50 * KB, 150 * KB] {
                assert_eq!(
                    evaluate(&config, meta(mime, size)),
                    Decision::Accept(StorageMode::Memory),
                    "{mime} at {size} bytes"
                );
            }
        }
    }

    #[test]
    fn empty_categories_accept_everything() {
        let config = config(&[]);
        for mime in SAMPLE_TYPES {
            assert!(check_type(&config, mime), "{mime}");
        }
    }

    #[test]
    fn image_only_rejects_pdf_and_accepts_images() {
        let config = config(&[FileCategory::Image]);

        assert_eq!(
            evaluate(&config, meta("application/pdf", 10 * KB)),
            Decision::Reject(RejectReason::DisallowedType)
        );
        for mime in ["image/png", "image/gif", "image/webp", "image/x-icon"] {
            assert_eq!(
                evaluate(&config, meta(mime, 10 * KB)),
                Decision::Accept(StorageMode::Memory)
            );
        }
    }

    #[test]
    fn pdf_match_is_exact() {
        let config = config(&[FileCategory::Pdf]);

        assert!(check_type(&config, "application/pdf"));
        assert!(!check_type(&config, "application/pdf; charset=binary"));
        assert!(!check_type(&config, "Application/PDF"));
        assert!(!check_type(&config, "image/png"));
    }

    #[test]
    fn image_prefix_is_case_sensitive() {
        let config = config(&[FileCategory::Image, FileCategory::Pdf]);

        assert!(check_type(&config, "image/png"));
        assert!(check_type(&config, "application/pdf"));
        assert!(!check_type(&config, "IMAGE/PNG"));
        assert!(!check_type(&config, "image"));
    }

    #[test]
    fn oversize_always_rejected() {
        for categories in [
            vec![FileCategory::Any],
            vec![FileCategory::Image],
            vec![FileCategory::Pdf],
            vec![],
        ] {
            let config = config(&categories);
            for mime in SAMPLE_TYPES {
                assert_eq!(
                    evaluate(&config, meta(mime, 150 * KB + 1)),
                    Decision::Reject(RejectReason::TooLarge)
                );
            }
        }
    }

    #[test]
    fn limit_is_inclusive() {
        let config = config(&[FileCategory::Any]);
        assert!(check_size(&config, 150 * KB));
        assert!(!check_size(&config, 150 * KB + 1));
    }

    #[test]
    fn accept_carries_configured_storage() {
        let config = UploadConfig::new(1, [FileCategory::Any], StorageMode::Disk).unwrap();
        assert_eq!(
            evaluate(&config, meta("text/plain", 3)),
            Decision::Accept(StorageMode::Disk)
        );
    }

    #[test]
    fn filter_closure_maps_to_app_errors() {
        let config = config(&[FileCategory::Image]);
        let filter = config.file_filter();

        assert!(filter("image/png").is_ok());
        assert!(matches!(
            filter("application/pdf"),
            Err(AppError::TypeDisallowed { mime_type }) if mime_type == "application/pdf"
        ));
        assert!(config.enforce_size_limit(150 * KB).is_ok());
        assert!(matches!(
            config.enforce_size_limit(200 * KB),
            Err(AppError::SizeExceeded { max_kb: 150 })
        ));
    }

    #[test]
    fn reasons_read_as_plain_text() {
        assert_eq!(RejectReason::TooLarge.to_string(), "file too large");
        assert_eq!(RejectReason::DisallowedType.to_string(), "disallowed file type");
    }
}
