/// Application-wide constants
/// All magic numbers and constant values should be defined here

/// Default listen port
pub const DEFAULT_PORT: u16 = 3000;

/// Default maximum file size in KB
pub const DEFAULT_MAX_FILE_SIZE_KB: u64 = 150;

/// Bytes per KB, used for both limits and log output
pub const BYTES_PER_KB: u64 = 1024;

/// Whole-body allowance on top of the file limit, covers text fields and multipart framing
pub const FORM_FIELDS_ALLOWANCE: usize = 16 * 1024 * 1024;

/// Multipart field name carrying the uploaded file
pub const UPLOAD_FIELD: &str = "file";

/// Content type assumed for parts that do not declare one
pub const DEFAULT_PART_MIME_TYPE: &str = "text/plain";

/// Number of leading content bytes dumped to the upload log
pub const LOG_PREVIEW_BYTES: usize = 16;

/// Confirmation returned for accepted uploads
pub const UPLOAD_OK_MESSAGE: &str = "File received successfully";

/// Returned when the request carried no file part
pub const NO_FILE_MESSAGE: &str = "No file provided";
