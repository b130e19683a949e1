//! Video upload checks
//!
//! Only what the core needs before creating a pending video test: format
//! and size validation, plus deriving a title from the file name. Preview
//! and thumbnail handling belong to the video collaborator.

use tracing::debug;

use crate::human_size::format_file_size;
use crate::validation::ValidationResult;

/// Largest accepted video upload (100 MiB)
pub const MAX_VIDEO_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// MIME types accepted for upload
pub const ALLOWED_VIDEO_TYPES: [&str; 9] = [
    "video/mp4",
    "video/webm",
    "video/ogg",
    "video/avi",
    "video/quicktime",
    "video/x-quicktime",
    "video/wmv",
    "video/flv",
    "video/mkv",
];

/// Extension to MIME type, for files picked from disk without a type
const EXTENSION_TYPES: [(&str, &str); 8] = [
    ("mp4", "video/mp4"),
    ("webm", "video/webm"),
    ("ogg", "video/ogg"),
    ("avi", "video/avi"),
    ("mov", "video/quicktime"),
    ("wmv", "video/wmv"),
    ("flv", "video/flv"),
    ("mkv", "video/mkv"),
];

/// Accept-string for a file picker
pub fn supported_video_formats() -> &'static str {
    ".mp4,.webm,.ogg,.avi,.mov,.wmv,.flv,.mkv,video/mp4,video/webm,video/ogg,video/avi,video/quicktime,video/x-quicktime,video/x-msvideo,video/x-ms-wmv,video/x-flv,video/x-matroska"
}

/// Guess the MIME type from the file extension (case-insensitive)
pub fn mime_type_for(file_name: &str) -> Option<&'static str> {
    let (_, extension) = file_name.rsplit_once('.')?;
    let extension = extension.to_lowercase();
    EXTENSION_TYPES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, mime)| *mime)
}

/// File name without its last extension (`demo.final.mp4` → `demo.final`)
pub fn strip_extension(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(pos) => {
            let extension = &file_name[pos + 1..];
            if extension.is_empty() || extension.contains('/') {
                file_name
            } else {
                &file_name[..pos]
            }
        }
        None => file_name,
    }
}

/// Validate a video upload by MIME type and size; errors accumulate
pub fn validate_video_file(file_name: &str, mime_type: &str, size: u64) -> ValidationResult {
    let mut errors = Vec::new();

    if !ALLOWED_VIDEO_TYPES.contains(&mime_type) {
        errors.push(
            "Unsupported video format. Supported formats: MP4, WebM, OGG, AVI, MOV, WMV, FLV, MKV"
                .to_string(),
        );
    }
    if size > MAX_VIDEO_FILE_SIZE {
        errors.push(format!(
            "Video file size must be less than {}",
            format_file_size(MAX_VIDEO_FILE_SIZE)
        ));
    }
    if size == 0 {
        errors.push("Video file is empty".to_string());
    }

    let result = ValidationResult::from_parts(errors, Vec::new());
    debug!(
        file = %file_name,
        mime_type = %mime_type,
        size = %format_file_size(size),
        valid = result.is_valid,
        "Validated video upload"
    );
    result
}
