//! Error types module
//!
//! All server-side failures are unified under `AppError`, which self-describes how it
//! should be presented over HTTP through the `ErrorMetadata` trait. Crate-local error
//! enums (storage, validation, conversion) are mapped into it at the API boundary.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like conversion timeouts
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "FILE_TOO_LARGE")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("Not an image: {0}")]
    NotAnImage(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Media conversion error: {0}")]
    MediaConversionError(String),

    #[error("Media conversion timed out after {0} seconds")]
    ConversionTimeout(u64),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::InvalidInput(format!("UUID parsing error: {}", err))
    }
}

impl From<crate::models::UnknownVariant> for AppError {
    fn from(err: crate::models::UnknownVariant) -> Self {
        AppError::InvalidInput(err.to_string())
    }
}

/// Static metadata for each variant:
/// (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::Storage(_) => (
            500,
            "STORAGE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::MissingField(_) => (
            422,
            "MISSING_FIELD",
            false,
            Some("Attach an image in the 'avatar' field"),
            false,
            LogLevel::Debug,
        ),
        AppError::NotAnImage(_) => (
            422,
            "NOT_AN_IMAGE",
            false,
            Some("Upload a PNG, JPEG, GIF, WebP or BMP image"),
            false,
            LogLevel::Debug,
        ),
        AppError::UnsupportedMediaType(_) => (
            415,
            "UNSUPPORTED_MEDIA_TYPE",
            false,
            Some("Upload a PNG, JPEG, GIF, WebP or BMP image"),
            false,
            LogLevel::Debug,
        ),
        AppError::PayloadTooLarge(_) => (
            413,
            "FILE_TOO_LARGE",
            false,
            Some("Reduce the image to 2048 KB or less"),
            false,
            LogLevel::Debug,
        ),
        AppError::MediaConversionError(_) => (
            422,
            "CONVERSION_ERROR",
            false,
            Some("Check image format and try a different file"),
            false,
            LogLevel::Warn,
        ),
        AppError::ConversionTimeout(_) => (
            503,
            "CONVERSION_TIMEOUT",
            true,
            Some("Retry with a smaller image"),
            false,
            LogLevel::Warn,
        ),
        AppError::InvalidInput(_) => (
            400,
            "INVALID_INPUT",
            false,
            Some("Check request parameters and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::NotFound(_) => (
            404,
            "NOT_FOUND",
            false,
            Some("Verify the resource exists"),
            false,
            LogLevel::Debug,
        ),
        AppError::Unauthorized(_) => (
            401,
            "UNAUTHORIZED",
            false,
            Some("Sign in and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::Internal(_) | AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get error type name for logging and debugging
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::Storage(_) => "Storage",
            AppError::MissingField(_) => "MissingField",
            AppError::NotAnImage(_) => "NotAnImage",
            AppError::UnsupportedMediaType(_) => "UnsupportedMediaType",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::MediaConversionError(_) => "MediaConversionError",
            AppError::ConversionTimeout(_) => "ConversionTimeout",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::NotFound(_) => "NotFound",
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Storage(_) => "Failed to access storage".to_string(),
            AppError::MissingField(ref field) => format!("The {} field is required", field),
            AppError::NotAnImage(ref msg) => msg.clone(),
            AppError::UnsupportedMediaType(ref msg) => msg.clone(),
            AppError::PayloadTooLarge(ref msg) => msg.clone(),
            AppError::MediaConversionError(_) => "Failed to generate avatar sizes".to_string(),
            AppError::ConversionTimeout(secs) => {
                format!("Avatar processing took longer than {} seconds", secs)
            }
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::Unauthorized(ref msg) => msg.clone(),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_storage() {
        let err = AppError::Storage("disk full".to_string());
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.error_code(), "STORAGE_ERROR");
        assert!(err.is_recoverable());
        assert_eq!(err.client_message(), "Failed to access storage");
        assert!(err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn test_validation_errors_name_the_failed_constraint() {
        let missing = AppError::MissingField("avatar".to_string());
        assert_eq!(missing.error_code(), "MISSING_FIELD");
        assert_eq!(missing.client_message(), "The avatar field is required");

        let not_image = AppError::NotAnImage("could not decode".to_string());
        assert_eq!(not_image.error_code(), "NOT_AN_IMAGE");
        assert_eq!(not_image.http_status_code(), 422);

        let too_large = AppError::PayloadTooLarge("3000 KB".to_string());
        assert_eq!(too_large.error_code(), "FILE_TOO_LARGE");
        assert_eq!(too_large.http_status_code(), 413);

        for err in [missing, not_image, too_large] {
            assert!(!err.is_recoverable());
            assert!(!err.is_sensitive());
            assert_eq!(err.log_level(), LogLevel::Debug);
        }
    }

    #[test]
    fn test_conversion_errors_are_distinct_from_validation() {
        let err = AppError::MediaConversionError("corrupt".to_string());
        assert_eq!(err.error_code(), "CONVERSION_ERROR");
        assert!(!err.is_recoverable());

        let timeout = AppError::ConversionTimeout(10);
        assert_eq!(timeout.http_status_code(), 503);
        assert!(timeout.is_recoverable());
        assert!(timeout.client_message().contains("10"));
    }

    #[test]
    fn test_detailed_message_includes_source_chain() {
        let err = AppError::from(anyhow::anyhow!("root cause").context("outer"));
        let details = err.detailed_message();
        assert!(details.contains("Internal error with source"));
        assert!(details.contains("Caused by"));
    }

    #[test]
    fn test_unknown_variant_maps_to_invalid_input() {
        let err: AppError = "12x12"
            .parse::<crate::models::VariantName>()
            .unwrap_err()
            .into();
        assert_eq!(err.error_code(), "INVALID_INPUT");
        assert!(err.client_message().contains("12x12"));
    }
}
