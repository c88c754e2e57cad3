//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`. Domain errors from the
//! service, storage and processing crates convert into `HttpAppError` so every failure
//! renders the same `ErrorResponse` body and is logged at its own level.

use avatar_core::{AppError, ErrorMetadata, LogLevel};
use avatar_processing::{ConversionError, ValidationError};
use avatar_services::AvatarError;
use avatar_storage::StorageError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Machine-readable error code, e.g. `FILE_TOO_LARGE`
    pub code: String,
    /// Whether retrying the same request may succeed
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

/// Wrapper type for AppError to implement IntoResponse
/// (orphan rule: both IntoResponse and AppError are foreign to this crate).
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::from(err))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(
                error = %error.detailed_message(),
                error_type = error_type,
                "Error occurred"
            );
        }
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|env| env.to_lowercase() == "production" || env.to_lowercase() == "prod")
        .unwrap_or(false)
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        // Details are only exposed outside production, and never for sensitive errors
        let expose_details = !is_production_env() && !app_error.is_sensitive();

        let body = ErrorResponse {
            error: app_error.client_message(),
            details: expose_details.then(|| app_error.detailed_message()),
            error_type: expose_details.then(|| app_error.error_type().to_string()),
            code: app_error.error_code().to_string(),
            recoverable: app_error.is_recoverable(),
            suggested_action: app_error.suggested_action().map(String::from),
        };

        (status, Json(body)).into_response()
    }
}

// Domain errors to HttpAppError (impl on the local wrapper avoids the orphan rule)

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        let app = match err {
            StorageError::NotFound(msg) => AppError::NotFound(msg),
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            StorageError::UploadFailed(msg)
            | StorageError::DownloadFailed(msg)
            | StorageError::DeleteFailed(msg)
            | StorageError::BackendError(msg) => AppError::Storage(msg),
            StorageError::IoError(err) => AppError::Storage(format!("IO error: {}", err)),
            StorageError::ConfigError(msg) => AppError::Internal(msg),
        };
        HttpAppError(app)
    }
}

impl From<ValidationError> for HttpAppError {
    fn from(err: ValidationError) -> Self {
        let app = match err {
            ValidationError::EmptyFile => AppError::MissingField("avatar".to_string()),
            ValidationError::FileTooLarge { size, max } => AppError::PayloadTooLarge(format!(
                "The avatar must not be greater than {} kilobytes ({} bytes received)",
                max / 1024,
                size
            )),
            ValidationError::InvalidContentType {
                content_type,
                allowed,
            } => AppError::UnsupportedMediaType(format!(
                "The avatar must be an image of type {} (received '{}')",
                allowed.join(", "),
                content_type
            )),
            ValidationError::DimensionsTooLarge { width, height, max } => {
                AppError::PayloadTooLarge(format!(
                    "Image is {}x{}, larger than the {}x{} limit",
                    width, height, max, max
                ))
            }
            ValidationError::NotAnImage(reason) => {
                AppError::NotAnImage(format!("The avatar must be an image ({})", reason))
            }
        };
        HttpAppError(app)
    }
}

impl From<ConversionError> for HttpAppError {
    fn from(err: ConversionError) -> Self {
        let app = match err {
            ConversionError::Timeout(after) => AppError::ConversionTimeout(after.as_secs().max(1)),
            other => AppError::MediaConversionError(other.to_string()),
        };
        HttpAppError(app)
    }
}

impl From<AvatarError> for HttpAppError {
    fn from(err: AvatarError) -> Self {
        match err {
            AvatarError::Validation(e) => e.into(),
            AvatarError::Conversion(e) => e.into(),
            AvatarError::Storage(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_from_storage_error_not_found() {
        let HttpAppError(app_err) = StorageError::NotFound("avatars/x.png".to_string()).into();
        assert!(matches!(app_err, AppError::NotFound(msg) if msg == "avatars/x.png"));
    }

    #[test]
    fn test_from_storage_error_upload_failed_is_retryable() {
        let HttpAppError(app_err) = StorageError::UploadFailed("disk full".to_string()).into();
        assert_eq!(app_err.error_code(), "STORAGE_ERROR");
        assert!(app_err.is_recoverable());
    }

    #[test]
    fn test_validation_errors_name_the_constraint() {
        let cases: Vec<(ValidationError, &str)> = vec![
            (ValidationError::EmptyFile, "MISSING_FIELD"),
            (
                ValidationError::FileTooLarge {
                    size: 3 * 1024 * 1024,
                    max: 2048 * 1024,
                },
                "FILE_TOO_LARGE",
            ),
            (
                ValidationError::InvalidContentType {
                    content_type: "text/plain".to_string(),
                    allowed: vec!["image/png".to_string()],
                },
                "UNSUPPORTED_MEDIA_TYPE",
            ),
            (
                ValidationError::DimensionsTooLarge {
                    width: 9000,
                    height: 1,
                    max: 8192,
                },
                "FILE_TOO_LARGE",
            ),
            (
                ValidationError::NotAnImage("bad magic".to_string()),
                "NOT_AN_IMAGE",
            ),
        ];

        for (err, code) in cases {
            let HttpAppError(app_err) = err.into();
            assert_eq!(app_err.error_code(), code);
        }
    }

    #[test]
    fn test_conversion_timeout_maps_to_503() {
        let HttpAppError(app_err) = ConversionError::Timeout(Duration::from_secs(10)).into();
        assert_eq!(app_err.http_status_code(), 503);
        assert!(matches!(app_err, AppError::ConversionTimeout(10)));
    }

    #[test]
    fn test_conversion_failure_is_not_validation() {
        let HttpAppError(app_err) = AvatarError::Conversion(ConversionError::Decode(
            "truncated".to_string(),
        ))
        .into();
        assert_eq!(app_err.error_code(), "CONVERSION_ERROR");
    }

    #[test]
    fn test_into_response_status() {
        let response =
            HttpAppError(AppError::MissingField("avatar".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
