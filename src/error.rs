//! Domain error types for the gastos server.
//!
//! Uses thiserror for ergonomic error handling with automatic Display implementations.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use std::fmt;

/// Application-level errors.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed
    #[error("Database error: {0}")]
    Database(String),

    /// Resource not found
    #[error("{0} no encontrado")]
    NotFound(String),

    /// Malformed request or failed precondition
    #[error("{0}")]
    InvalidInput(String),

    /// Field validation failed; carries every accumulated failure
    #[error("{message}")]
    Validation {
        message: String,
        errores: Vec<String>,
    },

    /// Authentication failed
    #[error("No autorizado: {0}")]
    Unauthorized(String),

    /// Authenticated but missing the required permission
    #[error("Permiso denegado: {0}")]
    Forbidden(String),

    /// Storage quota would be exceeded by the incoming file
    #[error("{0}")]
    QuotaExceeded(String),

    /// Request body exceeds the transport ceiling
    #[error("{0}")]
    PayloadTooLarge(String),

    /// Storage (S3) operation failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// PDF rendering failed
    #[error("Render error: {0}")]
    Render(String),
}

impl AppError {
    /// Build the 422 error returned when one or more field checks fail.
    pub fn validation(errores: Vec<String>) -> Self {
        AppError::Validation {
            message: "Error de validación".to_string(),
            errores,
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Database(_) | AppError::Storage(_) | AppError::Render(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::QuotaExceeded(_) | AppError::PayloadTooLarge(_) => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let (error_code, response_message) = match self {
            AppError::Validation { message, errores } => {
                return HttpResponse::build(status).json(ValidationErrorResponse {
                    message: message.clone(),
                    errores: errores.clone(),
                });
            }
            AppError::QuotaExceeded(mensaje) => {
                return HttpResponse::build(status).json(QuotaErrorResponse {
                    mensaje: mensaje.clone(),
                });
            }
            AppError::Database(err_str) => {
                tracing::error!("Database error: {}", err_str);
                (
                    "DATABASE_ERROR",
                    "Ocurrió un error interno en la base de datos".to_string(),
                )
            }
            AppError::Storage(err_str) => {
                tracing::error!("Storage error: {}", err_str);
                (
                    "STORAGE_ERROR",
                    "Ocurrió un error interno de almacenamiento".to_string(),
                )
            }
            AppError::Render(err_str) => {
                tracing::error!("Render error: {}", err_str);
                ("RENDER_ERROR", "No se pudo generar el documento".to_string())
            }
            AppError::NotFound(_) => ("NOT_FOUND", self.to_string()),
            AppError::InvalidInput(_) => ("INVALID_INPUT", self.to_string()),
            AppError::Unauthorized(_) => ("UNAUTHORIZED", self.to_string()),
            AppError::Forbidden(_) => ("FORBIDDEN", self.to_string()),
            AppError::PayloadTooLarge(_) => ("PAYLOAD_TOO_LARGE", self.to_string()),
        };

        HttpResponse::build(status).json(ErrorResponse {
            error: error_code.to_string(),
            message: response_message,
        })
    }
}

/// Error response body matching OpenAPI schema.
#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

/// Body returned with 422 when field validation fails.
#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
pub struct ValidationErrorResponse {
    pub message: String,
    pub errores: Vec<String>,
}

/// Body returned with 413 when a user's storage quota would be exceeded.
#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
pub struct QuotaErrorResponse {
    pub mensaje: String,
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

// Conversion implementations for common error types

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON inválido: {}", err))
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(err: bcrypt::BcryptError) -> Self {
        AppError::Database(format!("Password hash error: {}", err))
    }
}
