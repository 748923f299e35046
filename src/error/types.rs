use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Unsupported file type: {name}. Supported formats: PDF, PNG, JPG, JPEG, BMP, TIFF, GIF")]
    UnsupportedFile { name: String },

    #[error("No file selected")]
    NoFileSelected,

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("A file is already being processed")]
    Busy,

    #[error("OCR processing failed: {message}")]
    TransportError { message: String },

    #[error("Invalid response format from server")]
    InvalidResponse,

    #[error("{}", .detail.as_deref().unwrap_or("OCR processing failed"))]
    ProcessingFailed { detail: Option<String> },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl AppError {
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::UnsupportedFile { .. } => "UNSUPPORTED_FILE",
            AppError::NoFileSelected => "NO_FILE_SELECTED",
            AppError::ValidationError { .. } => "VALIDATION_ERROR",
            AppError::Busy => "BUSY",
            AppError::TransportError { .. } => "TRANSPORT_ERROR",
            AppError::InvalidResponse => "INVALID_RESPONSE",
            AppError::ProcessingFailed { .. } => "PROCESSING_FAILED",
            AppError::ConfigError { .. } => "CONFIG_ERROR",
            AppError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// True for errors raised before anything was sent to the backend.
    pub fn is_rejected_before_dispatch(&self) -> bool {
        matches!(
            self,
            AppError::UnsupportedFile { .. }
                | AppError::NoFileSelected
                | AppError::ValidationError { .. }
                | AppError::Busy
        )
    }
}

// Convert common errors to AppError
impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal {
            message: format!("IO error: {}", err),
        }
    }
}

// Helper methods for creating specific errors
impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::ValidationError {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        AppError::ConfigError {
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        AppError::TransportError {
            message: message.into(),
        }
    }

    pub fn processing_failed(detail: Option<String>) -> Self {
        AppError::ProcessingFailed { detail }
    }
}
