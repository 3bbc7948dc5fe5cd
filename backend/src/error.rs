//! Error handling for the Crop Advisor
//!
//! Every failure degrades a single panel: the response carries a
//! user-facing message and the other endpoints keep working.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Dataset errors
    #[error("Dataset not available: {path}")]
    DatasetUnavailable { path: String },

    #[error("Dataset error: {0}")]
    Dataset(String),

    // Model errors
    #[error("Unseen {column} category: {value}")]
    UnseenCategory { column: String, value: String },

    #[error("Model error: {0}")]
    Model(String),

    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("{}", shared::INVALID_PRICE_MESSAGE)]
    InvalidPrice,

    // External service errors
    #[error("Weather service unavailable")]
    WeatherServiceUnavailable,

    #[error("Market price service unavailable")]
    MarketServiceUnavailable,

    #[error("Configuration error: {0}")]
    Configuration(String),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Stable machine-readable code sent to clients
    pub fn code(&self) -> &'static str {
        match self {
            AppError::DatasetUnavailable { .. } => "DATASET_UNAVAILABLE",
            AppError::Dataset(_) => "DATASET_ERROR",
            AppError::UnseenCategory { .. } => "UNSEEN_CATEGORY",
            AppError::Model(_) => "MODEL_ERROR",
            AppError::Validation { .. } => "VALIDATION_ERROR",
            AppError::InvalidPrice => "INVALID_PRICE",
            AppError::WeatherServiceUnavailable => "WEATHER_SERVICE_UNAVAILABLE",
            AppError::MarketServiceUnavailable => "MARKET_SERVICE_UNAVAILABLE",
            AppError::Configuration(_) => "CONFIGURATION_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::DatasetUnavailable { .. }
            | AppError::WeatherServiceUnavailable
            | AppError::MarketServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            AppError::UnseenCategory { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Validation { .. } | AppError::InvalidPrice => StatusCode::BAD_REQUEST,
            AppError::Dataset(_)
            | AppError::Model(_)
            | AppError::Configuration(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match &self {
            AppError::DatasetUnavailable { path } => format!(
                "Dataset {} could not be loaded; this panel is disabled",
                path
            ),
            AppError::UnseenCategory { column, value } => format!(
                "'{}' is not a known {} in the training data",
                value, column
            ),
            AppError::WeatherServiceUnavailable => {
                "Weather service is temporarily unavailable".to_string()
            }
            AppError::MarketServiceUnavailable => {
                "Market price service is temporarily unavailable".to_string()
            }
            AppError::Validation { message, .. } => message.clone(),
            AppError::InvalidPrice => shared::INVALID_PRICE_MESSAGE.to_string(),
            AppError::Internal(_) => "An internal server error occurred".to_string(),
            other => other.to_string(),
        };

        let field = match &self {
            AppError::Validation { field, .. } => Some(field.clone()),
            AppError::UnseenCategory { column, .. } => Some(column.clone()),
            _ => None,
        };

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        let detail = ErrorDetail {
            code: self.code().to_string(),
            message,
            field,
        };

        (self.status(), Json(ErrorResponse { error: detail })).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field = errors
            .field_errors()
            .keys()
            .next()
            .map(|f| f.to_string())
            .unwrap_or_default();
        AppError::Validation {
            message: format!("Reading out of range: {}", field),
            field,
        }
    }
}

impl From<csv::Error> for AppError {
    fn from(e: csv::Error) -> Self {
        AppError::Dataset(e.to_string())
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
