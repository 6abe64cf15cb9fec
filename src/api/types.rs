//! Request and response types for the analysis API.

use crate::classifier::{AnalysisResult, Locale};
use crate::upload::UploadError;
use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};

/// Query string of `POST /analyze-image`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalyzeImageQuery {
    /// Rewrite the caption into a fuller maintenance note.
    #[serde(default)]
    pub expand: bool,
    /// Target locale for a translated description.
    pub translate: Option<String>,
    /// Classifier locale; defaults to `analysis.default_locale`.
    pub locale: Option<String>,
}

/// Result of analysing one uploaded photo.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAnalysisResponse {
    pub success: bool,
    pub filename: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expanded_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translated_description: Option<String>,
    pub analysis: AnalysisResult,
    pub is_maintenance_related: bool,
    pub word_count: usize,
    /// Strategy that produced `description`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ImageAnalysisResponse {
    /// Entry for an upload that could not be analysed.
    pub fn failed(filename: impl Into<String>, locale: Locale, error: &UploadError) -> Self {
        let (description, reason) = match error {
            UploadError::TooSmall { .. } => (
                "Image is too small for analysis".to_string(),
                "Image too small for detailed analysis",
            ),
            other => (
                format!("Failed to process image: {}", other),
                "Analysis failed due to processing error",
            ),
        };
        Self {
            success: false,
            filename: filename.into(),
            description,
            expanded_description: None,
            translated_description: None,
            analysis: AnalysisResult::unavailable(locale, reason),
            is_maintenance_related: false,
            word_count: 0,
            strategy: None,
            error: Some(error.to_string()),
        }
    }

    /// Entry for an unexpected failure inside the analysis pipeline.
    pub fn internal_failure(filename: impl Into<String>, locale: Locale, message: &str) -> Self {
        Self {
            success: false,
            filename: filename.into(),
            description: format!("Image analysis failed: {}", message),
            expanded_description: None,
            translated_description: None,
            analysis: AnalysisResult::unavailable(
                locale,
                "Analysis failed due to processing error",
            ),
            is_maintenance_related: false,
            word_count: 0,
            strategy: None,
            error: Some(message.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultipleImagesResponse {
    pub results: Vec<ImageAnalysisResponse>,
}

/// Body of `POST /analyze-request`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyzeRequestBody {
    pub user_text: String,
    pub image_descriptions: Vec<String>,
    pub locale: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequestResponse {
    pub summary: String,
    pub urgency_level: u8,
    /// Strategy that produced `summary`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urgency_strategy: Option<String>,
    /// Set when the pipeline failed and rules produced the answer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<bool>,
}

/// Bare `{"message": ...}` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SummarizeRequest {
    pub text: String,
    #[serde(default)]
    pub locale: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizeResponse {
    pub summary: String,
    pub strategy: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TranslateRequest {
    pub text: String,
    pub target: String,
    /// Source locale; defaults to `analysis.default_locale`.
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateResponse {
    pub translation: String,
    pub target: Locale,
    pub strategy: String,
}

/// Error response envelope.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiError {
    pub error: ApiErrorBody,
}

/// Error details.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiErrorBody {
    pub message: String,
    pub r#type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ApiError {
    /// Create a bad request error (400).
    pub fn bad_request(message: &str) -> Self {
        Self {
            error: ApiErrorBody {
                message: message.to_string(),
                r#type: "invalid_request_error".to_string(),
                param: None,
                code: Some("invalid_request_error".to_string()),
            },
        }
    }

    /// Create a bad request error (400) naming the offending parameter.
    pub fn invalid_param(param: &str, message: &str) -> Self {
        Self {
            error: ApiErrorBody {
                message: message.to_string(),
                r#type: "invalid_request_error".to_string(),
                param: Some(param.to_string()),
                code: Some("invalid_request_error".to_string()),
            },
        }
    }

    /// Create a rejected upload error (400).
    pub fn invalid_image(message: &str) -> Self {
        Self {
            error: ApiErrorBody {
                message: message.to_string(),
                r#type: "invalid_request_error".to_string(),
                param: Some("file".to_string()),
                code: Some("invalid_image".to_string()),
            },
        }
    }

    /// Create a payload too large error (413).
    pub fn payload_too_large(message: &str) -> Self {
        Self {
            error: ApiErrorBody {
                message: message.to_string(),
                r#type: "invalid_request_error".to_string(),
                param: None,
                code: Some("payload_too_large".to_string()),
            },
        }
    }

    /// Create an internal server error (500).
    pub fn internal(message: &str) -> Self {
        Self {
            error: ApiErrorBody {
                message: message.to_string(),
                r#type: "server_error".to_string(),
                param: None,
                code: Some("internal_error".to_string()),
            },
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self.error.code.as_deref() {
            Some("invalid_request_error") | Some("invalid_image") => StatusCode::BAD_REQUEST,
            Some("payload_too_large") => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        ApiError::invalid_image(&err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return ApiError::payload_too_large(&rejection.body_text());
        }
        ApiError::bad_request(&rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return ApiError::payload_too_large(&err.body_text());
        }
        ApiError::bad_request(&err.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::bad_request(&rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::bad_request(&rejection.body_text())
    }
}

/// Parse an optional locale parameter, falling back to `default`.
pub fn parse_locale(value: Option<&str>, default: Locale, param: &str) -> Result<Locale, ApiError> {
    match value {
        None => Ok(default),
        Some(v) if v.trim().is_empty() => Ok(default),
        Some(v) => v.parse().map_err(|e: String| ApiError::invalid_param(param, &e)),
    }
}
