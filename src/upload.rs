//! Image upload validation.
//!
//! An upload is accepted when its content type names an image, the bytes
//! decode to known dimensions, and both dimensions reach the configured
//! minimum. Only the header is decoded; pixel data is never materialized.

use crate::strategy::CaptionInput;
use std::io::Cursor;
use std::sync::Arc;
use thiserror::Error;

/// Upload validation errors, all reported to the client as 400.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UploadError {
    #[error("Uploaded file is empty")]
    Empty,

    #[error("File must be an image")]
    NotAnImage,

    #[error("Could not decode image: {0}")]
    Undecodable(String),

    #[error("Image is too small ({width}x{height}, minimum {min}x{min})")]
    TooSmall { width: u32, height: u32, min: u32 },
}

/// One file from a multipart form.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: String,
    /// Declared content type, if the client sent one.
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(filename: impl Into<String>, content_type: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content_type,
            bytes,
        }
    }

    /// Declared content type, or one guessed from the file extension.
    pub fn effective_content_type(&self) -> Option<String> {
        match &self.content_type {
            Some(ct) if !ct.is_empty() && ct != "application/octet-stream" => Some(ct.clone()),
            _ => mime_guess::from_path(&self.filename)
                .first()
                .map(|m| m.essence_str().to_string()),
        }
    }

    /// Validate the upload and turn it into caption chain input.
    pub fn validate(self, min_dimension: u32) -> Result<CaptionInput, UploadError> {
        if self.bytes.is_empty() {
            return Err(UploadError::Empty);
        }

        let is_image = self
            .effective_content_type()
            .is_some_and(|ct| ct.to_ascii_lowercase().starts_with("image/"));
        if !is_image {
            return Err(UploadError::NotAnImage);
        }

        let (width, height) = image_dimensions(&self.bytes)?;
        if width < min_dimension || height < min_dimension {
            return Err(UploadError::TooSmall {
                width,
                height,
                min: min_dimension,
            });
        }

        Ok(CaptionInput {
            filename: self.filename,
            bytes: Arc::from(self.bytes),
            width,
            height,
        })
    }
}

/// Read width and height from the image header.
pub fn image_dimensions(bytes: &[u8]) -> Result<(u32, u32), UploadError> {
    image::io::Reader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| UploadError::Undecodable(e.to_string()))?
        .into_dimensions()
        .map_err(|e| UploadError::Undecodable(e.to_string()))
}
