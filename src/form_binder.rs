// src/form_binder.rs
use crate::types::{CvField, CvRecord, UnknownField};
use base64::Engine;
use std::path::Path;
use tokio::fs;
use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error(transparent)]
    UnknownField(#[from] UnknownField),
    #[error("field '{0}' is set through the photo picker, not as text")]
    NotATextField(CvField),
    #[error(transparent)]
    Photo(#[from] PhotoError),
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct PhotoError {
    pub error_type: PhotoErrorType,
    pub message: String,
    pub suggestion: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoErrorType {
    EmptyFile,
    NotAnImage,
    UnreadableFile,
}

impl PhotoErrorType {
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyFile => "IMAGE_EMPTY",
            Self::NotAnImage => "IMAGE_WRONG_FORMAT",
            Self::UnreadableFile => "IMAGE_UNREADABLE",
        }
    }
}

/// Applies one text input event to the record. Last write wins per field.
pub fn apply_edit(record: &mut CvRecord, field: &str, value: String) -> Result<CvField, FormError> {
    let field: CvField = field.parse()?;
    if field == CvField::Image {
        return Err(FormError::NotATextField(field));
    }
    debug!("Field '{}' updated ({} chars)", field, value.chars().count());
    record.set(field, value);
    Ok(field)
}

/// Stores an already encoded photo payload in the record.
pub fn apply_photo(record: &mut CvRecord, data_url: String) {
    record.set(CvField::Image, data_url);
}

/// Encodes uploaded bytes as a `data:` URL.
///
/// The only check is the `image/*` picker filter: the bytes must be a
/// recognizable image. Size is not limited here.
pub fn encode_photo(bytes: &[u8]) -> Result<String, PhotoError> {
    if bytes.is_empty() {
        return Err(PhotoError {
            error_type: PhotoErrorType::EmptyFile,
            message: "Profile image file is empty".to_string(),
            suggestion: "Please upload a valid image file".to_string(),
        });
    }

    let format = image::guess_format(bytes).map_err(|_| PhotoError {
        error_type: PhotoErrorType::NotAnImage,
        message: "Selected file is not an image".to_string(),
        suggestion: "Please pick a PNG, JPEG, GIF or WebP image".to_string(),
    })?;

    let payload = base64::engine::general_purpose::STANDARD.encode(bytes);
    Ok(format!("data:{};base64,{}", format.to_mime_type(), payload))
}

/// Reads a picked file fully into memory and encodes it.
pub async fn read_photo(path: &Path) -> Result<String, PhotoError> {
    let bytes = fs::read(path).await.map_err(|e| {
        warn!("Cannot read photo {}: {}", path.display(), e);
        PhotoError {
            error_type: PhotoErrorType::UnreadableFile,
            message: format!("Cannot read image file: {}", e),
            suggestion: "Check file permissions or pick another image".to_string(),
        }
    })?;
    encode_photo(&bytes)
}
