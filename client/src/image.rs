use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::ImageFormat;

use crate::error::ImageFileError;

/// An image file read from disk, not yet part of a workflow.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFile {
    pub name: String,
    pub path: Option<PathBuf>,
    pub mime_type: String,
    pub bytes: Arc<Vec<u8>>,
}

impl ImageFile {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, ImageFileError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|source| ImageFileError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let mut file = Self::from_bytes(name, bytes)?;
        file.path = Some(path.to_path_buf());
        Ok(file)
    }

    /// Accepts the bytes when their magic number, or failing that the file
    /// name's extension, identifies an image format.
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, ImageFileError> {
        let name = name.into();
        let format = image::guess_format(&bytes)
            .ok()
            .or_else(|| ImageFormat::from_path(&name).ok())
            .ok_or_else(|| ImageFileError::NotAnImage(name.clone()))?;

        Ok(Self {
            name,
            path: None,
            mime_type: format.to_mime_type().to_string(),
            bytes: Arc::new(bytes),
        })
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// The image currently held by a workflow. The preview is filled in once
/// rendering finishes.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedImage {
    pub id: u64,
    pub file: ImageFile,
    pub preview: Option<String>,
}

impl SelectedImage {
    pub fn new(id: u64, file: ImageFile) -> Self {
        Self {
            id,
            file,
            preview: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.file.name
    }

    pub fn size(&self) -> u64 {
        self.file.size()
    }

    pub fn mime_type(&self) -> &str {
        &self.file.mime_type
    }

    pub fn upload(&self) -> ImageUpload {
        ImageUpload {
            file_name: self.file.name.clone(),
            mime_type: self.file.mime_type.clone(),
            bytes: Arc::clone(&self.file.bytes),
        }
    }
}

/// What a classifier receives for one request.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Arc<Vec<u8>>,
}

/// Encodes image bytes as a `data:` URI.
pub fn render_preview(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}
