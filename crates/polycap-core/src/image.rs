//! Image payloads for the captioning stage.
//!
//! Images are never decoded or resized; bytes are checked for a known
//! signature and size, then base64-encoded for the `images` field.

use base64::Engine;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::config::LimitsConfig;
use crate::error::{PipelineError, PipelineResult};

/// Base64-encoded image ready to send to the inference server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInput {
    /// Base64-encoded image bytes
    pub data: String,
    /// MIME type (e.g., "image/jpeg", "image/png")
    pub media_type: String,
}

impl ImageInput {
    /// Create an `ImageInput` from raw bytes and format string.
    ///
    /// The format is the image format identifier (e.g., "jpeg", "png", "webp").
    pub fn from_bytes(bytes: &[u8], format: &str) -> Self {
        Self {
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
            media_type: media_type_for(format).to_string(),
        }
    }

    /// Wrap a payload that is already base64-encoded (e.g. from a browser upload).
    pub fn from_base64(data: &str) -> Self {
        Self {
            data: data.trim().to_string(),
            media_type: "application/octet-stream".to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

fn media_type_for(format: &str) -> &'static str {
    match format {
        "jpeg" | "jpg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        other => {
            tracing::warn!("Unknown image format '{other}', defaulting to image/jpeg");
            "image/jpeg"
        }
    }
}

/// Reads image files from disk with size and signature checks.
pub struct ImageLoader {
    limits: LimitsConfig,
}

impl ImageLoader {
    /// Create a new loader with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Read, validate and encode an image file.
    ///
    /// Checks:
    /// - File exists and is readable (`~` is expanded)
    /// - File size is within limits
    /// - File starts with JPEG, PNG, WebP or GIF magic bytes
    pub fn load(&self, path: &Path) -> PipelineResult<ImageInput> {
        let path = expand(path);

        let metadata = std::fs::metadata(&path).map_err(|e| PipelineError::ImageRead {
            path: path.clone(),
            message: e.to_string(),
        })?;
        if !metadata.is_file() {
            return Err(PipelineError::ImageRead {
                path,
                message: "not a regular file".to_string(),
            });
        }

        let max_bytes = self.limits.max_image_size_mb.saturating_mul(1024 * 1024);
        if metadata.len() > max_bytes {
            return Err(PipelineError::ImageTooLarge {
                path,
                size_mb: metadata.len() / (1024 * 1024),
                max_mb: self.limits.max_image_size_mb,
            });
        }

        let mut bytes = Vec::with_capacity(metadata.len() as usize);
        std::fs::File::open(&path)
            .and_then(|mut f| f.read_to_end(&mut bytes))
            .map_err(|e| PipelineError::ImageRead {
                path: path.clone(),
                message: e.to_string(),
            })?;

        let format = detect_format(&bytes).ok_or_else(|| PipelineError::UnsupportedImage {
            path: path.clone(),
            message: "Unrecognized image format (invalid magic bytes)".to_string(),
        })?;

        tracing::debug!(
            path = %path.display(),
            format,
            bytes = bytes.len(),
            "Loaded image"
        );
        Ok(ImageInput::from_bytes(&bytes, format))
    }
}

fn expand(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&path_str).into_owned())
}

/// Identify the image format from its leading bytes.
pub fn detect_format(header: &[u8]) -> Option<&'static str> {
    // JPEG: FF D8 FF
    if header.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some("jpeg");
    }
    // PNG: 89 50 4E 47
    if header.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
        return Some("png");
    }
    // WebP: RIFF....WEBP
    if header.len() >= 12 && &header[0..4] == b"RIFF" && &header[8..12] == b"WEBP" {
        return Some("webp");
    }
    // GIF: GIF8
    if header.starts_with(b"GIF8") {
        return Some("gif");
    }
    None
}
