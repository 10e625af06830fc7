use crate::error::{AppError, InvalidFileReason};
use std::path::Path;
use std::sync::Arc;

pub const ALLOWED_MIME_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 32 * 1024 * 1024;

const IMAGE_EXTENSIONS: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("bmp", "image/bmp"),
    ("tiff", "image/tiff"),
    ("tif", "image/tiff"),
    ("svg", "image/svg+xml"),
    ("txt", "text/plain"),
];

/// A file the user picked, before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedFile {
    pub name: String,
    /// Type declared by the picker; `None` when unknown.
    pub mime_type: Option<String>,
    pub bytes: Arc<[u8]>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, mime_type: Option<&str>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(str::to_ascii_lowercase),
            bytes: bytes.into(),
        }
    }

    /// Reads a file from disk, taking the declared type from its extension.
    pub async fn from_path(path: &Path) -> Result<Self, AppError> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            AppError::Io(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        Ok(Self::new(name, mime_from_extension(path), bytes))
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// A file that passed validation and is ready to upload.
#[derive(Debug, Clone, PartialEq)]
pub struct StagedFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Arc<[u8]>,
}

impl StagedFile {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn size_label(&self) -> String {
        format_file_size(self.size())
    }
}

pub fn mime_from_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    IMAGE_EXTENSIONS
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, mime)| *mime)
}

/// Declared type when present, otherwise sniffed from the magic bytes.
pub fn resolve_mime(file: &SelectedFile) -> Option<String> {
    if let Some(declared) = &file.mime_type {
        return Some(declared.clone());
    }
    image::guess_format(&file.bytes)
        .ok()
        .map(|format| format.to_mime_type().to_string())
}

/// Checks type and size. Nothing here touches the network.
pub fn validate(file: &SelectedFile, max_bytes: u64) -> Result<StagedFile, AppError> {
    let mime_type = resolve_mime(file).ok_or(AppError::InvalidFile {
        reason: InvalidFileReason::UnsupportedType,
    })?;

    if !ALLOWED_MIME_TYPES.contains(&mime_type.as_str()) {
        return Err(AppError::InvalidFile {
            reason: InvalidFileReason::UnsupportedType,
        });
    }

    if file.size() > max_bytes {
        return Err(AppError::InvalidFile {
            reason: InvalidFileReason::TooLarge { max_bytes },
        });
    }

    Ok(StagedFile {
        name: file.name.clone(),
        mime_type,
        bytes: file.bytes.clone(),
    })
}

/// Human-readable size with base-1024 units, e.g. `1.5 KB`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let fixed = format!("{:.2}", value);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn png_bytes() -> Vec<u8> {
        let img = image::RgbImage::from_pixel(4, 4, image::Rgb([200, 30, 30]));
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn accepts_declared_image_types() {
        for mime in ALLOWED_MIME_TYPES {
            let file = SelectedFile::new("a", Some(*mime), vec![1u8, 2, 3]);
            assert!(validate(&file, DEFAULT_MAX_UPLOAD_BYTES).is_ok(), "{mime}");
        }
    }

    #[test]
    fn rejects_plain_text() {
        let file = SelectedFile::new("notes.txt", Some("text/plain"), b"hello".to_vec());
        assert_eq!(
            validate(&file, DEFAULT_MAX_UPLOAD_BYTES),
            Err(AppError::InvalidFile {
                reason: InvalidFileReason::UnsupportedType
            })
        );
    }

    #[test]
    fn rejects_oversized_files() {
        let file = SelectedFile::new("big.png", Some("image/png"), vec![0u8; 11]);
        assert_eq!(
            validate(&file, 10),
            Err(AppError::InvalidFile {
                reason: InvalidFileReason::TooLarge { max_bytes: 10 }
            })
        );
        let exact = SelectedFile::new("edge.png", Some("image/png"), vec![0u8; 10]);
        assert!(validate(&exact, 10).is_ok());
    }

    #[test]
    fn sniffs_type_when_none_declared() {
        let file = SelectedFile::new("camera-feed", None, png_bytes());
        let staged = validate(&file, DEFAULT_MAX_UPLOAD_BYTES).unwrap();
        assert_eq!(staged.mime_type, "image/png");

        let junk = SelectedFile::new("mystery", None, b"not an image".to_vec());
        assert!(validate(&junk, DEFAULT_MAX_UPLOAD_BYTES).is_err());
    }

    #[tokio::test]
    async fn loads_from_disk_with_extension_type() {
        let mut tmp = tempfile::Builder::new().suffix(".PNG").tempfile().unwrap();
        tmp.write_all(&png_bytes()).unwrap();
        let file = SelectedFile::from_path(tmp.path()).await.unwrap();
        assert_eq!(file.mime_type.as_deref(), Some("image/png"));
        assert!(file.size() > 0);
    }

    #[test]
    fn formats_sizes_like_the_upload_card() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(500), "500 Bytes");
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(32 * 1024 * 1024), "32 MB");
        assert_eq!(format_file_size(5 * 1024 * 1024 * 1024 * 1024), "5120 GB");
    }
}
