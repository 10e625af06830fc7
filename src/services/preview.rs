use crate::error::AppError;
use crate::services::fs_service::StagedFile;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use std::io::Cursor;
use std::sync::Arc;

const PREVIEW_SIZE: u32 = 200;
const PREVIEW_QUALITY: u8 = 60;

/// JPEG preview bytes for a staged file, EXIF orientation applied.
pub fn generate_preview_bytes(bytes: &[u8]) -> Result<Vec<u8>, AppError> {
    let orientation = read_orientation(bytes);

    let mut img = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .decode()?;

    // Cheap pass first on very large images, then a proper filter.
    let intermediate_size = PREVIEW_SIZE * 4;
    if img.width() > intermediate_size * 2 || img.height() > intermediate_size * 2 {
        img = img.resize(intermediate_size, intermediate_size, FilterType::Nearest);
    }
    img = img.resize(PREVIEW_SIZE, PREVIEW_SIZE, FilterType::Triangle);

    if orientation != 1 {
        img = apply_orientation(img, orientation);
    }

    encode_jpeg(&img)
}

/// Preview as a `data:` URI the upload card can show directly.
pub fn generate_preview(file: &StagedFile) -> Result<String, AppError> {
    let bytes = generate_preview_bytes(&file.bytes)?;
    let b64 = base64::engine::general_purpose::STANDARD.encode(&bytes);
    Ok(format!("data:image/jpeg;base64,{}", b64))
}

/// Decoding a 32 MiB image is slow; keep it off the async threads.
pub async fn generate_preview_async(file: &StagedFile) -> Result<String, AppError> {
    let file = StagedFile {
        name: file.name.clone(),
        mime_type: file.mime_type.clone(),
        bytes: Arc::clone(&file.bytes),
    };
    tokio::task::spawn_blocking(move || generate_preview(&file))
        .await
        .map_err(|e| AppError::Io(format!("Preview task join failed: {}", e)))?
}

fn encode_jpeg(img: &DynamicImage) -> Result<Vec<u8>, AppError> {
    // JPEG has no alpha channel.
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, PREVIEW_QUALITY);
    rgb.write_with_encoder(encoder)?;
    Ok(buffer.into_inner())
}

/// EXIF orientation tag, 1 when absent or unreadable.
fn read_orientation(bytes: &[u8]) -> u32 {
    let exif = match exif::Reader::new().read_from_container(&mut Cursor::new(bytes)) {
        Ok(e) => e,
        Err(_) => return 1,
    };

    match exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY) {
        Some(field) => match field.value {
            exif::Value::Short(ref v) => v.first().copied().map(u32::from).unwrap_or(1),
            exif::Value::Long(ref v) => v.first().copied().unwrap_or(1),
            _ => 1,
        },
        None => 1,
    }
}

fn apply_orientation(img: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        2 => img.fliph(),
        3 => img.rotate180(),
        4 => img.flipv(),
        5 => img.fliph().rotate90(),
        6 => img.rotate90(),
        7 => img.fliph().rotate270(),
        8 => img.rotate270(),
        _ => img,
    }
}
