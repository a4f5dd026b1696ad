//! Payment screenshot persistence
//!
//! Buyers upload a transfer screenshot at checkout; admins eyeball it
//! before flipping `paymentConfirmed`. Files are decoded, re-encoded as
//! JPEG and stored under a content-hash name, so re-uploads of the same
//! image land on the same file.

use image::ImageFormat;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Cursor;
use std::path::Path;

use crate::utils::AppError;

/// Maximum file size (5MB)
const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

/// Supported image formats
const SUPPORTED_FORMATS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// SHA256 hex of the encoded bytes
fn calculate_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Validate and persist an uploaded screenshot, returning the stored
/// filename (relative to the uploads dir).
pub fn save_payment_screenshot(
    uploads_dir: &Path,
    original_name: &str,
    data: &[u8],
) -> Result<String, AppError> {
    if data.is_empty() {
        return Err(AppError::validation("Screenshot file is empty"));
    }
    if data.len() > MAX_FILE_SIZE {
        return Err(AppError::validation(format!(
            "Screenshot too large ({} bytes, max {})",
            data.len(),
            MAX_FILE_SIZE
        )));
    }

    let ext = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    if !SUPPORTED_FORMATS.contains(&ext.as_str()) {
        return Err(AppError::validation(format!(
            "Unsupported screenshot format: {:?} (allowed: {})",
            ext,
            SUPPORTED_FORMATS.join(", ")
        )));
    }
    let mime = mime_guess::from_ext(&ext).first_or_octet_stream();
    if mime.type_() != mime_guess::mime::IMAGE {
        return Err(AppError::validation("Screenshot must be an image"));
    }

    // Decode to prove it's actually an image, not just named like one.
    let img = image::load_from_memory(data)
        .map_err(|e| AppError::validation(format!("Invalid image data: {e}")))?;

    let mut jpeg = Vec::new();
    img.write_to(&mut Cursor::new(&mut jpeg), ImageFormat::Jpeg)
        .map_err(|e| AppError::internal(format!("Failed to encode screenshot: {e}")))?;

    let filename = format!("{}.jpg", calculate_hash(&jpeg));
    fs::create_dir_all(uploads_dir)
        .map_err(|e| AppError::internal(format!("Failed to create uploads dir: {e}")))?;
    let path = uploads_dir.join(&filename);
    if !path.exists() {
        fs::write(&path, &jpeg)
            .map_err(|e| AppError::internal(format!("Failed to write screenshot: {e}")))?;
    }

    Ok(filename)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, RgbImage};

    fn png_bytes() -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, image::Rgb([200, 30, 30])));
        let mut out = Vec::new();
        img.write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
            .unwrap();
        out
    }

    #[test]
    fn saves_valid_png_as_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let name = save_payment_screenshot(dir.path(), "proof.png", &png_bytes()).unwrap();
        assert!(name.ends_with(".jpg"));
        assert!(dir.path().join(&name).exists());
    }

    #[test]
    fn identical_uploads_dedupe() {
        let dir = tempfile::tempdir().unwrap();
        let a = save_payment_screenshot(dir.path(), "one.png", &png_bytes()).unwrap();
        let b = save_payment_screenshot(dir.path(), "two.png", &png_bytes()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_wrong_extension() {
        let dir = tempfile::tempdir().unwrap();
        assert!(save_payment_screenshot(dir.path(), "proof.pdf", &png_bytes()).is_err());
    }

    #[test]
    fn rejects_non_image_bytes() {
        let dir = tempfile::tempdir().unwrap();
        assert!(save_payment_screenshot(dir.path(), "proof.png", b"not an image").is_err());
    }

    #[test]
    fn rejects_oversized_upload() {
        let dir = tempfile::tempdir().unwrap();
        let big = vec![0u8; MAX_FILE_SIZE + 1];
        assert!(save_payment_screenshot(dir.path(), "proof.png", &big).is_err());
    }

    #[test]
    fn rejects_empty_upload() {
        let dir = tempfile::tempdir().unwrap();
        assert!(save_payment_screenshot(dir.path(), "proof.png", b"").is_err());
    }
}
