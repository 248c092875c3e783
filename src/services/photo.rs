//! Evidence photo capture and normalization.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Local, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use std::io::Cursor;
use std::path::PathBuf;

use crate::models::report::EncodedPhoto;
use crate::services::location::PermissionStatus;

/// Width every photo is resized to before upload.
pub const TARGET_WIDTH: u32 = 640;

/// JPEG quality used for the upload copy.
pub const JPEG_QUALITY: u8 = 70;

/// A photo as it comes off the camera.
#[derive(Debug, Clone)]
pub struct CapturedPhoto {
    pub uri: String,
    pub bytes: Vec<u8>,
    /// Raw EXIF `DateTimeOriginal`, e.g. `2024:05:01 10:30:15`.
    pub exif_taken_at: Option<String>,
}

/// Camera or gallery the screen takes photos from.
#[allow(async_fn_in_trait)]
pub trait PhotoSource {
    async fn request_permission(&self) -> PermissionStatus;

    /// Take a photo. `Ok(None)` means the user cancelled.
    async fn capture(&self) -> Result<Option<CapturedPhoto>, PhotoError>;
}

/// Resize to [`TARGET_WIDTH`] (aspect kept) and re-encode as base64 JPEG.
pub fn normalize_photo(photo: &CapturedPhoto) -> Result<EncodedPhoto, PhotoError> {
    if photo.bytes.is_empty() {
        return Err(PhotoError::Empty);
    }

    let img = image::load_from_memory(&photo.bytes)?;
    let height = (img.height() as f64 * TARGET_WIDTH as f64 / img.width() as f64)
        .round()
        .max(1.0) as u32;
    let resized = img.resize_exact(TARGET_WIDTH, height, FilterType::Triangle);

    // JPEG has no alpha channel.
    let rgb = DynamicImage::ImageRgb8(resized.to_rgb8());
    let mut buf = Cursor::new(Vec::new());
    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY))?;

    let jpeg = buf.into_inner();
    tracing::debug!(
        original_bytes = photo.bytes.len(),
        jpeg_bytes = jpeg.len(),
        width = TARGET_WIDTH,
        height,
        "Photo normalized"
    );

    Ok(EncodedPhoto {
        uri: photo.uri.clone(),
        base64: STANDARD.encode(jpeg),
    })
}

/// ISO-8601 timestamp for a photo: the EXIF capture time when it parses,
/// otherwise `captured_at`.
pub fn photo_timestamp(exif_taken_at: Option<&str>, captured_at: DateTime<Utc>) -> String {
    let taken = exif_taken_at.and_then(|raw| {
        let parsed = parse_exif_datetime(raw);
        if parsed.is_none() {
            tracing::warn!(value = %raw, "Failed to parse EXIF date");
        }
        parsed
    });

    taken
        .unwrap_or(captured_at)
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse an EXIF date (`YYYY:MM:DD HH:MM:SS`, device local time) into UTC.
pub fn parse_exif_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim().trim_end_matches('\0');
    let naive = NaiveDateTime::parse_from_str(raw, "%Y:%m:%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S"))
        .ok()?;

    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
}

/// Read `DateTimeOriginal` (or `DateTime`) from image bytes.
pub fn read_exif_datetime(bytes: &[u8]) -> Option<String> {
    let exif = exif::Reader::new()
        .read_from_container(&mut Cursor::new(bytes))
        .ok()?;

    [exif::Tag::DateTimeOriginal, exif::Tag::DateTime]
        .into_iter()
        .filter_map(|tag| exif.get_field(tag, exif::In::PRIMARY))
        .find_map(|field| match &field.value {
            exif::Value::Ascii(values) => values
                .first()
                .map(|v| String::from_utf8_lossy(v).into_owned()),
            _ => None,
        })
}

/// Photo source reading an image file from disk.
#[derive(Debug, Clone)]
pub struct FilePhotoSource {
    path: PathBuf,
}

impl FilePhotoSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PhotoSource for FilePhotoSource {
    async fn request_permission(&self) -> PermissionStatus {
        match tokio::fs::metadata(&self.path).await {
            Ok(meta) if meta.is_file() => PermissionStatus::Granted,
            _ => PermissionStatus::Denied,
        }
    }

    async fn capture(&self) -> Result<Option<CapturedPhoto>, PhotoError> {
        let bytes = tokio::fs::read(&self.path).await?;
        let exif_taken_at = read_exif_datetime(&bytes);

        Ok(Some(CapturedPhoto {
            uri: self.path.display().to_string(),
            bytes,
            exif_taken_at,
        }))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PhotoError {
    #[error("Failed to read photo: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to process photo: {0}")]
    Image(#[from] image::ImageError),

    #[error("Photo is empty")]
    Empty,
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, image::Rgb([90, 140, 60])));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_normalize_resizes_to_target_width() {
        let photo = CapturedPhoto {
            uri: "bin.png".to_string(),
            bytes: png_bytes(1280, 960),
            exif_taken_at: None,
        };

        let encoded = normalize_photo(&photo).unwrap();
        let jpeg = STANDARD.decode(&encoded.base64).unwrap();

        assert_eq!(image::guess_format(&jpeg).unwrap(), ImageFormat::Jpeg);
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (TARGET_WIDTH, 480));
        assert_eq!(encoded.uri, "bin.png");
    }

    #[test]
    fn test_normalize_rejects_garbage() {
        let photo = CapturedPhoto {
            uri: "bad.jpg".to_string(),
            bytes: b"not an image".to_vec(),
            exif_taken_at: None,
        };
        assert!(matches!(normalize_photo(&photo), Err(PhotoError::Image(_))));
    }

    #[test]
    fn test_normalize_rejects_empty() {
        let photo = CapturedPhoto {
            uri: "empty.jpg".to_string(),
            bytes: Vec::new(),
            exif_taken_at: None,
        };
        assert!(matches!(normalize_photo(&photo), Err(PhotoError::Empty)));
    }

    #[test]
    fn test_exif_datetime_is_local_time() {
        let parsed = parse_exif_datetime("2024:05:01 10:30:15").unwrap();
        let naive =
            NaiveDateTime::parse_from_str("2024-05-01 10:30:15", "%Y-%m-%d %H:%M:%S").unwrap();
        let expected = Local.from_local_datetime(&naive).earliest().unwrap().with_timezone(&Utc);
        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_timestamp_falls_back_to_capture_time() {
        let captured_at = Utc.with_ymd_and_hms(2024, 6, 2, 8, 0, 0).unwrap();
        assert_eq!(photo_timestamp(None, captured_at), "2024-06-02T08:00:00.000Z");
        assert_eq!(
            photo_timestamp(Some("garbage"), captured_at),
            "2024-06-02T08:00:00.000Z"
        );
    }

    #[test]
    fn test_timestamp_prefers_exif() {
        let captured_at = Utc.with_ymd_and_hms(2024, 6, 2, 8, 0, 0).unwrap();
        let stamp = photo_timestamp(Some("2023:12:24 18:00:00"), captured_at);
        assert!(stamp.starts_with("2023-12-2"));
        assert!(stamp.ends_with(".000Z"));
    }

    #[test]
    fn test_no_exif_in_plain_png() {
        assert!(read_exif_datetime(&png_bytes(4, 4)).is_none());
    }

    #[tokio::test]
    async fn test_file_source_reads_photo() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("evidence.png");
        std::fs::write(&path, png_bytes(64, 48)).unwrap();

        let source = FilePhotoSource::new(&path);
        assert_eq!(source.request_permission().await, PermissionStatus::Granted);

        let captured = source.capture().await.unwrap().unwrap();
        assert_eq!(captured.bytes.len(), std::fs::metadata(&path).unwrap().len() as usize);
        assert!(captured.exif_taken_at.is_none());
    }

    #[tokio::test]
    async fn test_missing_file_is_denied() {
        let source = FilePhotoSource::new("/nonexistent/evidence.jpg");
        assert_eq!(source.request_permission().await, PermissionStatus::Denied);
        assert!(matches!(source.capture().await, Err(PhotoError::Io(_))));
    }
}
