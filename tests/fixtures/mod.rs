//! Shared report fixtures

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

use waste_report::models::classification::ClassificationResult;
use waste_report::models::report::{Coordinates, EncodedPhoto, ReportDraft, ReportType};
use waste_report::services::location::AddressComponents;

pub const TITLE: &str = "Overflowing bin";
pub const DETAILS: &str = "The public bin at the bus stop has been overflowing since Monday.";

pub const COORDS: Coordinates = Coordinates {
    latitude: 51.5072,
    longitude: -0.1276,
};

pub fn geocoded_address() -> AddressComponents {
    AddressComponents {
        name: Some("Trafalgar Square".to_string()),
        street: Some("Charing Cross".to_string()),
        city: Some("London".to_string()),
        region: Some("England".to_string()),
        postal_code: Some("WC2N 5DN".to_string()),
        country: Some("United Kingdom".to_string()),
    }
}

pub const EXPECTED_ADDRESS: &str =
    "Trafalgar Square\nCharing Cross\nLondon, England WC2N 5DN\nUnited Kingdom";

/// Small solid-colour PNG, as a camera would hand it over.
pub fn png_photo(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([120, 110, 95])));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)
        .expect("encode fixture png");
    buf.into_inner()
}

pub fn verified_waste() -> ClassificationResult {
    ClassificationResult {
        label: "garbage bag".to_string(),
        confidence: 0.96,
        is_waste: true,
        is_verified_waste: true,
    }
}

pub fn possible_waste(confidence: f64) -> ClassificationResult {
    ClassificationResult {
        label: "cardboard".to_string(),
        confidence,
        is_waste: true,
        is_verified_waste: false,
    }
}

pub fn not_waste() -> ClassificationResult {
    ClassificationResult {
        label: "dog".to_string(),
        confidence: 0.91,
        is_waste: false,
        is_verified_waste: false,
    }
}

/// A draft with every required field, carrying a photo of `photo_bytes`
/// decoded bytes.
pub fn complete_draft(photo_bytes: usize) -> ReportDraft {
    ReportDraft {
        title: TITLE.to_string(),
        details: DETAILS.to_string(),
        address: EXPECTED_ADDRESS.to_string(),
        coordinates: Some(COORDS),
        photo: Some(EncodedPhoto {
            uri: "evidence.jpg".to_string(),
            base64: STANDARD.encode(vec![0xFFu8; photo_bytes]),
        }),
        photo_timestamp: Some("2024-05-01T10:00:00.000Z".to_string()),
        report_type: ReportType::Standard,
        classification: None,
    }
}
