use garde::Validate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::models::classification::ClassificationResult;

/// Maximum title length accepted by the form.
pub const TITLE_MAX_CHARS: usize = 100;

/// Maximum details length accepted by the form.
pub const DETAILS_MAX_CHARS: usize = 500;

/// Category of a waste report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ReportType {
    #[default]
    Standard,
    Hazardous,
    Large,
}

/// GPS position of the reported waste.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct Coordinates {
    #[garde(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[garde(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

/// Normalized evidence photo: a JPEG encoded as base64.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedPhoto {
    /// Where the photo came from (file path or device URI).
    pub uri: String,
    pub base64: String,
}

/// The in-progress, unsubmitted report.
///
/// Fields are filled in incrementally by the screen handlers. Setters apply
/// the same input limits as the form; `validate` re-checks them.
#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct ReportDraft {
    #[garde(length(chars, max = 100))]
    pub title: String,

    #[garde(length(chars, max = 500))]
    pub details: String,

    /// Derived from reverse geocoding; read-only to the user.
    #[garde(skip)]
    pub address: String,

    #[garde(dive)]
    pub coordinates: Option<Coordinates>,

    #[garde(skip)]
    pub photo: Option<EncodedPhoto>,

    /// ISO-8601, from EXIF or capture time.
    #[garde(skip)]
    pub photo_timestamp: Option<String>,

    #[garde(skip)]
    pub report_type: ReportType,

    #[garde(skip)]
    pub classification: Option<ClassificationResult>,
}

impl ReportDraft {
    pub fn set_title(&mut self, title: &str) {
        self.title = title.chars().take(TITLE_MAX_CHARS).collect();
    }

    pub fn set_details(&mut self, details: &str) {
        self.details = details.chars().take(DETAILS_MAX_CHARS).collect();
    }

    pub fn set_report_type(&mut self, report_type: ReportType) {
        self.report_type = report_type;
    }

    pub fn set_coordinates(&mut self, coordinates: Coordinates) {
        self.coordinates = Some(coordinates);
    }

    pub fn set_address(&mut self, address: String) {
        self.address = address;
    }

    /// Attach a freshly captured photo. Any earlier classification belongs to
    /// the old photo and is dropped.
    pub fn attach_photo(&mut self, photo: EncodedPhoto, timestamp: String) {
        self.photo = Some(photo);
        self.photo_timestamp = Some(timestamp);
        self.classification = None;
    }

    /// Retake: forget the photo and its classification.
    pub fn clear_photo(&mut self) {
        self.photo = None;
        self.classification = None;
    }

    /// Back to the initial empty state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// JSON body sent to `POST /report`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPayload {
    pub title: String,
    pub details: String,
    pub address: String,
    pub image: String,
    pub latitude: f64,
    pub longitude: f64,
    pub photo_timestamp: Option<String>,
    pub report_type: ReportType,
    pub classification: Option<ClassificationResult>,
}
