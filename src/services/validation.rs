use garde::Validate;
use strum::Display;

use crate::models::classification::ClassificationResult;
use crate::models::report::{Coordinates, EncodedPhoto, ReportDraft, ReportPayload, ReportType};

/// Largest decoded photo the report endpoint accepts (5 MB).
pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

/// Required draft fields, displayed the way the form labels them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum DraftField {
    #[strum(to_string = "Complaint title")]
    Title,
    #[strum(to_string = "Issue details")]
    Details,
    #[strum(to_string = "Location address")]
    Address,
    #[strum(to_string = "Evidence photo")]
    Photo,
    #[strum(to_string = "GPS coordinates")]
    Coordinates,
}

/// A draft that passed validation, borrowed with text fields trimmed.
#[derive(Debug, Clone)]
pub struct ValidatedDraft<'a> {
    pub title: &'a str,
    pub details: &'a str,
    pub address: &'a str,
    pub coordinates: Coordinates,
    pub photo: &'a EncodedPhoto,
    pub photo_timestamp: Option<&'a str>,
    pub report_type: ReportType,
}

impl ValidatedDraft<'_> {
    /// Assemble the `POST /report` body.
    pub fn to_payload(&self, classification: Option<ClassificationResult>) -> ReportPayload {
        ReportPayload {
            title: self.title.to_string(),
            details: self.details.to_string(),
            address: self.address.to_string(),
            image: self.photo.base64.clone(),
            latitude: self.coordinates.latitude,
            longitude: self.coordinates.longitude,
            photo_timestamp: self.photo_timestamp.map(str::to_string),
            report_type: self.report_type,
            classification,
        }
    }
}

/// Check that a draft is submittable.
///
/// Order of checks:
/// - every required field present (title, details and address after trimming)
/// - field limits (title/details length, coordinate ranges)
/// - decoded photo size at most [`MAX_PHOTO_BYTES`]
pub fn validate_draft(draft: &ReportDraft) -> Result<ValidatedDraft<'_>, ValidationError> {
    let missing = missing_fields(draft);

    let (Some(coordinates), Some(photo)) = (draft.coordinates, draft.photo.as_ref()) else {
        return Err(ValidationError::MissingFields(missing));
    };
    if !missing.is_empty() {
        return Err(ValidationError::MissingFields(missing));
    }

    draft
        .validate()
        .map_err(|report| ValidationError::Invalid(report.to_string()))?;

    let bytes = decoded_len(&photo.base64);
    if bytes > MAX_PHOTO_BYTES {
        return Err(ValidationError::PhotoTooLarge { bytes });
    }

    Ok(ValidatedDraft {
        title: draft.title.trim(),
        details: draft.details.trim(),
        address: draft.address.trim(),
        coordinates,
        photo,
        photo_timestamp: draft.photo_timestamp.as_deref(),
        report_type: draft.report_type,
    })
}

/// Required fields that are absent, in form order.
pub fn missing_fields(draft: &ReportDraft) -> Vec<DraftField> {
    let mut missing = Vec::new();

    if draft.title.trim().is_empty() {
        missing.push(DraftField::Title);
    }
    if draft.details.trim().is_empty() {
        missing.push(DraftField::Details);
    }
    if draft.address.trim().is_empty() {
        missing.push(DraftField::Address);
    }
    if draft.photo.as_ref().map_or(true, |p| p.base64.is_empty()) {
        missing.push(DraftField::Photo);
    }
    if draft.coordinates.is_none() {
        missing.push(DraftField::Coordinates);
    }

    missing
}

/// Number of bytes a base64 string decodes to, computed from its length.
///
/// Up to two trailing `=` are treated as padding.
pub fn decoded_len(base64: &str) -> usize {
    let bytes = base64.as_bytes();
    let mut len = bytes.len();
    for _ in 0..2 {
        if len > 0 && bytes[len - 1] == b'=' {
            len -= 1;
        }
    }
    (len * 3) >> 2
}

/// Byte count as megabytes with two decimals, e.g. `5.00`.
pub fn format_megabytes(bytes: usize) -> String {
    format!("{:.2}", bytes as f64 / (1024.0 * 1024.0))
}

fn photo_megabytes(bytes: &usize) -> String {
    format_megabytes(*bytes)
}

fn join_fields(fields: &[DraftField]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please provide: {}", join_fields(.0))]
    MissingFields(Vec<DraftField>),

    #[error("Your photo is {} MB; max is 5 MB.", photo_megabytes(.bytes))]
    PhotoTooLarge { bytes: usize },

    #[error("Please check the report fields: {0}")]
    Invalid(String),
}

impl ValidationError {
    /// Alert title shown with this error.
    pub fn title(&self) -> &'static str {
        match self {
            Self::MissingFields(_) => "Missing Information",
            Self::PhotoTooLarge { .. } => "Image Too Large",
            Self::Invalid(_) => "Invalid Information",
        }
    }
}
