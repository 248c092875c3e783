//! Test doubles for the report API, the UI and the device collaborators

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Instant;

use waste_report::models::classification::ClassificationResult;
use waste_report::models::report::{Coordinates, ReportPayload};
use waste_report::services::api::{
    ClassificationServiceError, RawResponse, ReportApi, TransportError,
};
use waste_report::services::location::{
    AddressComponents, Geolocator, LocationError, PermissionStatus, ReverseGeocoder,
};
use waste_report::services::photo::{CapturedPhoto, PhotoError, PhotoSource};
use waste_report::ui::{Prompt, ScreenUi};

/// Report API with scripted answers that records every call.
#[derive(Default)]
pub struct FakeApi {
    classifications: Mutex<VecDeque<Result<ClassificationResult, ClassificationServiceError>>>,
    responses: Mutex<VecDeque<Result<RawResponse, TransportError>>>,
    pub classify_calls: Mutex<Vec<(String, Instant)>>,
    pub submissions: Mutex<Vec<(serde_json::Value, Instant)>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn classifying(self, result: ClassificationResult) -> Self {
        self.classifications.lock().unwrap().push_back(Ok(result));
        self
    }

    pub fn classifier_down(self) -> Self {
        self.classifications
            .lock()
            .unwrap()
            .push_back(Err(classifier_offline()));
        self
    }

    pub fn responding(self, status: u16, body: &str) -> Self {
        self.responses.lock().unwrap().push_back(Ok(RawResponse {
            status,
            body: body.to_string(),
        }));
        self
    }

    /// Fail the next submission the way reqwest does when the request
    /// cannot be sent.
    pub fn unreachable(self) -> Self {
        let err = reqwest::Client::new()
            .post("not a url")
            .build()
            .expect_err("an invalid URL cannot be built into a request");
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(TransportError::Http(err)));
        self
    }

    pub fn classify_count(&self) -> usize {
        self.classify_calls.lock().unwrap().len()
    }

    pub fn submission_count(&self) -> usize {
        self.submissions.lock().unwrap().len()
    }

    pub fn last_payload(&self) -> Option<serde_json::Value> {
        self.submissions
            .lock()
            .unwrap()
            .last()
            .map(|(payload, _)| payload.clone())
    }
}

impl ReportApi for FakeApi {
    async fn classify(
        &self,
        image_base64: &str,
    ) -> Result<ClassificationResult, ClassificationServiceError> {
        self.classify_calls
            .lock()
            .unwrap()
            .push((image_base64.to_string(), Instant::now()));
        self.classifications
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(classifier_offline()))
    }

    async fn submit_report(&self, payload: &ReportPayload) -> Result<RawResponse, TransportError> {
        let json = serde_json::to_value(payload).expect("payload serializes");
        self.submissions.lock().unwrap().push((json, Instant::now()));
        self.responses.lock().unwrap().pop_front().unwrap_or_else(|| {
            Ok(RawResponse {
                status: 201,
                body: r#"{"success":true}"#.to_string(),
            })
        })
    }
}

fn classifier_offline() -> ClassificationServiceError {
    ClassificationServiceError::Status {
        status: 503,
        body: "model offline".to_string(),
    }
}

/// UI that answers prompts from a script and records what it was shown.
#[derive(Default)]
pub struct RecordingUi {
    picks: Mutex<VecDeque<Option<usize>>>,
    pub prompts: Mutex<Vec<Prompt>>,
    pub alerts: Mutex<Vec<(String, String)>>,
    pub statuses: Mutex<Vec<String>>,
    went_home: AtomicBool,
}

impl RecordingUi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the answer to the next prompt (`None` dismisses it).
    pub fn picking(self, pick: Option<usize>) -> Self {
        self.picks.lock().unwrap().push_back(pick);
        self
    }

    pub fn prompt_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn last_prompt(&self) -> Option<Prompt> {
        self.prompts.lock().unwrap().last().cloned()
    }

    pub fn last_alert(&self) -> Option<(String, String)> {
        self.alerts.lock().unwrap().last().cloned()
    }

    pub fn went_home(&self) -> bool {
        self.went_home.load(Ordering::SeqCst)
    }
}

impl ScreenUi for RecordingUi {
    async fn choose(&self, prompt: &Prompt) -> Option<usize> {
        self.prompts.lock().unwrap().push(prompt.clone());
        self.picks.lock().unwrap().pop_front().flatten()
    }

    async fn alert(&self, title: &str, message: &str) {
        self.alerts
            .lock()
            .unwrap()
            .push((title.to_string(), message.to_string()));
    }

    fn show_status(&self, message: &str) {
        self.statuses.lock().unwrap().push(message.to_string());
    }

    fn navigate_home(&self) {
        self.went_home.store(true, Ordering::SeqCst);
    }
}

pub struct FakeGeolocator {
    pub position: Option<Coordinates>,
    pub permission: PermissionStatus,
}

impl FakeGeolocator {
    pub fn at(position: Coordinates) -> Self {
        Self {
            position: Some(position),
            permission: PermissionStatus::Granted,
        }
    }

    pub fn denied() -> Self {
        Self {
            position: None,
            permission: PermissionStatus::Denied,
        }
    }
}

impl Geolocator for FakeGeolocator {
    async fn request_permission(&self) -> PermissionStatus {
        self.permission
    }

    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        self.position.ok_or(LocationError::Unavailable)
    }
}

/// Geocoder returning fixed results, or failing when `None`.
pub struct FakeGeocoder(pub Option<Vec<AddressComponents>>);

impl ReverseGeocoder for FakeGeocoder {
    async fn reverse_geocode(
        &self,
        _coordinates: Coordinates,
    ) -> Result<Vec<AddressComponents>, LocationError> {
        self.0
            .clone()
            .ok_or_else(|| LocationError::Geocoder("service unavailable".to_string()))
    }
}

/// Camera handing over a fixed photo; `None` simulates a cancelled capture.
pub struct FakeCamera {
    pub photo: Option<CapturedPhoto>,
    pub permission: PermissionStatus,
}

impl FakeCamera {
    pub fn with_bytes(bytes: Vec<u8>) -> Self {
        Self {
            photo: Some(CapturedPhoto {
                uri: "file:///camera/evidence.png".to_string(),
                bytes,
                exif_taken_at: Some("2024:05:01 10:30:15".to_string()),
            }),
            permission: PermissionStatus::Granted,
        }
    }

    pub fn cancelled() -> Self {
        Self {
            photo: None,
            permission: PermissionStatus::Granted,
        }
    }

    pub fn denied() -> Self {
        Self {
            photo: None,
            permission: PermissionStatus::Denied,
        }
    }
}

impl PhotoSource for FakeCamera {
    async fn request_permission(&self) -> PermissionStatus {
        self.permission
    }

    async fn capture(&self) -> Result<Option<CapturedPhoto>, PhotoError> {
        Ok(self.photo.clone())
    }
}
