//! The report screen: one draft, one workflow state, and the handlers the
//! UI calls.

use chrono::Utc;
use std::time::Duration;

use crate::models::report::{ReportDraft, ReportType};
use crate::models::workflow::{transition, InvalidTransition, WorkflowEvent, WorkflowState};
use crate::services::api::ReportApi;
use crate::services::location::{
    current_position_within, format_address, Geolocator, LocationError, PermissionStatus,
    ReverseGeocoder,
};
use crate::services::photo::{normalize_photo, photo_timestamp, PhotoError, PhotoSource};
use crate::services::submission::{SubmissionError, SubmissionOutcome, SubmissionWorkflow};
use crate::ui::ScreenUi;

/// A permission problem found at startup. Shown, never blocking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advisory {
    pub title: &'static str,
    pub message: &'static str,
}

const LOCATION_ADVISORY: Advisory = Advisory {
    title: "Location Permission",
    message: "Location access is required for accurate reporting",
};

const CAMERA_ADVISORY: Advisory = Advisory {
    title: "Camera Permission",
    message: "Camera access is required to take photos of waste",
};

pub struct ReportScreen<A, U> {
    api: A,
    ui: U,
    ack_delay: Duration,
    location_timeout: Duration,
    draft: ReportDraft,
    state: WorkflowState,
}

impl<A, U> ReportScreen<A, U>
where
    A: ReportApi,
    U: ScreenUi,
{
    pub fn new(api: A, ui: U, ack_delay: Duration, location_timeout: Duration) -> Self {
        Self {
            api,
            ui,
            ack_delay,
            location_timeout,
            draft: ReportDraft::default(),
            state: WorkflowState::Draft,
        }
    }

    pub fn draft(&self) -> &ReportDraft {
        &self.draft
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn ui(&self) -> &U {
        &self.ui
    }

    /// Ask for location and camera access at the same time. Denials are
    /// alerted and returned; the screen stays usable.
    pub async fn initialize<G, P>(&self, geolocator: &G, camera: &P) -> Vec<Advisory>
    where
        G: Geolocator,
        P: PhotoSource,
    {
        let (location, camera) =
            tokio::join!(geolocator.request_permission(), camera.request_permission());

        let mut advisories = Vec::new();
        if location != PermissionStatus::Granted {
            advisories.push(LOCATION_ADVISORY);
        }
        if camera != PermissionStatus::Granted {
            advisories.push(CAMERA_ADVISORY);
        }

        for advisory in &advisories {
            tracing::warn!(title = advisory.title, "Permission not granted");
            self.ui.alert(advisory.title, advisory.message).await;
        }

        advisories
    }

    pub fn set_title(&mut self, title: &str) {
        self.draft.set_title(title);
    }

    pub fn set_details(&mut self, details: &str) {
        self.draft.set_details(details);
    }

    pub fn set_report_type(&mut self, report_type: ReportType) {
        self.draft.set_report_type(report_type);
    }

    /// Fill coordinates and address from the device.
    ///
    /// Coordinates are stored as soon as the fix arrives, so a geocoding
    /// failure still leaves them on the draft.
    pub async fn capture_location<G, R>(
        &mut self,
        geolocator: &G,
        geocoder: &R,
    ) -> Result<(), LocationError>
    where
        G: Geolocator,
        R: ReverseGeocoder,
    {
        let result = self.try_capture_location(geolocator, geocoder).await;

        if let Err(e) = &result {
            tracing::error!(error = %e, "Location capture failed");
            self.ui
                .alert(
                    "Location Error",
                    "Could not get location. Please ensure location services are enabled.",
                )
                .await;
        }

        result
    }

    async fn try_capture_location<G, R>(
        &mut self,
        geolocator: &G,
        geocoder: &R,
    ) -> Result<(), LocationError>
    where
        G: Geolocator,
        R: ReverseGeocoder,
    {
        let coordinates = current_position_within(geolocator, self.location_timeout).await?;
        self.draft.set_coordinates(coordinates);

        let results = geocoder.reverse_geocode(coordinates).await?;
        if let Some(first) = results.first() {
            self.draft.set_address(format_address(first));
        }

        tracing::info!(
            latitude = coordinates.latitude,
            longitude = coordinates.longitude,
            geocoded = !results.is_empty(),
            "Location captured"
        );

        Ok(())
    }

    /// Take and normalize a photo. Returns `Ok(false)` when the user
    /// cancelled the camera.
    pub async fn take_photo<P: PhotoSource>(&mut self, source: &P) -> Result<bool, PhotoError> {
        let result = self.try_take_photo(source).await;

        if let Err(e) = &result {
            tracing::error!(error = %e, "Photo capture failed");
            self.ui
                .alert("Camera Error", "Failed to capture photo. Please try again.")
                .await;
        }

        result
    }

    async fn try_take_photo<P: PhotoSource>(&mut self, source: &P) -> Result<bool, PhotoError> {
        let Some(captured) = source.capture().await? else {
            return Ok(false);
        };

        let timestamp = photo_timestamp(captured.exif_taken_at.as_deref(), Utc::now());
        let encoded = normalize_photo(&captured)?;
        self.draft.attach_photo(encoded, timestamp);

        Ok(true)
    }

    pub fn retake_photo(&mut self) {
        self.draft.clear_photo();
    }

    /// Run the submission workflow and report the outcome to the user.
    ///
    /// On success the draft is reset and the UI goes home; on failure the
    /// draft is kept for correction.
    pub async fn submit(&mut self) -> Result<SubmissionOutcome, SubmissionError> {
        let workflow = SubmissionWorkflow::new(&self.api, &self.ui, self.ack_delay);
        let result = workflow.submit(&mut self.draft, &mut self.state).await;

        match &result {
            Ok(SubmissionOutcome::Submitted { .. }) => {
                self.ui
                    .alert("Success", "Report submitted successfully!")
                    .await;
                self.draft.reset();
                self.state = transition(&self.state, WorkflowEvent::Reset)?;
                self.ui.navigate_home();
            }
            Ok(SubmissionOutcome::Declined) => {}
            Err(e) => self.ui.alert(e.title(), &e.to_string()).await,
        }

        result
    }

    /// Discard the draft.
    pub fn cancel(&mut self) -> Result<(), InvalidTransition> {
        self.state = transition(&self.state, WorkflowEvent::Reset)?;
        self.draft.reset();
        Ok(())
    }
}
