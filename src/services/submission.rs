//! Report submission workflow.
//!
//! validate → classification gate → (acknowledgment pause) → one POST →
//! interpret the response. Each step is a [`WorkflowEvent`] applied through
//! the pure transition function.

use serde_json::Value;
use std::time::{Duration, Instant};
use tokio::time::sleep;

use crate::models::classification::format_confidence;
use crate::models::report::{ReportDraft, ReportPayload};
use crate::models::workflow::{transition, InvalidTransition, WorkflowEvent, WorkflowState};
use crate::services::api::{RawResponse, ReportApi, TransportError};
use crate::services::gate;
use crate::services::validation::{validate_draft, ValidationError};
use crate::ui::ScreenUi;

/// Pause shown after a verified-waste classification before submitting.
pub const DEFAULT_ACK_DELAY: Duration = Duration::from_millis(1500);

/// Body prefixes that identify an HTML error page, matched ignoring ASCII case.
const HTML_MARKERS: [&str; 2] = ["<!DOCTYPE html", "<html"];

/// Characters of an unparseable body quoted back in the error.
const SNIPPET_CHARS: usize = 100;

/// How a submit attempt ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Submitted { verified: bool },
    /// The classification gate said no; nothing was sent.
    Declined,
}

pub struct SubmissionWorkflow<'a, A, U> {
    api: &'a A,
    ui: &'a U,
    ack_delay: Duration,
}

impl<'a, A, U> SubmissionWorkflow<'a, A, U>
where
    A: ReportApi,
    U: ScreenUi,
{
    pub fn new(api: &'a A, ui: &'a U, ack_delay: Duration) -> Self {
        Self { api, ui, ack_delay }
    }

    /// Run one submission attempt for `draft`, moving `state` along.
    ///
    /// The draft is only modified to attach the classification once the
    /// server has accepted the report; a failed attempt leaves it untouched.
    /// Resetting it on success is the caller's job.
    pub async fn submit(
        &self,
        draft: &mut ReportDraft,
        state: &mut WorkflowState,
    ) -> Result<SubmissionOutcome, SubmissionError> {
        advance(state, WorkflowEvent::SubmitRequested)?;

        let validated = match validate_draft(draft) {
            Ok(validated) => validated,
            Err(e) => {
                tracing::info!(error = %e, "Report draft failed validation");
                advance(state, WorkflowEvent::ValidationFailed)?;
                return Err(e.into());
            }
        };
        advance(state, WorkflowEvent::ValidationPassed)?;

        self.ui.show_status("Verifying waste image...");
        let decision = gate::run_gate(self.api, self.ui, &validated.photo.base64).await;

        if !decision.proceed {
            advance(state, WorkflowEvent::GateDeclined)?;
            return Ok(SubmissionOutcome::Declined);
        }

        let verified = decision.verified();
        if verified {
            advance(state, WorkflowEvent::GateVerified)?;
            self.ui.show_status("Verified waste - Submitting report...");
            sleep(self.ack_delay).await;
            advance(state, WorkflowEvent::AcknowledgmentElapsed)?;
        } else {
            advance(state, WorkflowEvent::GateConfirmed)?;
        }

        let payload = validated.to_payload(decision.classification.clone());

        metrics::counter!("report_submissions_total").increment(1);
        let start = Instant::now();
        let result = self.send(&payload).await;
        metrics::histogram!("report_submission_seconds").record(start.elapsed().as_secs_f64());

        match result {
            Ok(()) => {
                draft.classification = decision.classification;
                advance(state, WorkflowEvent::SubmissionSucceeded)?;
                tracing::info!(report_type = %payload.report_type, verified, "Report submitted");
                Ok(SubmissionOutcome::Submitted { verified })
            }
            Err(e) => {
                metrics::counter!("report_submissions_failed").increment(1);
                tracing::error!(error = %e, "Report submission failed");
                advance(state, WorkflowEvent::SubmissionFailed(e.to_string()))?;
                Err(e)
            }
        }
    }

    async fn send(&self, payload: &ReportPayload) -> Result<(), SubmissionError> {
        let response = self.api.submit_report(payload).await?;
        interpret_response(&response)?;
        Ok(())
    }
}

fn advance(state: &mut WorkflowState, event: WorkflowEvent) -> Result<(), InvalidTransition> {
    let next = transition(state, event)?;
    tracing::debug!(from = %state, to = %next, "Workflow transition");
    *state = next;
    Ok(())
}

/// Decide whether a report submission response means success.
///
/// - an HTML page is a server failure whatever the status
/// - a body that is not JSON is fine on success, an error otherwise
/// - error codes are only read when the status is a failure
pub fn interpret_response(response: &RawResponse) -> Result<(), ServerResponseError> {
    let body = response.body.as_str();

    if HTML_MARKERS.iter().any(|marker| starts_with_ignore_case(body, marker)) {
        return Err(ServerResponseError::HtmlErrorPage {
            status: response.status,
        });
    }

    let data: Value = match serde_json::from_str(body) {
        Ok(data) => data,
        Err(_) if response.is_success() => return Ok(()),
        Err(_) => {
            return Err(ServerResponseError::InvalidResponse {
                status: response.status,
                snippet: body.chars().take(SNIPPET_CHARS).collect(),
            })
        }
    };

    if response.is_success() {
        return Ok(());
    }

    let classification = data.get("classification");
    let err = match data.get("code").and_then(Value::as_str) {
        Some("NOT_WASTE") => ServerResponseError::NotWaste {
            label: classification
                .and_then(|c| c.get("label"))
                .and_then(Value::as_str)
                .filter(|label| !label.is_empty())
                .unwrap_or("Non-waste")
                .to_string(),
        },
        Some("LOW_CONFIDENCE") => ServerResponseError::LowConfidence {
            confidence: classification
                .and_then(|c| c.get("confidence"))
                .and_then(Value::as_f64)
                .unwrap_or(0.0),
        },
        _ => ServerResponseError::Rejected {
            status: response.status,
            message: data
                .get("message")
                .and_then(Value::as_str)
                .filter(|message| !message.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| format!("Server error {}", response.status)),
        },
    };

    Err(err)
}

fn starts_with_ignore_case(body: &str, prefix: &str) -> bool {
    body.as_bytes()
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix.as_bytes()))
}

fn confidence_of(confidence: &f64) -> String {
    format_confidence(*confidence)
}

/// A response the report endpoint sent back that is not a success.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ServerResponseError {
    #[error("Server error. Please contact support.")]
    HtmlErrorPage { status: u16 },

    #[error("Unexpected server response: {snippet}")]
    InvalidResponse { status: u16, snippet: String },

    #[error("AI detected: {label}")]
    NotWaste { label: String },

    #[error("Confidence: {}", confidence_of(.confidence))]
    LowConfidence { confidence: f64 },

    #[error("{message}")]
    Rejected { status: u16, message: String },
}

#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    ServerResponse(#[from] ServerResponseError),

    #[error("Failed to submit report. Please try again later. ({0})")]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Workflow(#[from] InvalidTransition),
}

impl SubmissionError {
    /// Alert title shown with this error.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Validation(e) => e.title(),
            _ => "Error",
        }
    }
}
