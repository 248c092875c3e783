//! Classification gate.
//!
//! Runs the remote waste classifier on the draft photo and turns its answer
//! into a proceed/abort decision, asking the user when the classifier is
//! unsure, negative, or unreachable.

use strum::Display;

use crate::models::classification::ClassificationResult;
use crate::services::api::{ClassificationServiceError, ReportApi};
use crate::ui::{GateChoice, Prompt, PromptChoice, ScreenUi};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum GateState {
    Idle,
    Requesting,
    /// Verified waste: proceed without asking.
    VerifiedHigh,
    /// Waste, but not verified: the user decides.
    NeedsConfirmation,
    /// Not waste: the photo must be retaken.
    Rejected,
    /// Classifier unreachable: the user may cancel or submit anyway.
    ServiceUnavailable,
}

/// Outcome of the gate.
#[derive(Debug, Clone, PartialEq)]
pub struct GateDecision {
    pub state: GateState,
    pub proceed: bool,
    /// `None` when the classifier could not be reached.
    pub classification: Option<ClassificationResult>,
}

impl GateDecision {
    /// True when the decision came from a verified-waste result.
    pub fn verified(&self) -> bool {
        self.state == GateState::VerifiedHigh
    }
}

/// Terminal gate state for a classifier response.
pub fn assess(outcome: &Result<ClassificationResult, ClassificationServiceError>) -> GateState {
    match outcome {
        Ok(result) if result.is_verified_waste => GateState::VerifiedHigh,
        Ok(result) if result.is_waste => GateState::NeedsConfirmation,
        Ok(_) => GateState::Rejected,
        Err(_) => GateState::ServiceUnavailable,
    }
}

/// The question to ask in `state`, if any.
pub fn prompt_for(state: GateState, classification: Option<&ClassificationResult>) -> Option<Prompt> {
    let retake = PromptChoice {
        label: "Retake Photo",
        choice: GateChoice::Abort,
    };
    let submit = PromptChoice {
        label: "Submit Report",
        choice: GateChoice::Proceed,
    };

    match state {
        GateState::NeedsConfirmation => {
            let percent = classification
                .map(ClassificationResult::confidence_percent)
                .unwrap_or_else(|| "0.0%".to_string());
            Some(Prompt {
                title: "Potential Waste Detected",
                message: format!("AI detected waste with {} confidence.", percent),
                choices: vec![retake, submit],
            })
        }
        GateState::Rejected => Some(Prompt {
            title: "No Waste Detected",
            message: "AI did not detect waste. Please capture a clear image of waste.".to_string(),
            choices: vec![retake],
        }),
        GateState::ServiceUnavailable => Some(Prompt {
            title: "Verification Failed",
            message: "AI service is unavailable. Submit anyway?".to_string(),
            choices: vec![
                PromptChoice {
                    label: "Cancel",
                    choice: GateChoice::Abort,
                },
                submit,
            ],
        }),
        GateState::Idle | GateState::Requesting | GateState::VerifiedHigh => None,
    }
}

/// Classify `image_base64` and resolve the gate, suspending on the UI when a
/// prompt is needed.
pub async fn run_gate<A, U>(api: &A, ui: &U, image_base64: &str) -> GateDecision
where
    A: ReportApi,
    U: ScreenUi,
{
    tracing::debug!(state = %GateState::Requesting, "Requesting waste classification");
    let outcome = api.classify(image_base64).await;

    if let Err(e) = &outcome {
        tracing::warn!(error = %e, "Classification request failed");
    }

    let state = assess(&outcome);
    let classification = outcome.ok();

    let proceed = match prompt_for(state, classification.as_ref()) {
        None => true,
        Some(prompt) => {
            let picked = ui.choose(&prompt).await;
            prompt.resolve(picked) == GateChoice::Proceed
        }
    };

    tracing::info!(state = %state, proceed, "Classification gate resolved");

    GateDecision {
        state,
        proceed,
        classification,
    }
}
