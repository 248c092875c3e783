use strum::Display;

/// Where a report screen is in the submission workflow.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum WorkflowState {
    Draft,
    Validating,
    AwaitingClassification,
    /// Cosmetic pause after a verified-waste classification.
    Acknowledging,
    Submitting,
    Succeeded,
    Failed { message: String },
}

/// Inputs that move the workflow forward.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum WorkflowEvent {
    SubmitRequested,
    ValidationFailed,
    ValidationPassed,
    /// The classification gate resolved to "do not proceed".
    GateDeclined,
    /// Verified waste: proceed after the acknowledgment pause.
    GateVerified,
    /// Proceed straight to submission (user confirmed or overrode).
    GateConfirmed,
    AcknowledgmentElapsed,
    SubmissionSucceeded,
    SubmissionFailed(String),
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid workflow transition: {event} while {from}")]
pub struct InvalidTransition {
    pub from: WorkflowState,
    pub event: WorkflowEvent,
}

impl WorkflowState {
    /// True while a submission is in flight.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            Self::Validating | Self::AwaitingClassification | Self::Acknowledging | Self::Submitting
        )
    }
}

/// Pure transition function of the submission workflow.
pub fn transition(
    state: &WorkflowState,
    event: WorkflowEvent,
) -> Result<WorkflowState, InvalidTransition> {
    use WorkflowEvent as E;
    use WorkflowState as S;

    let next = match (state, &event) {
        (S::Draft | S::Failed { .. }, E::SubmitRequested) => S::Validating,
        (S::Validating, E::ValidationFailed) => S::Draft,
        (S::Validating, E::ValidationPassed) => S::AwaitingClassification,
        (S::AwaitingClassification, E::GateDeclined) => S::Draft,
        (S::AwaitingClassification, E::GateVerified) => S::Acknowledging,
        (S::AwaitingClassification, E::GateConfirmed) => S::Submitting,
        (S::Acknowledging, E::AcknowledgmentElapsed) => S::Submitting,
        (S::Submitting, E::SubmissionSucceeded) => S::Succeeded,
        (S::Submitting, E::SubmissionFailed(message)) => S::Failed {
            message: message.clone(),
        },
        (S::Draft | S::Succeeded | S::Failed { .. }, E::Reset) => S::Draft,
        _ => {
            return Err(InvalidTransition {
                from: state.clone(),
                event,
            })
        }
    };

    Ok(next)
}
