//! Error types for the ticketing client

use crate::wizard::WizardState;
use thiserror::Error;
use ticketing_core::{Field, FieldError, GateFailure};

/// Message shown when the backend rejects a submission without a reason
pub const GENERIC_REJECTION: &str = "Registration failed. Please try again.";

/// Message shown when a submission gets no response
pub const SUBMIT_NETWORK_ERROR: &str = "Network error. Please check your connection and try again.";

/// Result type alias for API client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors from a registration submission
///
/// The display text is what the participant sees.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    /// The backend answered with a non-2xx status
    #[error("{detail}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Backend detail, or the generic rejection message
        detail: String,
    },

    /// No response was received
    #[error("{message}")]
    Connectivity {
        /// Message shown to the participant
        message: String,
    },
}

impl SubmitError {
    /// Create a rejection, falling back to the generic message
    pub fn rejected(status: u16, detail: Option<String>) -> Self {
        Self::Rejected {
            status,
            detail: detail
                .filter(|detail| !detail.trim().is_empty())
                .unwrap_or_else(|| GENERIC_REJECTION.to_string()),
        }
    }

    /// Create a connectivity error with the standard message
    pub fn connectivity() -> Self {
        Self::Connectivity {
            message: SUBMIT_NETWORK_ERROR.to_string(),
        }
    }
}

/// Errors from the public and admin API calls
#[derive(Error, Debug)]
pub enum ClientError {
    /// No response was received
    #[error("Network error. Please check your connection.")]
    Connectivity(#[from] reqwest::Error),

    /// Login was refused
    #[error("{message}")]
    Login {
        /// Message shown to the admin
        message: String,
    },

    /// The session is missing, expired or was invalidated
    #[error("Session expired. Please log in again.")]
    Unauthorized,

    /// The requested resource does not exist
    #[error("{detail}")]
    NotFound {
        /// Backend detail
        detail: String,
    },

    /// The backend answered with a non-2xx status
    #[error("API error ({status}): {detail}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Backend detail or status reason
        detail: String,
    },

    /// The response body was not what the endpoint promises
    #[error("Unexpected response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Input rejected before any request was sent
    #[error("{message}")]
    Validation {
        /// Error message
        message: String,
    },

    /// The client could not be built from configuration
    #[error("Invalid configuration: {message}")]
    Configuration {
        /// Error message
        message: String,
    },
}

impl ClientError {
    /// Create a login error
    pub fn login(message: impl Into<String>) -> Self {
        Self::Login {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::NotFound {
            detail: detail.into(),
        }
    }

    /// Create an API error
    pub fn api(status: u16, detail: impl Into<String>) -> Self {
        Self::Api {
            status,
            detail: detail.into(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Whether the caller has to log in again
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

/// Errors from wizard actions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WizardError {
    /// The current step's gate refused to advance
    #[error(transparent)]
    Gate(#[from] GateFailure),

    /// A field value was rejected
    #[error(transparent)]
    Field(#[from] FieldError),

    /// The field belongs to another step
    #[error("{field} cannot be changed while the wizard is at {state}")]
    FieldLocked {
        /// Field the caller tried to change
        field: Field,
        /// Current wizard state
        state: WizardState,
    },

    /// The field only exists for team registrations
    #[error("{field} is only available for bulk registrations")]
    TeamFieldUnavailable {
        /// Field the caller tried to change
        field: Field,
    },

    /// The action is not valid in the current state
    #[error("Cannot {action} while the wizard is at {state}")]
    InvalidTransition {
        /// Attempted action
        action: &'static str,
        /// Current wizard state
        state: WizardState,
    },

    /// A submission is already running
    #[error("A submission is already in progress")]
    SubmissionInFlight,

    /// The backend refused the submission or could not be reached
    #[error(transparent)]
    Submit(#[from] SubmitError),
}

impl WizardError {
    /// Create an invalid transition error
    pub const fn invalid_transition(action: &'static str, state: WizardState) -> Self {
        Self::InvalidTransition { action, state }
    }
}
