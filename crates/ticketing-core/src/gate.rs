//! Step gates of the registration wizard
//!
//! A gate decides whether the wizard may leave a step. Checks run in form
//! order and the first failing one wins, so the participant always sees a
//! single specific reason.

use crate::policy::UploadPolicy;
use crate::types::{DraftKind, Registration, RegistrationDraft, RegistrationEntry};
use crate::validation::{
    Field, FieldError, parse_team_members, validate_email, validate_name, validate_phone,
    validate_screenshot, validate_team_name,
};
use std::fmt;

/// Steps of the registration wizard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    /// Registration type, contact details and team details
    Details,
    /// Payment screenshot upload
    Payment,
    /// Read-only review before submission
    Review,
}

impl Step {
    /// One-based position of the step in the wizard
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::Details => 1,
            Self::Payment => 2,
            Self::Review => 3,
        }
    }

    /// The step that follows this one
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Details => Some(Self::Payment),
            Self::Payment => Some(Self::Review),
            Self::Review => None,
        }
    }

    /// The step that precedes this one
    #[must_use]
    pub const fn previous(self) -> Option<Self> {
        match self {
            Self::Details => None,
            Self::Payment => Some(Self::Details),
            Self::Review => Some(Self::Payment),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "step {}", self.number())
    }
}

/// Why the wizard may not leave a step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateFailure {
    /// A field on the step failed validation
    Field(FieldError),
    /// The step has no successor; submission is a separate action
    NotAdvanceable(Step),
}

impl GateFailure {
    /// Reason to show to the participant
    #[must_use]
    pub fn reason(&self) -> String {
        self.to_string()
    }

    /// Field that failed, if any
    #[must_use]
    pub const fn field(&self) -> Option<Field> {
        match self {
            Self::Field(err) => Some(err.field),
            Self::NotAdvanceable(_) => None,
        }
    }
}

impl fmt::Display for GateFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(err) => write!(f, "{err}"),
            Self::NotAdvanceable(step) => {
                write!(f, "Cannot advance past {step}; submit the registration instead")
            }
        }
    }
}

impl std::error::Error for GateFailure {}

impl From<FieldError> for GateFailure {
    fn from(err: FieldError) -> Self {
        Self::Field(err)
    }
}

/// Decide whether the wizard may advance from `step`
///
/// # Errors
///
/// Returns the first failing check for the step.
pub fn can_advance(
    step: Step,
    draft: &RegistrationDraft,
    policy: &UploadPolicy,
) -> Result<(), GateFailure> {
    match step {
        Step::Details => check_details(draft).map(|_| ()),
        Step::Payment => check_payment(draft, policy),
        Step::Review => Err(GateFailure::NotAdvanceable(step)),
    }
}

/// Details gate; returns the validated entry so submission can reuse it
fn check_details(draft: &RegistrationDraft) -> Result<RegistrationEntry, GateFailure> {
    let Some(kind) = &draft.kind else {
        return Err(FieldError::new(
            Field::RegistrationType,
            "Please choose a registration type",
        )
        .into());
    };

    validate_name(&draft.contact.name)?;
    validate_email(&draft.contact.email)?;
    validate_phone(&draft.contact.phone)?;

    match kind {
        DraftKind::Individual => Ok(RegistrationEntry::Individual),
        DraftKind::Bulk(team) => {
            validate_team_name(&team.team_name)?;
            let members = parse_team_members(&team.members_input)?;
            Ok(RegistrationEntry::Bulk {
                team_name: team.team_name.trim().to_string(),
                members,
            })
        }
    }
}

fn check_payment(draft: &RegistrationDraft, policy: &UploadPolicy) -> Result<(), GateFailure> {
    let Some(screenshot) = &draft.payment_screenshot else {
        return Err(FieldError::new(
            Field::PaymentScreenshot,
            "Please upload your payment screenshot",
        )
        .into());
    };

    validate_screenshot(screenshot, policy)?;
    Ok(())
}

impl Registration {
    /// Build a submit-ready registration by running both gates
    ///
    /// # Errors
    ///
    /// Returns the first failing check of the details gate, then of the
    /// payment gate.
    pub fn from_draft(
        draft: &RegistrationDraft,
        policy: &UploadPolicy,
    ) -> Result<Self, GateFailure> {
        let entry = check_details(draft)?;
        check_payment(draft, policy)?;

        let screenshot = draft.payment_screenshot.clone().ok_or_else(|| {
            GateFailure::Field(FieldError::new(
                Field::PaymentScreenshot,
                "Please upload your payment screenshot",
            ))
        })?;

        Ok(Self::new(draft.contact.trimmed(), entry, screenshot))
    }
}
