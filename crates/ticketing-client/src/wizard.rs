//! Registration wizard state machine
//!
//! The wizard walks a participant through three steps: details, payment and
//! review. It owns the draft, applies the step gates, and performs the single
//! submission from the review step.
//!
//! State sits behind a [`parking_lot::Mutex`] that is released before the
//! submission is awaited. A second `submit` on a shared wizard therefore sees
//! [`WizardState::Submitting`] and is refused without a network call.

use crate::error::{SUBMIT_NETWORK_ERROR, WizardError};
use crate::submission::RegistrationSubmitter;
use parking_lot::Mutex;
use std::fmt;
use ticketing_core::gate::{Step, can_advance};
use ticketing_core::models::Acknowledgement;
use ticketing_core::validation::{Field, FieldError, validate_screenshot};
use ticketing_core::{
    PaymentScreenshot, Registration, RegistrationDraft, RegistrationType, UploadPolicy,
};
use tracing::{debug, info, warn};

/// Notice shown after a successful submission
pub const SUCCESS_NOTICE: &str =
    "Registration submitted successfully! Check your email for confirmation.";

/// Where the wizard currently is
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum WizardState {
    /// Step 1: type, contact and team details
    #[default]
    Details,
    /// Step 2: payment screenshot
    Payment,
    /// Step 3: read-only review
    Review,
    /// The submission request is in flight
    Submitting,
    /// The backend accepted the registration
    Submitted,
    /// The last submission failed; the draft is kept for a retry
    SubmitError {
        /// Message shown to the participant
        message: String,
    },
}

impl WizardState {
    /// Visible step for the state, if it shows one
    ///
    /// A failed submission shows the review step again.
    pub const fn step(&self) -> Option<Step> {
        match self {
            Self::Details => Some(Step::Details),
            Self::Payment => Some(Step::Payment),
            Self::Review | Self::SubmitError { .. } => Some(Step::Review),
            Self::Submitting | Self::Submitted => None,
        }
    }

    const fn from_step(step: Step) -> Self {
        match step {
            Step::Details => Self::Details,
            Step::Payment => Self::Payment,
            Step::Review => Self::Review,
        }
    }
}

impl fmt::Display for WizardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Details => f.write_str("step 1"),
            Self::Payment => f.write_str("step 2"),
            Self::Review => f.write_str("step 3"),
            Self::Submitting => f.write_str("submitting"),
            Self::Submitted => f.write_str("submitted"),
            Self::SubmitError { .. } => f.write_str("submit error"),
        }
    }
}

/// Kind of a user-facing notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// Something completed
    Success,
    /// Something was refused or failed
    Error,
}

/// A user-facing message; the wizard keeps only the latest one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Notice kind
    pub kind: NoticeKind,
    /// Text to show
    pub text: String,
}

impl Notice {
    fn success(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            text: text.into(),
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    state: WizardState,
    draft: RegistrationDraft,
    notice: Option<Notice>,
}

impl Inner {
    fn fail<E: Into<WizardError>>(&mut self, err: E) -> WizardError {
        let err = err.into();
        self.notice = Some(Notice::error(err.to_string()));
        err
    }

    fn require_state(&mut self, field: Field, owner: Step) -> Result<(), WizardError> {
        if self.state == WizardState::from_step(owner) {
            Ok(())
        } else {
            let state = self.state.clone();
            Err(self.fail(WizardError::FieldLocked { field, state }))
        }
    }
}

/// Three-step registration wizard
#[derive(Debug)]
pub struct Wizard<S> {
    submitter: S,
    policy: UploadPolicy,
    inner: Mutex<Inner>,
}

impl<S: RegistrationSubmitter> Wizard<S> {
    /// Create a wizard at step 1 with an empty draft
    pub fn new(submitter: S, policy: UploadPolicy) -> Self {
        Self {
            submitter,
            policy,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// The submitter used for submissions
    pub const fn submitter(&self) -> &S {
        &self.submitter
    }

    /// Upload constraints applied to the screenshot
    pub const fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    /// Current state
    pub fn state(&self) -> WizardState {
        self.inner.lock().state.clone()
    }

    /// Copy of the current draft
    pub fn draft(&self) -> RegistrationDraft {
        self.inner.lock().draft.clone()
    }

    /// Latest notice, if any
    pub fn notice(&self) -> Option<Notice> {
        self.inner.lock().notice.clone()
    }

    /// Dismiss the current notice
    pub fn clear_notice(&self) {
        self.inner.lock().notice = None;
    }

    /// Choose individual or bulk registration
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::FieldLocked`] outside step 1.
    pub fn select_type(&self, registration_type: RegistrationType) -> Result<(), WizardError> {
        let mut inner = self.inner.lock();
        inner.require_state(Field::RegistrationType, Step::Details)?;
        inner.draft.select_type(registration_type);
        debug!(%registration_type, "Registration type selected");
        Ok(())
    }

    /// Set a text field of step 1
    ///
    /// Values are stored as typed; validation happens when advancing.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::FieldLocked`] outside step 1, and
    /// [`WizardError::TeamFieldUnavailable`] for team fields of a draft that
    /// is not a bulk registration.
    pub fn set_field(&self, field: Field, value: impl Into<String>) -> Result<(), WizardError> {
        let value = value.into();
        if field == Field::RegistrationType {
            let mut inner = self.inner.lock();
            inner.require_state(field, Step::Details)?;
            let Ok(registration_type) = value.parse::<RegistrationType>() else {
                return Err(inner.fail(FieldError::new(field, "Please choose a registration type")));
            };
            inner.draft.select_type(registration_type);
            debug!(%registration_type, "Registration type selected");
            return Ok(());
        }

        let owner = if field == Field::PaymentScreenshot {
            Step::Payment
        } else {
            Step::Details
        };

        let mut inner = self.inner.lock();
        inner.require_state(field, owner)?;

        match field {
            Field::Name => inner.draft.contact.name = value,
            Field::Email => inner.draft.contact.email = value,
            Field::Phone => inner.draft.contact.phone = value,
            Field::TeamName | Field::TeamMembers => {
                let Some(team) = inner.draft.team_mut() else {
                    return Err(inner.fail(WizardError::TeamFieldUnavailable { field }));
                };
                if field == Field::TeamName {
                    team.team_name = value;
                } else {
                    team.members_input = value;
                }
            }
            Field::PaymentScreenshot => {
                return Err(inner.fail(FieldError::new(
                    field,
                    "Attach the payment screenshot as a file",
                )));
            }
            Field::RegistrationType => {}
        }
        Ok(())
    }

    /// Attach the payment screenshot on step 2
    ///
    /// The file is checked immediately; a rejected file is not kept.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::FieldLocked`] outside step 2, or the reason the
    /// file was rejected.
    pub fn attach_screenshot(&self, screenshot: PaymentScreenshot) -> Result<(), WizardError> {
        let mut inner = self.inner.lock();
        inner.require_state(Field::PaymentScreenshot, Step::Payment)?;

        if let Err(err) = validate_screenshot(&screenshot, &self.policy) {
            warn!(
                file_name = %screenshot.file_name,
                content_type = %screenshot.content_type,
                size = screenshot.size(),
                "Payment screenshot rejected"
            );
            return Err(inner.fail(err));
        }

        debug!(file_name = %screenshot.file_name, size = screenshot.size(), "Payment screenshot attached");
        inner.draft.payment_screenshot = Some(screenshot);
        Ok(())
    }

    /// Remove the payment screenshot on step 2
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::FieldLocked`] outside step 2.
    pub fn remove_screenshot(&self) -> Result<(), WizardError> {
        let mut inner = self.inner.lock();
        inner.require_state(Field::PaymentScreenshot, Step::Payment)?;
        inner.draft.payment_screenshot = None;
        Ok(())
    }

    /// Move to the next step if the current step's gate passes
    ///
    /// # Errors
    ///
    /// Returns the gate failure, or [`WizardError::InvalidTransition`] when
    /// no step is shown.
    pub fn advance(&self) -> Result<Step, WizardError> {
        let mut inner = self.inner.lock();
        let step = match inner.state {
            WizardState::Details => Step::Details,
            WizardState::Payment => Step::Payment,
            WizardState::Review => Step::Review,
            ref other => return Err(WizardError::invalid_transition("advance", other.clone())),
        };

        if let Err(failure) = can_advance(step, &inner.draft, &self.policy) {
            debug!(%step, reason = %failure, "Step gate refused");
            return Err(inner.fail(failure));
        }

        let Some(next) = step.next() else {
            return Err(WizardError::invalid_transition("advance", inner.state.clone()));
        };
        inner.state = WizardState::from_step(next);
        inner.notice = None;
        debug!(from = %step, to = %next, "Wizard advanced");
        Ok(next)
    }

    /// Go back one step without validating
    ///
    /// A failed submission goes back to the payment step. Elsewhere this
    /// does nothing.
    pub fn back(&self) -> WizardState {
        let mut inner = self.inner.lock();
        inner.state = match inner.state {
            WizardState::Payment => WizardState::Details,
            WizardState::Review | WizardState::SubmitError { .. } => WizardState::Payment,
            ref other => other.clone(),
        };
        inner.state.clone()
    }

    /// Submit the registration from the review step
    ///
    /// Both gates run again before the request. Exactly one request is sent;
    /// on failure the draft is kept and `submit` may be called again.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::SubmissionInFlight`] while another submission
    /// runs, a gate failure if the draft no longer passes, or the submission
    /// error.
    pub async fn submit(&self) -> Result<Acknowledgement, WizardError> {
        let registration = {
            let mut inner = self.inner.lock();
            match inner.state {
                WizardState::Submitting => return Err(WizardError::SubmissionInFlight),
                WizardState::Review | WizardState::SubmitError { .. } => {}
                ref other => {
                    return Err(WizardError::invalid_transition("submit", other.clone()));
                }
            }

            let registration = match Registration::from_draft(&inner.draft, &self.policy) {
                Ok(registration) => registration,
                Err(failure) => return Err(inner.fail(failure)),
            };
            inner.state = WizardState::Submitting;
            inner.notice = None;
            registration
        };

        let mut guard = InFlight {
            inner: &self.inner,
            armed: true,
        };
        let outcome = self.submitter.submit(&registration).await;
        guard.armed = false;

        let mut inner = self.inner.lock();
        match outcome {
            Ok(ack) => {
                info!(email = %registration.contact().email, "Registration submitted");
                inner.state = WizardState::Submitted;
                inner.notice = Some(Notice::success(SUCCESS_NOTICE));
                Ok(ack)
            }
            Err(err) => {
                let message = err.to_string();
                warn!(%message, "Registration submission failed");
                inner.state = WizardState::SubmitError { message };
                Err(inner.fail(err))
            }
        }
    }

    /// Start a new registration after a successful one
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::InvalidTransition`] unless the last
    /// registration was submitted.
    pub fn register_another(&self) -> Result<(), WizardError> {
        let mut inner = self.inner.lock();
        if inner.state != WizardState::Submitted {
            return Err(WizardError::invalid_transition(
                "register another",
                inner.state.clone(),
            ));
        }
        *inner = Inner::default();
        Ok(())
    }

    /// Discard the draft and return to step 1
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::SubmissionInFlight`] while submitting.
    pub fn reset(&self) -> Result<(), WizardError> {
        let mut inner = self.inner.lock();
        if inner.state == WizardState::Submitting {
            return Err(WizardError::SubmissionInFlight);
        }
        *inner = Inner::default();
        Ok(())
    }
}

/// Leaves `Submitting` if the submit future is dropped mid-request
struct InFlight<'a> {
    inner: &'a Mutex<Inner>,
    armed: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut inner = self.inner.lock();
        if inner.state == WizardState::Submitting {
            warn!("Submission abandoned before a response");
            inner.state = WizardState::SubmitError {
                message: SUBMIT_NETWORK_ERROR.to_string(),
            };
            inner.notice = Some(Notice::error(SUBMIT_NETWORK_ERROR));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SubmitError;
    use crate::mock::MockSubmitter;
    use pretty_assertions::assert_eq;

    fn png() -> PaymentScreenshot {
        PaymentScreenshot::new("pay.png", "image/png", vec![0x89, b'P', b'N', b'G'])
    }

    fn filled(wizard: &Wizard<MockSubmitter>, registration_type: RegistrationType) {
        wizard.select_type(registration_type).unwrap();
        wizard.set_field(Field::Name, "Jo").unwrap();
        wizard.set_field(Field::Email, "jo@x.com").unwrap();
        wizard.set_field(Field::Phone, "9876543210").unwrap();
    }

    fn at_review(submitter: MockSubmitter) -> Wizard<MockSubmitter> {
        let wizard = Wizard::new(submitter, UploadPolicy::default());
        filled(&wizard, RegistrationType::Individual);
        wizard.advance().unwrap();
        wizard.attach_screenshot(png()).unwrap();
        wizard.advance().unwrap();
        wizard
    }

    #[test]
    fn test_starts_at_details() {
        let wizard = Wizard::new(MockSubmitter::new(), UploadPolicy::default());
        assert_eq!(wizard.state(), WizardState::Details);
        assert_eq!(wizard.state().step(), Some(Step::Details));
        assert!(wizard.notice().is_none());
    }

    #[test]
    fn test_failed_gate_keeps_step_and_records_notice() {
        let wizard = Wizard::new(MockSubmitter::new(), UploadPolicy::default());
        filled(&wizard, RegistrationType::Bulk);
        wizard.set_field(Field::TeamName, "Tech Wizards").unwrap();
        wizard.set_field(Field::TeamMembers, "A,B,C").unwrap();

        let err = wizard.advance().unwrap_err();
        assert!(err.to_string().contains("exactly 4 team members"));
        assert_eq!(wizard.state(), WizardState::Details);
        assert_eq!(wizard.notice().map(|n| n.kind), Some(NoticeKind::Error));
    }

    #[test]
    fn test_team_fields_need_bulk_type() {
        let wizard = Wizard::new(MockSubmitter::new(), UploadPolicy::default());
        filled(&wizard, RegistrationType::Individual);
        let err = wizard.set_field(Field::TeamName, "Tech Wizards").unwrap_err();
        assert_eq!(err, WizardError::TeamFieldUnavailable { field: Field::TeamName });
    }

    #[test]
    fn test_fields_locked_outside_their_step() {
        let wizard = Wizard::new(MockSubmitter::new(), UploadPolicy::default());
        assert!(matches!(
            wizard.attach_screenshot(png()),
            Err(WizardError::FieldLocked { field: Field::PaymentScreenshot, .. })
        ));

        filled(&wizard, RegistrationType::Individual);
        wizard.advance().unwrap();
        assert!(matches!(
            wizard.set_field(Field::Email, "other@x.com"),
            Err(WizardError::FieldLocked { field: Field::Email, .. })
        ));
        assert_eq!(wizard.draft().contact.email, "jo@x.com");

        assert!(matches!(
            wizard.set_field(Field::RegistrationType, "family"),
            Err(WizardError::FieldLocked { field: Field::RegistrationType, .. })
        ));
        assert!(matches!(
            wizard.set_field(Field::RegistrationType, "bulk"),
            Err(WizardError::FieldLocked { field: Field::RegistrationType, .. })
        ));
    }

    #[test]
    fn test_unknown_registration_type_on_first_step() {
        let wizard = Wizard::new(MockSubmitter::new(), UploadPolicy::default());
        let err = wizard.set_field(Field::RegistrationType, "family").unwrap_err();
        assert!(matches!(err, WizardError::Field(_)));
        assert_eq!(err.to_string(), "Please choose a registration type");

        wizard.set_field(Field::RegistrationType, "bulk").unwrap();
        assert!(wizard.draft().team().is_some());
    }

    #[test]
    fn test_rejected_screenshot_is_not_stored() {
        let wizard = Wizard::new(MockSubmitter::new(), UploadPolicy::default());
        filled(&wizard, RegistrationType::Individual);
        wizard.advance().unwrap();

        let gif = PaymentScreenshot::new("pay.png", "image/gif", vec![1, 2, 3]);
        let err = wizard.attach_screenshot(gif).unwrap_err();
        assert!(err.to_string().contains("valid image file"));
        assert!(wizard.draft().payment_screenshot.is_none());

        let err = wizard.advance().unwrap_err();
        assert_eq!(err.to_string(), "Please upload your payment screenshot");
        assert_eq!(wizard.state(), WizardState::Payment);
    }

    #[test]
    fn test_back_never_validates() {
        let wizard = at_review(MockSubmitter::new());
        assert_eq!(wizard.back(), WizardState::Payment);
        wizard.remove_screenshot().unwrap();
        assert_eq!(wizard.back(), WizardState::Details);
        assert_eq!(wizard.back(), WizardState::Details);
    }

    #[test]
    fn test_review_cannot_advance() {
        let wizard = at_review(MockSubmitter::new());
        assert!(matches!(wizard.advance(), Err(WizardError::Gate(_))));
        assert_eq!(wizard.state(), WizardState::Review);
    }

    #[tokio::test]
    async fn test_submit_success() {
        let wizard = at_review(MockSubmitter::new());
        let ack = wizard.submit().await.unwrap();

        assert_eq!(ack.status.as_deref(), Some("pending"));
        assert_eq!(wizard.state(), WizardState::Submitted);
        assert_eq!(wizard.notice(), Some(Notice::success(SUCCESS_NOTICE)));
        assert_eq!(wizard.submitter().calls(), 1);
    }

    #[tokio::test]
    async fn test_submit_failure_keeps_draft_and_allows_retry() {
        let failing = MockSubmitter::new()
            .with_failure(SubmitError::rejected(400, Some("Duplicate email".to_string())));
        let wizard = at_review(failing);
        let draft = wizard.draft();

        let err = wizard.submit().await.unwrap_err();
        assert_eq!(err.to_string(), "Duplicate email");
        assert_eq!(
            wizard.state(),
            WizardState::SubmitError {
                message: "Duplicate email".to_string()
            }
        );
        assert_eq!(wizard.draft(), draft);

        assert!(wizard.submit().await.is_err());
        assert_eq!(wizard.submitter().calls(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_submit_is_refused() {
        let wizard = at_review(MockSubmitter::new().with_delay(50));

        let (first, second) = tokio::join!(wizard.submit(), wizard.submit());
        assert!(first.is_ok());
        assert_eq!(second.unwrap_err(), WizardError::SubmissionInFlight);
        assert_eq!(wizard.submitter().calls(), 1);
    }

    #[tokio::test]
    async fn test_submit_outside_review_is_refused() {
        let wizard = Wizard::new(MockSubmitter::new(), UploadPolicy::default());
        assert!(matches!(
            wizard.submit().await,
            Err(WizardError::InvalidTransition { action: "submit", .. })
        ));
        assert_eq!(wizard.submitter().calls(), 0);
    }

    #[tokio::test]
    async fn test_dropped_submission_becomes_submit_error() {
        let wizard = at_review(MockSubmitter::new().with_delay(1_000));
        let result =
            tokio::time::timeout(std::time::Duration::from_millis(10), wizard.submit()).await;
        assert!(result.is_err());
        assert_eq!(
            wizard.state(),
            WizardState::SubmitError {
                message: SUBMIT_NETWORK_ERROR.to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_register_another_starts_fresh() {
        let wizard = at_review(MockSubmitter::new());
        assert!(wizard.register_another().is_err());

        wizard.submit().await.unwrap();
        wizard.register_another().unwrap();
        assert_eq!(wizard.state(), WizardState::Details);
        assert_eq!(wizard.draft(), RegistrationDraft::new());
    }

    #[test]
    fn test_state_display() {
        assert_eq!(WizardState::Payment.to_string(), "step 2");
        assert_eq!(WizardState::Submitting.to_string(), "submitting");
    }
}
