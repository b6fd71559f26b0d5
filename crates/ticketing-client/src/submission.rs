//! Registration submission
//!
//! A validated [`Registration`] is sent as one multipart `POST /api/register`.
//! There is no retry; a failed attempt is reported and the caller decides
//! whether to submit again.

use crate::client::{ApiClient, error_detail};
use crate::error::SubmitError;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use ticketing_core::models::Acknowledgement;
use ticketing_core::validation::Field;
use ticketing_core::{PaymentScreenshot, Registration, RegistrationEntry};
use tracing::{debug, info, warn};

/// Backend path accepting registrations
pub const REGISTER_PATH: &str = "/api/register";

/// Something that can deliver a registration to the backend
#[async_trait]
pub trait RegistrationSubmitter: Send + Sync {
    /// Submit a registration exactly once
    async fn submit(&self, registration: &Registration) -> Result<Acknowledgement, SubmitError>;
}

/// Multipart body of a registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionPayload {
    fields: Vec<(&'static str, String)>,
    screenshot: PaymentScreenshot,
}

impl SubmissionPayload {
    /// Lay out the text parts and the screenshot part of a registration
    ///
    /// Team fields are only present for bulk registrations; members are
    /// joined with commas.
    pub fn from_registration(registration: &Registration) -> Self {
        let contact = registration.contact();
        let mut fields = vec![
            (Field::Name.as_str(), contact.name.clone()),
            (Field::Email.as_str(), contact.email.clone()),
            (Field::Phone.as_str(), contact.phone.clone()),
            (
                Field::RegistrationType.as_str(),
                registration.registration_type().as_str().to_string(),
            ),
        ];

        if let RegistrationEntry::Bulk { team_name, members } = registration.entry() {
            fields.push((Field::TeamName.as_str(), team_name.clone()));
            fields.push((Field::TeamMembers.as_str(), members.join(",")));
        }

        Self {
            fields,
            screenshot: registration.payment_screenshot().clone(),
        }
    }

    /// Text parts in the order they are sent
    pub fn fields(&self) -> &[(&'static str, String)] {
        &self.fields
    }

    /// Value of a text part
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value.as_str())
    }

    /// Names of every part, the file part last
    pub fn part_names(&self) -> Vec<&'static str> {
        self.fields
            .iter()
            .map(|(name, _)| *name)
            .chain(std::iter::once(Field::PaymentScreenshot.as_str()))
            .collect()
    }

    /// The file part
    pub const fn screenshot(&self) -> &PaymentScreenshot {
        &self.screenshot
    }

    /// Convert into a multipart form
    ///
    /// # Errors
    ///
    /// Returns a connectivity error if the screenshot's MIME type cannot be
    /// used as a part header.
    pub fn into_form(self) -> Result<Form, SubmitError> {
        let file = Part::bytes(self.screenshot.bytes.to_vec())
            .file_name(self.screenshot.file_name.clone())
            .mime_str(&self.screenshot.content_type)
            .map_err(|e| {
                warn!(
                    content_type = %self.screenshot.content_type,
                    error = %e,
                    "Screenshot MIME type rejected by multipart encoder"
                );
                SubmitError::connectivity()
            })?;

        let form = self
            .fields
            .into_iter()
            .fold(Form::new(), |form, (name, value)| form.text(name, value));

        Ok(form.part(Field::PaymentScreenshot.as_str(), file))
    }
}

/// Submits registrations over HTTP
#[derive(Debug, Clone)]
pub struct HttpSubmitter {
    client: ApiClient,
}

impl HttpSubmitter {
    /// Create a submitter using a shared API client
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RegistrationSubmitter for HttpSubmitter {
    async fn submit(&self, registration: &Registration) -> Result<Acknowledgement, SubmitError> {
        let url = self.client.endpoint(REGISTER_PATH);
        let email = registration.contact().email.clone();
        let registration_type = registration.registration_type();
        let form = SubmissionPayload::from_registration(registration).into_form()?;

        info!(%email, %registration_type, "Submitting registration");

        let response = self
            .client
            .http()
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                warn!(%email, error = %e, "Registration request got no response");
                SubmitError::connectivity()
            })?;

        let status = response.status();
        let body = response.bytes().await;

        if status.is_success() {
            let ack = body
                .ok()
                .and_then(|body| serde_json::from_slice::<Acknowledgement>(&body).ok())
                .unwrap_or_else(|| {
                    debug!(%email, "Registration accepted with an unrecognised body");
                    Acknowledgement::default()
                });
            info!(%email, id = ?ack.id, "Registration accepted");
            return Ok(ack);
        }

        let detail = body.ok().and_then(|body| error_detail(&body));
        warn!(%email, status = status.as_u16(), detail = ?detail, "Registration rejected");
        Err(SubmitError::rejected(status.as_u16(), detail))
    }
}
