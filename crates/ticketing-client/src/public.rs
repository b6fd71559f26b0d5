//! Public endpoints: registration status and payment QR

use crate::client::{ApiClient, decode};
use crate::error::{ClientError, ClientResult};
use ticketing_core::models::RegistrationStatus;
use ticketing_core::payment::{qr_asset_path, upi_payment_uri};
use ticketing_core::{PaymentConfig, RegistrationType};
use tracing::debug;

/// Where the payment QR for a registration type comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentQr {
    /// Static QR image served by the backend
    Asset(String),
    /// No image available; encode this UPI URI instead
    Generated(String),
}

impl ApiClient {
    /// Look up the review status of a registration by email
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] with the backend's reason when no
    /// registration uses the email.
    pub async fn registration_status(&self, email: &str) -> ClientResult<RegistrationStatus> {
        let email = email.trim();
        if email.is_empty() {
            return Err(ClientError::validation("Please enter your email address"));
        }

        let url = self.endpoint(&format!(
            "/api/registration/status/{}",
            urlencoding::encode(email)
        ));
        let response = self.http().get(&url).send().await?;
        decode(response).await
    }

    /// Resolve the payment QR for a registration type
    ///
    /// The static image is probed first; when it is missing or unreachable
    /// the UPI URI is returned for local rendering.
    pub async fn resolve_payment_qr(
        &self,
        registration_type: RegistrationType,
        payment: &PaymentConfig,
    ) -> PaymentQr {
        let url = self.endpoint(&qr_asset_path(registration_type));

        match self.http().get(&url).send().await {
            Ok(response) if response.status().is_success() => PaymentQr::Asset(url),
            Ok(response) => {
                debug!(%url, status = response.status().as_u16(), "Payment QR image unavailable");
                PaymentQr::Generated(upi_payment_uri(payment, registration_type))
            }
            Err(e) => {
                debug!(%url, error = %e, "Payment QR image unreachable");
                PaymentQr::Generated(upi_payment_uri(payment, registration_type))
            }
        }
    }
}
