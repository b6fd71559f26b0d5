//! Payment details shown on the payment step

use crate::types::RegistrationType;
use serde::{Deserialize, Serialize};

/// Payment configuration for the event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentConfig {
    /// UPI id receiving payments
    #[serde(default = "default_upi_id")]
    pub upi_id: String,

    /// Payee name shown in the payment app
    #[serde(default = "default_payee_name")]
    pub payee_name: String,

    /// Price of an individual registration
    #[serde(default = "default_individual_amount")]
    pub individual_amount: f64,

    /// Price of a bulk (team) registration
    #[serde(default = "default_bulk_amount")]
    pub bulk_amount: f64,

    /// ISO currency code
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_upi_id() -> String {
    "yourupiid@bank".to_string()
}

fn default_payee_name() -> String {
    "Event Ticketing System".to_string()
}

const fn default_individual_amount() -> f64 {
    500.0
}

const fn default_bulk_amount() -> f64 {
    2000.0
}

fn default_currency() -> String {
    "INR".to_string()
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            upi_id: default_upi_id(),
            payee_name: default_payee_name(),
            individual_amount: default_individual_amount(),
            bulk_amount: default_bulk_amount(),
            currency: default_currency(),
        }
    }
}

impl PaymentConfig {
    /// Amount due for a registration type
    #[must_use]
    pub const fn amount_for(&self, registration_type: RegistrationType) -> f64 {
        match registration_type {
            RegistrationType::Individual => self.individual_amount,
            RegistrationType::Bulk => self.bulk_amount,
        }
    }
}

/// Path of the static payment QR image for a registration type
#[must_use]
pub fn qr_asset_path(registration_type: RegistrationType) -> String {
    format!("/payment-qr/{}.png", registration_type.as_str())
}

/// UPI deep link encoding the payment for a registration type
///
/// Used as QR content when the static QR image is unavailable.
#[must_use]
pub fn upi_payment_uri(config: &PaymentConfig, registration_type: RegistrationType) -> String {
    let note = match registration_type {
        RegistrationType::Individual => "Event registration (individual)",
        RegistrationType::Bulk => "Event registration (team)",
    };

    format!(
        "upi://pay?pa={}&pn={}&am={:.2}&cu={}&tn={}",
        urlencoding::encode(&config.upi_id),
        urlencoding::encode(&config.payee_name),
        config.amount_for(registration_type),
        urlencoding::encode(&config.currency),
        urlencoding::encode(note),
    )
}
