//! HTTP side of the event ticketing client
//!
//! This crate drives the registration wizard, submits registrations to the
//! backend, and wraps the public and admin endpoints. Validation and domain
//! types come from `ticketing-core`.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::significant_drop_tightening
)]

pub mod admin;
pub mod client;
pub mod error;
pub mod mock;
pub mod public;
pub mod session;
pub mod submission;
pub mod wizard;

pub use client::ApiClient;
pub use error::{ClientError, ClientResult, SubmitError, WizardError};
pub use mock::MockSubmitter;
pub use public::PaymentQr;
pub use session::Session;
pub use submission::{HttpSubmitter, RegistrationSubmitter, SubmissionPayload};
pub use wizard::{Notice, NoticeKind, Wizard, WizardState};
