//! Mock submitter for testing

use crate::error::SubmitError;
use crate::submission::RegistrationSubmitter;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::time::{Duration, sleep};
use ticketing_core::Registration;
use ticketing_core::models::Acknowledgement;

/// Submitter that records calls instead of talking to a backend
///
/// Clones share the call counter and the recorded registrations.
#[derive(Debug, Clone, Default)]
pub struct MockSubmitter {
    delay_ms: u64,
    failure: Option<SubmitError>,
    calls: Arc<AtomicUsize>,
    submitted: Arc<Mutex<Vec<Registration>>>,
}

impl MockSubmitter {
    /// Create a mock that accepts every registration immediately
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay each submission
    #[must_use]
    pub const fn with_delay(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// Fail every submission with this error
    #[must_use]
    pub fn with_failure(mut self, failure: SubmitError) -> Self {
        self.failure = Some(failure);
        self
    }

    /// Number of submissions attempted so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Registrations received so far
    pub fn submitted(&self) -> Vec<Registration> {
        self.submitted.lock().clone()
    }
}

#[async_trait]
impl RegistrationSubmitter for MockSubmitter {
    async fn submit(&self, registration: &Registration) -> Result<Acknowledgement, SubmitError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.submitted.lock().push(registration.clone());

        if self.delay_ms > 0 {
            sleep(Duration::from_millis(self.delay_ms)).await;
        }

        if let Some(failure) = &self.failure {
            return Err(failure.clone());
        }

        Ok(Acknowledgement {
            id: i64::try_from(call).ok(),
            name: Some(registration.contact().name.clone()),
            email: Some(registration.contact().email.clone()),
            status: Some("pending".to_string()),
            message: Some("Registration received".to_string()),
        })
    }
}
