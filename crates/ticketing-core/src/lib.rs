//! Core types, validators and step gates for the event ticketing client
//!
//! Nothing in this crate performs network I/O. The HTTP side lives in
//! `ticketing-client`.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod config;
pub mod error;
pub mod gate;
pub mod models;
pub mod payment;
pub mod policy;
pub mod types;
pub mod validation;

/// Error context for binaries and top-level flows
pub mod context_error {
    use std::{error::Error as StdError, fmt};

    /// An error message with an optional underlying cause
    #[derive(Debug)]
    pub struct ContextError {
        source: Option<Box<dyn StdError + Send + Sync>>,
        message: String,
    }

    impl ContextError {
        /// Create a new context error from a message
        pub fn new<S: Into<String>>(message: S) -> Self {
            Self {
                source: None,
                message: message.into(),
            }
        }

        /// Wrap an existing error with context
        pub fn with_context<E, S>(error: E, message: S) -> Self
        where
            E: StdError + Send + Sync + 'static,
            S: Into<String>,
        {
            Self {
                source: Some(Box::new(error)),
                message: message.into(),
            }
        }
    }

    impl fmt::Display for ContextError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match &self.source {
                Some(source) => write!(f, "{}: {source}", self.message),
                None => f.write_str(&self.message),
            }
        }
    }

    impl StdError for ContextError {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            self.source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn StdError + 'static))
        }
    }

    /// Result type alias for context errors
    pub type Result<T> = std::result::Result<T, ContextError>;

    /// Create a context error from a message or format string
    #[macro_export]
    macro_rules! context_error {
        ($msg:literal) => {
            $crate::context_error::ContextError::new($msg)
        };
        ($fmt:expr, $($arg:tt)*) => {
            $crate::context_error::ContextError::new(format!($fmt, $($arg)*))
        };
    }

    /// Extension trait for adding context to results
    pub trait ResultExt<T> {
        /// Add context to an error
        fn with_context<F, S>(self, f: F) -> Result<T>
        where
            F: FnOnce() -> S,
            S: Into<String>;
    }

    impl<T, E> ResultExt<T> for std::result::Result<T, E>
    where
        E: StdError + Send + Sync + 'static,
    {
        fn with_context<F, S>(self, f: F) -> Result<T>
        where
            F: FnOnce() -> S,
            S: Into<String>,
        {
            self.map_err(|e| ContextError::with_context(e, f()))
        }
    }

    impl From<crate::Error> for ContextError {
        fn from(err: crate::Error) -> Self {
            Self::new(err.to_string())
        }
    }

    impl From<crate::gate::GateFailure> for ContextError {
        fn from(err: crate::gate::GateFailure) -> Self {
            Self::new(err.reason())
        }
    }
}

pub use config::{ApiConfig, Config, LoggingConfig};
pub use error::{Error, Result};
pub use gate::{GateFailure, Step, can_advance};
pub use payment::PaymentConfig;
pub use policy::UploadPolicy;
pub use types::{
    ContactDetails, DraftKind, PaymentScreenshot, Registration, RegistrationDraft,
    RegistrationEntry, RegistrationType, TeamDraft,
};
pub use validation::{Field, FieldError};

/// Initialize the logging system
///
/// `level` is an `EnvFilter` directive used when `RUST_LOG` is unset.
/// `format` selects `json` output; anything else logs human-readable lines.
///
/// # Errors
///
/// Returns an error if the filter is invalid or a global subscriber is
/// already installed.
pub fn init_logging(level: &str, format: &str) -> context_error::Result<()> {
    use context_error::ResultExt;
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)
            .with_context(|| format!("Invalid log level '{level}'"))?,
    };

    let registry = tracing_subscriber::registry().with(filter);
    if format.eq_ignore_ascii_case("json") {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .with_context(|| "Failed to install JSON logger")?;
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .try_init()
            .with_context(|| "Failed to install logger")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::context_error::{ContextError, ResultExt};
    use std::error::Error as _;

    #[test]
    fn test_context_error_display_includes_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = ContextError::with_context(io, "Reading screenshot");
        assert_eq!(err.to_string(), "Reading screenshot: missing");
        assert!(err.source().is_some());
    }

    #[test]
    fn test_result_ext_adds_context() {
        let result: Result<(), std::io::Error> = Err(std::io::Error::other("boom"));
        let err = result.with_context(|| "Loading config").unwrap_err();
        assert!(err.to_string().starts_with("Loading config"));
    }

    #[test]
    fn test_macro_formats_message() {
        let err = crate::context_error!("{} registrations", 3);
        assert_eq!(err.to_string(), "3 registrations");
        assert!(err.source().is_none());
    }

    #[test]
    fn test_logger_installs_only_once() {
        let _ = super::init_logging("debug", "json");
        assert!(super::init_logging("debug", "pretty").is_err());
    }
}
