//! Field validators for the registration form
//!
//! Every validator is pure and returns the first problem it finds as a
//! [`FieldError`] whose reason can be shown to the participant verbatim.

use crate::policy::UploadPolicy;
use crate::types::PaymentScreenshot;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use validator::ValidateEmail;

/// Minimum trimmed length of any name field
pub const MIN_NAME_LENGTH: usize = 2;

/// Number of team members a bulk registration must list
pub const REQUIRED_TEAM_MEMBERS: usize = 4;

#[allow(clippy::expect_used)]
static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\+\d{1,3})?\d{10}$").expect("phone pattern is valid"));

/// Form fields that can fail validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Individual or bulk selection
    RegistrationType,
    /// Participant or team leader name
    Name,
    /// Email address
    Email,
    /// Phone number
    Phone,
    /// Team name
    TeamName,
    /// Comma-separated team members
    TeamMembers,
    /// Payment screenshot upload
    PaymentScreenshot,
}

impl Field {
    /// Name of the field as sent to the backend
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RegistrationType => "payment_type",
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::TeamName => "team_name",
            Self::TeamMembers => "members",
            Self::PaymentScreenshot => "payment_screenshot",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed field check with a user-displayable reason
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Field that failed
    pub field: Field,
    /// Reason shown to the participant
    pub reason: String,
}

impl FieldError {
    /// Create a field error
    pub fn new(field: Field, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

impl std::error::Error for FieldError {}

impl From<FieldError> for crate::Error {
    fn from(err: FieldError) -> Self {
        Self::Validation {
            field: err.field.as_str().to_string(),
            message: err.reason,
        }
    }
}

/// Validate a single text field by kind
///
/// Team members are validated as the whole comma-separated list.
///
/// # Errors
///
/// Returns the reason the value is not acceptable.
pub fn validate_field(field: Field, value: &str) -> Result<(), FieldError> {
    match field {
        Field::Name => validate_name(value),
        Field::Email => validate_email(value),
        Field::Phone => validate_phone(value),
        Field::TeamName => validate_team_name(value),
        Field::TeamMembers => parse_team_members(value).map(|_| ()),
        Field::RegistrationType => value
            .parse::<crate::types::RegistrationType>()
            .map(|_| ())
            .map_err(|_| FieldError::new(field, "Please choose a registration type")),
        Field::PaymentScreenshot => Err(FieldError::new(
            field,
            "Payment screenshot must be validated as a file",
        )),
    }
}

fn is_short(value: &str) -> bool {
    value.trim().chars().count() < MIN_NAME_LENGTH
}

/// Validate the participant (or team leader) name
///
/// # Errors
///
/// Fails if the trimmed name is shorter than two characters.
pub fn validate_name(value: &str) -> Result<(), FieldError> {
    if is_short(value) {
        return Err(FieldError::new(
            Field::Name,
            "Name must be at least 2 characters",
        ));
    }
    Ok(())
}

/// Validate the team name of a bulk registration
///
/// # Errors
///
/// Fails if the trimmed team name is shorter than two characters.
pub fn validate_team_name(value: &str) -> Result<(), FieldError> {
    if value.trim().is_empty() {
        return Err(FieldError::new(Field::TeamName, "Team name is required"));
    }
    if is_short(value) {
        return Err(FieldError::new(
            Field::TeamName,
            "Team name must be at least 2 characters",
        ));
    }
    Ok(())
}

/// Validate an email address of the form `local@domain.tld`
///
/// # Errors
///
/// Fails if the address is not a valid email or its domain has no dot.
pub fn validate_email(value: &str) -> Result<(), FieldError> {
    let email = value.trim();
    let has_tld = email
        .rsplit_once('@')
        .is_some_and(|(_, domain)| {
            domain
                .rsplit_once('.')
                .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        });

    if email.validate_email() && has_tld {
        Ok(())
    } else {
        Err(FieldError::new(
            Field::Email,
            "Please enter a valid email address",
        ))
    }
}

/// Strip the separators people type into phone numbers
#[must_use]
pub fn normalize_phone(value: &str) -> String {
    value
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-'))
        .collect()
}

/// Validate a phone number
///
/// After removing spaces and hyphens the number must be an optional
/// `+<country code>` followed by exactly ten digits.
///
/// # Errors
///
/// Fails if the normalized number does not match.
pub fn validate_phone(value: &str) -> Result<(), FieldError> {
    if PHONE_PATTERN.is_match(&normalize_phone(value)) {
        Ok(())
    } else {
        Err(FieldError::new(
            Field::Phone,
            "Please enter a valid 10-digit phone number",
        ))
    }
}

/// Parse and validate the comma-separated team member list
///
/// Entries are trimmed and empty entries dropped before counting.
///
/// # Errors
///
/// Fails unless exactly four members remain, each at least two characters.
pub fn parse_team_members(input: &str) -> Result<Vec<String>, FieldError> {
    let members: Vec<String> = input
        .split(',')
        .map(str::trim)
        .filter(|member| !member.is_empty())
        .map(ToString::to_string)
        .collect();

    if members.len() != REQUIRED_TEAM_MEMBERS {
        return Err(FieldError::new(
            Field::TeamMembers,
            format!(
                "Please enter exactly {REQUIRED_TEAM_MEMBERS} team members (found {})",
                members.len()
            ),
        ));
    }

    if members.iter().any(|member| is_short(member)) {
        return Err(FieldError::new(
            Field::TeamMembers,
            "Each team member name must be at least 2 characters",
        ));
    }

    Ok(members)
}

/// Validate a payment screenshot against the upload policy
///
/// Only the MIME type and size are checked; the file name is ignored.
///
/// # Errors
///
/// Fails if the type is not allowed or the file is too large.
pub fn validate_screenshot(
    screenshot: &PaymentScreenshot,
    policy: &UploadPolicy,
) -> Result<(), FieldError> {
    if !policy.allows_type(&screenshot.content_type) {
        return Err(FieldError::new(
            Field::PaymentScreenshot,
            format!(
                "Please upload a valid image file ({})",
                policy.describe_types()
            ),
        ));
    }

    if screenshot.size() > policy.max_file_size {
        return Err(FieldError::new(
            Field::PaymentScreenshot,
            format!("File size must be less than {}", policy.describe_max_size()),
        ));
    }

    Ok(())
}

/// Detect common image formats from their magic bytes
#[must_use]
pub fn sniff_image_type(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        Some("image/png")
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        Some("image/gif")
    } else if bytes.starts_with(b"RIFF") && bytes.get(8..12) == Some(b"WEBP".as_slice()) {
        Some("image/webp")
    } else {
        None
    }
}
