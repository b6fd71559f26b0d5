//! Registration domain types
//!
//! A [`RegistrationDraft`] is what the wizard mutates while the participant
//! types. A [`Registration`] is the validated form of a draft and can only be
//! obtained through [`Registration::from_draft`], which runs both step gates.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Kind of registration, sent to the backend as `payment_type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationType {
    /// A single participant
    Individual,
    /// A team registered by its leader
    Bulk,
}

impl RegistrationType {
    /// Wire name of the registration type
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Individual => "individual",
            Self::Bulk => "bulk",
        }
    }
}

impl fmt::Display for RegistrationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegistrationType {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "individual" => Ok(Self::Individual),
            "bulk" | "team" => Ok(Self::Bulk),
            other => Err(crate::Error::Validation {
                field: "payment_type".to_string(),
                message: format!("unknown registration type '{other}'"),
            }),
        }
    }
}

/// Contact details of the registrant (the team leader for bulk registrations)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    /// Full name
    pub name: String,
    /// Email address
    pub email: String,
    /// Phone number, optionally with a `+` country code
    pub phone: String,
}

impl ContactDetails {
    pub(crate) fn trimmed(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
        }
    }
}

/// Team fields, only present on bulk drafts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamDraft {
    /// Team name
    pub team_name: String,
    /// Raw comma-separated member names as typed
    pub members_input: String,
}

/// The registration-type branch of a draft
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DraftKind {
    /// Individual registration carries no extra fields
    Individual,
    /// Bulk registration carries the team fields
    Bulk(TeamDraft),
}

impl DraftKind {
    /// Registration type of this branch
    #[must_use]
    pub const fn registration_type(&self) -> RegistrationType {
        match self {
            Self::Individual => RegistrationType::Individual,
            Self::Bulk(_) => RegistrationType::Bulk,
        }
    }
}

/// Payment screenshot selected by the participant
#[derive(Clone, PartialEq, Eq)]
pub struct PaymentScreenshot {
    /// Original file name, forwarded to the backend as-is
    pub file_name: String,
    /// MIME type used for validation
    pub content_type: String,
    /// File contents
    pub bytes: Bytes,
}

impl PaymentScreenshot {
    /// Create a screenshot from in-memory contents
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a screenshot from disk
    ///
    /// The MIME type is taken from the file's magic bytes, not its extension.
    /// Unknown contents are labelled `application/octet-stream` and left for
    /// the file validator to reject.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn from_path(path: &Path) -> crate::Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("payment_screenshot")
            .to_string();
        let content_type = crate::validation::sniff_image_type(&bytes)
            .unwrap_or("application/octet-stream")
            .to_string();

        Ok(Self {
            file_name,
            content_type,
            bytes: Bytes::from(bytes),
        })
    }

    /// Size of the file in bytes
    #[must_use]
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

impl fmt::Debug for PaymentScreenshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentScreenshot")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// Client-side registration draft
///
/// `kind` is `None` until a registration type has been chosen. Team fields
/// only exist inside [`DraftKind::Bulk`], so an individual draft cannot carry
/// them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationDraft {
    /// Registrant contact details
    pub contact: ContactDetails,
    /// Selected registration branch
    pub kind: Option<DraftKind>,
    /// Selected payment screenshot
    pub payment_screenshot: Option<PaymentScreenshot>,
}

impl RegistrationDraft {
    /// Create an empty draft
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently selected registration type
    #[must_use]
    pub fn registration_type(&self) -> Option<RegistrationType> {
        self.kind.as_ref().map(DraftKind::registration_type)
    }

    /// Select a registration type
    ///
    /// Re-selecting the current type keeps the branch as it is. Switching
    /// to the other type starts a fresh branch, so bulk fields are dropped
    /// when switching to an individual registration.
    pub fn select_type(&mut self, registration_type: RegistrationType) {
        if self.registration_type() == Some(registration_type) {
            return;
        }

        self.kind = Some(match registration_type {
            RegistrationType::Individual => DraftKind::Individual,
            RegistrationType::Bulk => DraftKind::Bulk(TeamDraft::default()),
        });
    }

    /// Team fields, if this is a bulk draft
    #[must_use]
    pub const fn team(&self) -> Option<&TeamDraft> {
        match &self.kind {
            Some(DraftKind::Bulk(team)) => Some(team),
            _ => None,
        }
    }

    /// Mutable team fields, if this is a bulk draft
    pub fn team_mut(&mut self) -> Option<&mut TeamDraft> {
        match &mut self.kind {
            Some(DraftKind::Bulk(team)) => Some(team),
            _ => None,
        }
    }
}

/// Validated registration branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationEntry {
    /// Individual registration
    Individual,
    /// Bulk registration with exactly four named members
    Bulk {
        /// Trimmed team name
        team_name: String,
        /// Trimmed member names in input order
        members: Vec<String>,
    },
}

impl RegistrationEntry {
    /// Registration type of this entry
    #[must_use]
    pub const fn registration_type(&self) -> RegistrationType {
        match self {
            Self::Individual => RegistrationType::Individual,
            Self::Bulk { .. } => RegistrationType::Bulk,
        }
    }
}

/// A registration that passed both step gates and is ready to submit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    contact: ContactDetails,
    entry: RegistrationEntry,
    payment_screenshot: PaymentScreenshot,
}

impl Registration {
    pub(crate) const fn new(
        contact: ContactDetails,
        entry: RegistrationEntry,
        payment_screenshot: PaymentScreenshot,
    ) -> Self {
        Self {
            contact,
            entry,
            payment_screenshot,
        }
    }

    /// Trimmed contact details
    #[must_use]
    pub const fn contact(&self) -> &ContactDetails {
        &self.contact
    }

    /// Registration branch
    #[must_use]
    pub const fn entry(&self) -> &RegistrationEntry {
        &self.entry
    }

    /// Registration type
    #[must_use]
    pub const fn registration_type(&self) -> RegistrationType {
        self.entry.registration_type()
    }

    /// Payment screenshot
    #[must_use]
    pub const fn payment_screenshot(&self) -> &PaymentScreenshot {
        &self.payment_screenshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_registration_type_wire_names() {
        assert_eq!(RegistrationType::Individual.as_str(), "individual");
        assert_eq!(RegistrationType::Bulk.to_string(), "bulk");
        assert_eq!(
            "Bulk".parse::<RegistrationType>().unwrap(),
            RegistrationType::Bulk
        );
        assert_eq!(
            "team".parse::<RegistrationType>().unwrap(),
            RegistrationType::Bulk
        );
        assert!("group".parse::<RegistrationType>().is_err());
    }

    #[test]
    fn test_registration_type_serde() {
        let json = serde_json::to_string(&RegistrationType::Individual).unwrap();
        assert_eq!(json, "\"individual\"");
    }

    #[test]
    fn test_new_draft_has_no_type() {
        let draft = RegistrationDraft::new();
        assert!(draft.registration_type().is_none());
        assert!(draft.team().is_none());
        assert!(draft.payment_screenshot.is_none());
    }

    #[test]
    fn test_reselecting_same_type_keeps_team_fields() {
        let mut draft = RegistrationDraft::new();
        draft.select_type(RegistrationType::Bulk);
        draft.team_mut().unwrap().team_name = "Tech Wizards".to_string();

        draft.select_type(RegistrationType::Bulk);
        assert_eq!(draft.team().unwrap().team_name, "Tech Wizards");
    }

    #[test]
    fn test_switching_to_individual_drops_team_fields() {
        let mut draft = RegistrationDraft::new();
        draft.select_type(RegistrationType::Bulk);
        draft.team_mut().unwrap().members_input = "A1,B2,C3,D4".to_string();

        draft.select_type(RegistrationType::Individual);
        assert_eq!(draft.kind, Some(DraftKind::Individual));

        draft.select_type(RegistrationType::Bulk);
        assert_eq!(draft.team().unwrap(), &TeamDraft::default());
    }

    #[test]
    fn test_screenshot_debug_hides_contents() {
        let shot = PaymentScreenshot::new("pay.png", "image/png", vec![0u8; 16]);
        let debug = format!("{shot:?}");
        assert!(debug.contains("pay.png"));
        assert!(debug.contains("size: 16"));
        assert_eq!(shot.size(), 16);
    }

    #[test]
    fn test_screenshot_from_path_sniffs_type() {
        let mut file = tempfile::Builder::new().suffix(".gif").tempfile().unwrap();
        file.write_all(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0])
            .unwrap();

        let shot = PaymentScreenshot::from_path(file.path()).unwrap();
        assert_eq!(shot.content_type, "image/png");
        assert!(shot.file_name.ends_with(".gif"));
        assert_eq!(shot.size(), 10);
    }

    #[test]
    fn test_screenshot_from_missing_path() {
        let result = PaymentScreenshot::from_path(Path::new("/nonexistent/pay.png"));
        assert!(matches!(result, Err(crate::Error::Io(_))));
    }
}
