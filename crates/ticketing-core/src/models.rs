//! Wire models of the ticketing backend API

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Acknowledgement returned by `POST /api/register`
///
/// Every field is optional; a 2xx response with an unexpected body still
/// counts as a successful submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledgement {
    /// Registration id assigned by the backend
    #[serde(default)]
    pub id: Option<i64>,
    /// Registrant name as stored
    #[serde(default)]
    pub name: Option<String>,
    /// Registrant email as stored
    #[serde(default)]
    pub email: Option<String>,
    /// Review status, normally `pending`
    #[serde(default)]
    pub status: Option<String>,
    /// Message from the backend
    #[serde(default)]
    pub message: Option<String>,
}

/// Review status of a registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    /// Awaiting payment review
    Pending,
    /// Payment approved, ticket issued
    Approved,
    /// Payment rejected
    Rejected,
}

impl StatusFilter {
    /// Wire name of the status
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusFilter {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(crate::Error::Validation {
                field: "status_filter".to_string(),
                message: "Invalid status filter. Use: pending, approved, or rejected".to_string(),
            }),
        }
    }
}

/// Public status lookup result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationStatus {
    /// Registration id
    pub id: i64,
    /// Registrant name
    pub name: String,
    /// Registrant email
    pub email: String,
    /// Review status
    pub status: String,
    /// Creation time as ISO-8601 text
    pub created_at: String,
}

/// Registration row in the admin list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationSummary {
    /// Registration id
    pub id: i64,
    /// Registrant name
    pub name: String,
    /// Registrant email
    pub email: String,
    /// Registrant phone
    pub phone: String,
    /// Team name for bulk registrations
    #[serde(default)]
    pub team_name: Option<String>,
    /// Team members as stored by the backend
    #[serde(default)]
    pub members: Option<String>,
    /// Review status
    pub status: String,
    /// Creation time as ISO-8601 text
    pub created_at: String,
}

/// Admin list of registrations with status counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationList {
    /// Total registrations regardless of filter
    pub total: u64,
    /// Pending registrations
    pub pending: u64,
    /// Approved registrations
    pub approved: u64,
    /// Rejected registrations
    pub rejected: u64,
    /// Registrations matching the filter, newest first
    pub registrations: Vec<RegistrationSummary>,
}

/// Single registration detail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationDetail {
    /// Registration id
    pub id: i64,
    /// Registrant name
    pub name: String,
    /// Registrant email
    pub email: String,
    /// Registrant phone
    pub phone: String,
    /// Team name for bulk registrations
    #[serde(default)]
    pub team_name: Option<String>,
    /// Team members as stored by the backend
    #[serde(default)]
    pub members: Option<String>,
    /// Review status
    pub status: String,
    /// Creation time as ISO-8601 text
    pub created_at: String,
    /// Last update time as ISO-8601 text
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Dashboard counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    /// All registrations
    pub total_registrations: u64,
    /// Pending registrations
    pub pending: u64,
    /// Approved registrations
    pub approved: u64,
    /// Rejected registrations
    pub rejected: u64,
    /// Registrations with a team name
    pub with_teams: u64,
}

/// Audit log entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    /// Entry id
    pub id: i64,
    /// Acting admin id
    pub admin_id: i64,
    /// Acting admin name
    pub admin_name: String,
    /// Acting admin email
    pub admin_email: String,
    /// Action label, e.g. `Approved Payment`
    pub action: String,
    /// Free-form details
    #[serde(default)]
    pub details: Option<String>,
    /// Affected registration
    #[serde(default)]
    pub registration_id: Option<i64>,
    /// Client IP address
    #[serde(default)]
    pub ip_address: Option<String>,
    /// Client user agent
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Time of the action
    #[serde(deserialize_with = "utc_timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Audit log query parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditLogQuery {
    /// Page size, clamped to 1..=500
    pub limit: u32,
    /// Entries to skip
    pub offset: u32,
    /// Only entries with this action
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    /// Only entries by this admin
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_id: Option<i64>,
}

/// Largest page the audit endpoint serves
pub const MAX_AUDIT_PAGE: u32 = 500;

impl Default for AuditLogQuery {
    fn default() -> Self {
        Self {
            limit: 100,
            offset: 0,
            action: None,
            admin_id: None,
        }
    }
}

impl AuditLogQuery {
    /// Copy of the query with the limit clamped to what the backend accepts
    #[must_use]
    pub fn clamped(&self) -> Self {
        Self {
            limit: self.limit.clamp(1, MAX_AUDIT_PAGE),
            ..self.clone()
        }
    }
}

/// Audit log counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStats {
    /// All audit entries
    pub total_logs: u64,
    /// Entries per action label
    #[serde(default)]
    pub action_counts: HashMap<String, u64>,
    /// Entries in the last 24 hours
    pub last_24h: u64,
}

/// Ticket holder details returned by verification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketDetails {
    /// Ticket serial code
    pub serial_code: String,
    /// Holder name
    pub name: String,
    /// Holder email
    pub email: String,
    /// Holder phone
    pub phone: String,
    /// Team name for bulk registrations
    #[serde(default)]
    pub team_name: Option<String>,
    /// Team members
    #[serde(default)]
    pub members: Option<String>,
    /// Whether the ticket was already used for entry
    pub ticket_used: bool,
    /// Registration status
    pub status: String,
}

/// Ticket verification result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketVerification {
    /// Whether the ticket admits entry now
    pub valid: bool,
    /// Explanation from the backend
    pub message: String,
    /// Holder details when the ticket exists and is approved
    #[serde(default)]
    pub details: Option<TicketDetails>,
}

/// Result of marking a ticket as used
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkUsedResponse {
    /// Whether the ticket was marked
    pub success: bool,
    /// Message from the backend
    pub message: String,
}

/// Event settings managed from the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSettings {
    /// Settings row id
    pub id: i64,
    /// Event name
    pub event_name: String,
    /// Event type
    pub event_type: String,
    /// Event date
    pub event_date: String,
    /// Event start time
    pub event_time: String,
    /// Venue label
    pub event_venue: String,
    /// Venue address
    pub event_location: String,
    /// Price of an individual registration
    pub individual_price: f64,
    /// Price of a bulk registration
    pub bulk_price: f64,
    /// Team size for bulk registrations
    pub bulk_team_size: u32,
    /// ISO currency code
    pub currency: String,
    /// UPI id receiving payments
    pub upi_id: String,
    /// Payment instructions shown to participants
    #[serde(default)]
    pub payment_instructions: Option<String>,
    /// Organizer name
    pub organization_name: String,
    /// Support contact
    pub support_email: String,
    /// Subject of approval emails
    pub approval_email_subject: String,
    /// Subject of rejection emails
    pub rejection_email_subject: String,
}

/// Partial settings update; unset fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsUpdate {
    /// Event name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,
    /// Event type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    /// Event date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_date: Option<String>,
    /// Event start time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_time: Option<String>,
    /// Venue label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_venue: Option<String>,
    /// Venue address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_location: Option<String>,
    /// Price of an individual registration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub individual_price: Option<f64>,
    /// Price of a bulk registration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bulk_price: Option<f64>,
    /// Team size for bulk registrations
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bulk_team_size: Option<u32>,
    /// ISO currency code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    /// UPI id receiving payments
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upi_id: Option<String>,
    /// Payment instructions shown to participants
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_instructions: Option<String>,
    /// Organizer name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_name: Option<String>,
    /// Support contact
    #[serde(skip_serializing_if = "Option::is_none")]
    pub support_email: Option<String>,
    /// Subject of approval emails
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval_email_subject: Option<String>,
    /// Subject of rejection emails
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_email_subject: Option<String>,
}

impl SettingsUpdate {
    /// Whether the update would change nothing
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.event_name.is_none()
            && self.event_type.is_none()
            && self.event_date.is_none()
            && self.event_time.is_none()
            && self.event_venue.is_none()
            && self.event_location.is_none()
            && self.individual_price.is_none()
            && self.bulk_price.is_none()
            && self.bulk_team_size.is_none()
            && self.currency.is_none()
            && self.upi_id.is_none()
            && self.payment_instructions.is_none()
            && self.organization_name.is_none()
            && self.support_email.is_none()
            && self.approval_email_subject.is_none()
            && self.rejection_email_subject.is_none()
    }
}

/// Dashboard role of an admin account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminRole {
    /// Full access including admin management
    Superadmin,
    /// Event-day staff
    Staff,
    /// Payment reviewer
    Reviewer,
}

impl AdminRole {
    /// Wire name of the role
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Superadmin => "superadmin",
            Self::Staff => "staff",
            Self::Reviewer => "reviewer",
        }
    }
}

impl FromStr for AdminRole {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "superadmin" => Ok(Self::Superadmin),
            "staff" => Ok(Self::Staff),
            "reviewer" => Ok(Self::Reviewer),
            _ => Err(crate::Error::Validation {
                field: "role".to_string(),
                message: "Invalid role. Use 'superadmin', 'staff', or 'reviewer'".to_string(),
            }),
        }
    }
}

/// Admin account as listed by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminAccount {
    /// Account id
    pub id: i64,
    /// Login name
    pub username: String,
    /// Email address
    pub email: String,
    /// Display name
    pub name: String,
    /// Role as stored; unknown roles are kept verbatim
    pub role: String,
    /// Whether the account may log in
    pub is_active: bool,
    /// Creation time
    #[serde(deserialize_with = "utc_timestamp")]
    pub created_at: DateTime<Utc>,
    /// Last successful login
    #[serde(default, deserialize_with = "optional_utc_timestamp")]
    pub last_login: Option<DateTime<Utc>>,
}

/// New admin account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAdmin {
    /// Login name
    pub username: String,
    /// Email address
    pub email: String,
    /// Initial password
    pub password: String,
    /// Display name
    pub name: String,
    /// Role
    pub role: AdminRole,
}

/// Changes to an existing admin account; unset fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUpdate {
    /// Login name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Email address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// New password
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Role
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<AdminRole>,
    /// Whether the account may log in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl AdminUpdate {
    /// Whether the update would change nothing
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.password.is_none()
            && self.name.is_none()
            && self.role.is_none()
            && self.is_active.is_none()
    }
}

/// Logged-in admin as returned by the login endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminProfile {
    /// Account id
    #[serde(default)]
    pub id: Option<i64>,
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
    /// Email address
    #[serde(default)]
    pub email: Option<String>,
    /// Role
    #[serde(default)]
    pub role: Option<String>,
}

/// Login endpoint response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Bearer token for subsequent admin calls
    pub access_token: String,
    /// Token type, normally `bearer`
    #[serde(default)]
    pub token_type: Option<String>,
    /// Logged-in admin
    #[serde(default)]
    pub user: AdminProfile,
}

/// Error body the backend returns on non-2xx responses
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ErrorBody {
    /// Human-readable reason
    pub detail: String,
}

/// Parse a backend timestamp
///
/// The backend stores naive UTC times and serializes them without an
/// offset (`2025-09-20T09:00:00.123456`). Those are read as UTC; values
/// carrying an RFC 3339 offset are converted to UTC.
///
/// # Errors
///
/// Returns the chrono parse error when the value matches neither form.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    let value = value.trim();
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
                .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f"))
                .map(|naive| naive.and_utc())
        })
}

fn utc_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

fn optional_utc_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|raw| parse_timestamp(&raw).map_err(serde::de::Error::custom))
        .transpose()
}
