//! Upload policy for payment screenshots

use serde::{Deserialize, Serialize};

/// Maximum screenshot size accepted by default (2 MiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 2 * 1024 * 1024;

/// Constraints applied to the payment screenshot
///
/// This is the single source of truth for the file validator and the
/// payment step gate. Older form revisions (5 MiB, GIF allowed) are
/// reproduced by overriding these values in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadPolicy {
    /// Maximum file size in bytes
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,

    /// Accepted MIME types
    #[serde(default = "default_allowed_types")]
    pub allowed_types: Vec<String>,
}

const fn default_max_file_size() -> u64 {
    DEFAULT_MAX_FILE_SIZE
}

fn default_allowed_types() -> Vec<String> {
    vec![
        "image/jpeg".to_string(),
        "image/png".to_string(),
        "image/webp".to_string(),
    ]
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_file_size: default_max_file_size(),
            allowed_types: default_allowed_types(),
        }
    }
}

impl UploadPolicy {
    /// Whether a MIME type is accepted (case-insensitive, parameters ignored)
    #[must_use]
    pub fn allows_type(&self, content_type: &str) -> bool {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim();

        self.allowed_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(essence))
    }

    /// Human-readable list of accepted formats, e.g. `JPG, PNG or WebP`
    #[must_use]
    pub fn describe_types(&self) -> String {
        let labels: Vec<&str> = self
            .allowed_types
            .iter()
            .map(|mime| type_label(mime))
            .collect();

        match labels.split_last() {
            None => String::new(),
            Some((last, [])) => (*last).to_string(),
            Some((last, rest)) => format!("{} or {last}", rest.join(", ")),
        }
    }

    /// Human-readable size limit, e.g. `2MB`
    #[must_use]
    pub fn describe_max_size(&self) -> String {
        format_size(self.max_file_size)
    }
}

fn type_label(mime: &str) -> &str {
    match mime.to_ascii_lowercase().as_str() {
        "image/jpeg" | "image/jpg" => "JPG",
        "image/png" => "PNG",
        "image/webp" => "WebP",
        "image/gif" => "GIF",
        _ => mime,
    }
}

/// Format a byte count the way the registration form labels its limits
#[must_use]
pub fn format_size(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * 1024;

    if bytes >= MIB && bytes % MIB == 0 {
        format!("{}MB", bytes / MIB)
    } else if bytes >= KIB && bytes % KIB == 0 {
        format!("{}KB", bytes / KIB)
    } else {
        format!("{bytes} bytes")
    }
}
