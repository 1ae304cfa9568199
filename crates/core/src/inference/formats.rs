//! String format detection
//!
//! Document stores frequently keep identifiers and timestamps as plain
//! strings. Recognising them lets the diagram show `string(date-time)` instead
//! of a bare `string`, and lets relationship detection treat hex object ids
//! stored as text as reference candidates.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Detected string format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Format {
    /// 24 hex digit MongoDB object id stored as text
    ObjectId,
    /// UUID/GUID
    Uuid,
    /// ISO 8601 date-time (YYYY-MM-DDTHH:MM:SS)
    DateTime,
    /// ISO 8601 date (YYYY-MM-DD)
    Date,
    /// Time of day (HH:MM:SS)
    Time,
    /// Email address
    Email,
    /// URI/URL
    Uri,
    /// IPv4 address
    Ipv4,
}

impl Format {
    /// Short name used in type labels
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::ObjectId => "object-id",
            Format::Uuid => "uuid",
            Format::DateTime => "date-time",
            Format::Date => "date",
            Format::Time => "time",
            Format::Email => "email",
            Format::Uri => "uri",
            Format::Ipv4 => "ipv4",
        }
    }

    /// Whether values of this format usually identify another document
    pub fn is_identifier(&self) -> bool {
        matches!(self, Format::ObjectId | Format::Uuid)
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

static OBJECT_ID_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9a-fA-F]{24}$").unwrap());

static UUID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .unwrap()
});

static DATETIME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}:\d{2}(\.\d+)?(Z|[+-]\d{2}:?\d{2})?$").unwrap()
});

static DATE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

static TIME_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{2}:\d{2}:\d{2}(\.\d+)?$").unwrap());

static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());

static URI_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(https?|ftp|file|mongodb(\+srv)?)://[^\s/$.?#].[^\s]*$").unwrap());

static IPV4_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^((25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)$",
    )
    .unwrap()
});

/// Detect the format of a string value
///
/// Checks run from the most to the least specific pattern. Returns `None`
/// for free text.
pub fn detect_format(value: &str) -> Option<Format> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    let checks: [(&Lazy<Regex>, Format); 8] = [
        (&OBJECT_ID_REGEX, Format::ObjectId),
        (&UUID_REGEX, Format::Uuid),
        (&DATETIME_REGEX, Format::DateTime),
        (&DATE_REGEX, Format::Date),
        (&TIME_REGEX, Format::Time),
        (&EMAIL_REGEX, Format::Email),
        (&URI_REGEX, Format::Uri),
        (&IPV4_REGEX, Format::Ipv4),
    ];

    checks
        .iter()
        .find(|(regex, _)| regex.is_match(value))
        .map(|(_, format)| *format)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_object_id() {
        assert_eq!(
            detect_format("507f1f77bcf86cd799439011"),
            Some(Format::ObjectId)
        );
        // 23 digits is just text
        assert_eq!(detect_format("507f1f77bcf86cd79943901"), None);
    }

    #[test]
    fn test_detect_uuid() {
        assert_eq!(
            detect_format("550e8400-e29b-41d4-a716-446655440000"),
            Some(Format::Uuid)
        );
    }

    #[test]
    fn test_detect_dates() {
        assert_eq!(detect_format("2024-01-15"), Some(Format::Date));
        assert_eq!(detect_format("2024-01-15T10:30:00Z"), Some(Format::DateTime));
        assert_eq!(detect_format("2024-01-15 10:30:00"), Some(Format::DateTime));
        assert_eq!(detect_format("10:30:00"), Some(Format::Time));
        assert_eq!(detect_format("2024-1-15"), None);
    }

    #[test]
    fn test_detect_contact_formats() {
        assert_eq!(detect_format("user@example.com"), Some(Format::Email));
        assert_eq!(detect_format("https://example.com/a"), Some(Format::Uri));
        assert_eq!(
            detect_format("mongodb+srv://cluster0.example.net"),
            Some(Format::Uri)
        );
        assert_eq!(detect_format("192.168.1.1"), Some(Format::Ipv4));
    }

    #[test]
    fn test_free_text() {
        assert_eq!(detect_format(""), None);
        assert_eq!(detect_format("   "), None);
        assert_eq!(detect_format("hello world"), None);
    }

    #[test]
    fn test_identifier_formats() {
        assert!(Format::ObjectId.is_identifier());
        assert!(Format::Uuid.is_identifier());
        assert!(!Format::Email.is_identifier());
    }
}
