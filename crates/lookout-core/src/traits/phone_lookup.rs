// # Phone Lookup Trait
//
// Defines the interface for resolving phone-number metadata.
//
// The reference implementation (`lookout-phone`) is purely local: it
// parses and classifies against an offline numbering-plan database and
// performs no network I/O. The trait is also the extension point for a
// future online reverse-lookup source; none ships today.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Line type of a phone number, as classified by the metadata library
///
/// Unknown classification codes map to [`LineType::Unknown`] rather than
/// failing the lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineType {
    FixedLine,
    Mobile,
    FixedLineOrMobile,
    TollFree,
    PremiumRate,
    SharedCost,
    Voip,
    Personal,
    Pager,
    Uan,
    Voicemail,
    Unknown,
}

impl std::fmt::Display for LineType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LineType::FixedLine => "fixed_line",
            LineType::Mobile => "mobile",
            LineType::FixedLineOrMobile => "fixed_line_or_mobile",
            LineType::TollFree => "toll_free",
            LineType::PremiumRate => "premium_rate",
            LineType::SharedCost => "shared_cost",
            LineType::Voip => "voip",
            LineType::Personal => "personal",
            LineType::Pager => "pager",
            LineType::Uan => "uan",
            LineType::Voicemail => "voicemail",
            LineType::Unknown => "unknown",
        };
        write!(f, "{}", name)
    }
}

/// One normalized phone lookup result. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhoneRecord {
    /// The raw input as given by the caller
    pub input: String,
    /// E.164 canonical form (`+14155552671`)
    pub e164: String,
    /// International human-readable form
    pub international: String,
    /// National form
    pub national: String,
    /// Whether the number is valid for its numbering plan
    pub valid: bool,
    /// Whether the number is structurally possible
    ///
    /// Validity and possibility are computed independently; a number can
    /// be possible-but-invalid, and both flags are always reported.
    pub possible: bool,
    /// Numeric country calling code (1, 44, 63, ...)
    pub country_code: u16,
    /// National significant number
    pub national_number: u64,
    /// Descriptive location (region) string
    pub location: String,
    /// Carrier name, or "Unknown" when the database carries none
    pub carrier: String,
    /// Classified line type
    pub line_type: LineType,
    /// Comma-joined IANA timezone names for the number's region
    pub timezones: String,
    /// When the lookup completed
    pub captured_at: DateTime<Utc>,
}

/// Validation summary for a phone number, without the descriptive fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhoneValidation {
    /// Whether the number is valid for its numbering plan
    pub valid: bool,
    /// Whether the number is structurally possible
    pub possible: bool,
    /// E.164 canonical form
    pub e164: String,
    /// International human-readable form
    pub international: String,
    /// National form
    pub national: String,
}

/// Trait for phone metadata implementations
///
/// Lookups are synchronous: the reference implementation reads an
/// embedded database and never touches the network, so there is nothing
/// to await and no timeout to manage.
pub trait PhoneLookup: Send + Sync {
    /// Resolve full metadata for a raw phone-number string.
    ///
    /// Parse failure (input that cannot be read as a number at all) fails
    /// the operation with [`crate::Error::Parse`]. A number that parses
    /// but is invalid still yields a successful record with
    /// `valid == false`; an unlikely number is still informative.
    fn lookup(&self, raw: &str) -> crate::Result<PhoneRecord>;

    /// Parse and validate only, skipping the descriptive fields.
    fn validate(&self, raw: &str) -> crate::Result<PhoneValidation>;
}
