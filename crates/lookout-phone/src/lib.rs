// # Offline Phone Directory
//
// This crate provides the local [`PhoneLookup`] implementation for the
// lookout system, backed by the `phonenumber` port of Google's
// libphonenumber.
//
// ## Purpose
//
// Phone lookups are purely local: parsing, validation and formatting run
// against the embedded numbering-plan database, and the descriptive
// layer (region name, timezones, line type) comes from this crate's own
// descriptors. No network I/O happens here; the `PhoneLookup` trait in
// lookout-core is the extension point for an online reverse-lookup
// source, and none ships.
//
// ## What the port does not carry
//
// libphonenumber's optional geocoder, carrier and timezone data files
// are not part of the Rust port. Region names and timezones therefore
// come from the calling-code descriptor table in [`region`], line types
// from the prefix classifier below, and carrier resolution reports the
// Unknown sentinel.

pub mod region;

use chrono::Utc;
use phonenumber::Mode;

use lookout_core::traits::geo_provider::UNKNOWN;
use lookout_core::traits::{LineType, PhoneLookup, PhoneRecord, PhoneValidation};
use lookout_core::{Error, Result};

use region::region_info;

/// Strip everything but digits and a leading `+`.
///
/// `"+1 (415) 555-2671"` becomes `"+14155552671"`; a `+` anywhere past
/// the first kept character is dropped like any other separator.
fn sanitize(raw: &str) -> String {
    let mut cleaned = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c.is_ascii_digit() {
            cleaned.push(c);
        } else if c == '+' && cleaned.is_empty() {
            cleaned.push(c);
        }
    }
    cleaned
}

/// Classify a number's line type from its calling code and national
/// significant number.
///
/// Coverage is the set of plans where the class is determined by prefix;
/// everything else is `Unknown` rather than a guess.
fn classify_line_type(calling_code: u16, national: &str) -> LineType {
    match calling_code {
        // NANP: service class lives in the area code. Geographic numbers
        // do not distinguish fixed from mobile.
        1 => match &national[..national.len().min(3)] {
            "800" | "833" | "844" | "855" | "866" | "877" | "888" => LineType::TollFree,
            "900" => LineType::PremiumRate,
            _ => LineType::FixedLineOrMobile,
        },
        // United Kingdom (national number without the trunk zero)
        44 => {
            if national.starts_with("70") {
                LineType::Personal
            } else if national.starts_with("76") {
                LineType::Pager
            } else if national.starts_with('7') {
                LineType::Mobile
            } else if national.starts_with("800") || national.starts_with("808") {
                LineType::TollFree
            } else if national.starts_with("84") {
                LineType::SharedCost
            } else if national.starts_with('9') {
                LineType::PremiumRate
            } else if national.starts_with("56") {
                LineType::Voip
            } else if national.starts_with('3') {
                LineType::Uan
            } else if national.starts_with('1') || national.starts_with('2') {
                LineType::FixedLine
            } else {
                LineType::Unknown
            }
        }
        // Philippines
        63 => {
            if national.starts_with('9') {
                LineType::Mobile
            } else if national.starts_with('2') || national.starts_with('3')
                || national.starts_with('4') || national.starts_with('5')
                || national.starts_with('6') || national.starts_with('7')
                || national.starts_with('8')
            {
                LineType::FixedLine
            } else {
                LineType::Unknown
            }
        }
        // Germany
        49 => {
            if national.starts_with("15") || national.starts_with("16")
                || national.starts_with("17")
            {
                LineType::Mobile
            } else if national.starts_with("800") {
                LineType::TollFree
            } else if national.starts_with("900") {
                LineType::PremiumRate
            } else if national.starts_with("700") {
                LineType::Personal
            } else {
                LineType::Unknown
            }
        }
        _ => LineType::Unknown,
    }
}

/// Local phone-number metadata source
///
/// Stateless; the numbering-plan database is embedded in the
/// `phonenumber` crate and loaded lazily on first use.
#[derive(Debug, Default)]
pub struct PhoneDirectory;

impl PhoneDirectory {
    pub fn new() -> Self {
        Self
    }

    /// Parse `raw` with no assumed default region.
    ///
    /// The region must be inferable from the input itself (a leading
    /// `+countrycode`); anything else is ambiguous and fails as a parse
    /// error.
    fn parse(&self, raw: &str) -> Result<(String, phonenumber::PhoneNumber)> {
        let cleaned = sanitize(raw);
        if cleaned.is_empty() {
            return Err(Error::parse(format!(
                "Input {:?} contains no dialable characters",
                raw
            )));
        }

        let parsed = phonenumber::parse(None, &cleaned)
            .map_err(|e| Error::parse(format!("Invalid phone number {:?}: {}", raw, e)))?;

        Ok((cleaned, parsed))
    }

    fn validation(cleaned: &str, parsed: &phonenumber::PhoneNumber) -> PhoneValidation {
        PhoneValidation {
            // Validity and possibility are independent answers: a number
            // can look dialable yet be unassigned in its plan, and both
            // flags are always reported.
            valid: phonenumber::is_valid(parsed),
            possible: phonenumber::is_viable(cleaned),
            e164: parsed.format().mode(Mode::E164).to_string(),
            international: parsed.format().mode(Mode::International).to_string(),
            national: parsed.format().mode(Mode::National).to_string(),
        }
    }
}

impl PhoneLookup for PhoneDirectory {
    fn lookup(&self, raw: &str) -> Result<PhoneRecord> {
        let (cleaned, parsed) = self.parse(raw)?;
        let validation = Self::validation(&cleaned, &parsed);

        if !validation.valid {
            tracing::warn!("Number {} parses but is not valid for its plan", validation.e164);
        }

        let country_code = parsed.country().value();
        let national_number = parsed.national().value();

        let (location, timezones) = match region_info(country_code) {
            Some(info) => (info.name.to_string(), info.timezones.join(", ")),
            None => (UNKNOWN.to_string(), UNKNOWN.to_string()),
        };

        Ok(PhoneRecord {
            input: raw.to_string(),
            e164: validation.e164,
            international: validation.international,
            national: validation.national,
            valid: validation.valid,
            possible: validation.possible,
            country_code,
            national_number,
            location,
            // The port carries no carrier dataset; see module docs.
            carrier: UNKNOWN.to_string(),
            line_type: classify_line_type(country_code, &national_number.to_string()),
            timezones,
            captured_at: Utc::now(),
        })
    }

    fn validate(&self, raw: &str) -> Result<PhoneValidation> {
        let (cleaned, parsed) = self.parse(raw)?;
        Ok(Self::validation(&cleaned, &parsed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digits(s: &str) -> String {
        s.chars().filter(|c| c.is_ascii_digit()).collect()
    }

    #[test]
    fn sanitize_keeps_digits_and_leading_plus() {
        assert_eq!(sanitize("+1 (415) 555-2671"), "+14155552671");
        assert_eq!(sanitize("0049 30 1234"), "0049301234");
        assert_eq!(sanitize("call +44 now"), "+44");
        assert_eq!(sanitize("no number here"), "");
    }

    #[test]
    fn lookup_of_garbage_is_a_parse_error() {
        let directory = PhoneDirectory::new();
        let err = directory.lookup("definitely not a number").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn canonical_forms_agree_on_the_underlying_digits() {
        let directory = PhoneDirectory::new();
        let record = directory.lookup("+1 415-555-2671").unwrap();

        assert_eq!(record.e164, "+14155552671");
        // International keeps the calling code, national drops it; all
        // three describe the same digit string.
        assert_eq!(digits(&record.international), "14155552671");
        assert_eq!(digits(&record.national), "4155552671");
        assert_eq!(record.country_code, 1);
        assert_eq!(record.national_number, 4155552671);
    }

    #[test]
    fn invalid_but_parseable_number_still_yields_a_record() {
        let directory = PhoneDirectory::new();
        // NANP area codes cannot start with 1; the number still parses.
        let record = directory.lookup("+1 123 456 7890").unwrap();

        assert!(!record.valid);
        assert!(record.possible);
        assert_eq!(record.country_code, 1);
    }

    #[test]
    fn descriptive_fields_come_from_the_region_table() {
        let directory = PhoneDirectory::new();
        let record = directory.lookup("+63 917 123 4567").unwrap();

        assert_eq!(record.location, "Philippines");
        assert_eq!(record.timezones, "Asia/Manila");
        assert_eq!(record.line_type, LineType::Mobile);
        assert_eq!(record.carrier, "Unknown");
    }

    #[test]
    fn validate_skips_descriptive_fields_but_formats() {
        let directory = PhoneDirectory::new();
        let validation = directory.validate("+639171234567").unwrap();

        assert!(validation.valid);
        assert!(validation.possible);
        assert_eq!(validation.e164, "+639171234567");
    }

    #[test]
    fn line_type_classifier_covers_prefix_determined_plans() {
        assert_eq!(classify_line_type(1, "8005551234"), LineType::TollFree);
        assert_eq!(classify_line_type(1, "9005551234"), LineType::PremiumRate);
        assert_eq!(classify_line_type(1, "4155552671"), LineType::FixedLineOrMobile);
        assert_eq!(classify_line_type(44, "7911123456"), LineType::Mobile);
        assert_eq!(classify_line_type(44, "7012345678"), LineType::Personal);
        assert_eq!(classify_line_type(63, "9171234567"), LineType::Mobile);
        assert_eq!(classify_line_type(63, "27123456"), LineType::FixedLine);
        assert_eq!(classify_line_type(49, "15112345678"), LineType::Mobile);
        assert_eq!(classify_line_type(995, "123"), LineType::Unknown);
    }
}
