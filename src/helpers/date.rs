//! Date helper functions

use anyhow::{anyhow, Result};
use chrono::{DateTime, FixedOffset, Locale, TimeZone};

/// Parse a BCP 47 style tag (`pt-BR`) into a chrono locale
pub fn parse_locale(tag: &str) -> Result<Locale> {
    let normalized = tag.replace('-', "_");
    Locale::try_from(normalized.as_str()).map_err(|_| anyhow!("unknown locale: {}", tag))
}

/// Parse a publication timestamp as returned by the content API.
///
/// Prismic emits offsets without a colon (`2021-03-25T19:25:28+0000`),
/// which RFC 3339 parsing rejects, so both shapes are accepted.
pub fn parse_publication_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z"))
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .ok()
}

/// Format a date using a date-fns compatible format string in a locale
///
/// # Examples
/// ```ignore
/// format_date(&date, "dd MMM yyyy", Locale::pt_BR) // -> "25 mar 2021"
/// ```
pub fn format_date<Tz: TimeZone>(date: &DateTime<Tz>, format: &str, locale: Locale) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let chrono_format = date_fns_to_chrono_format(format);
    date.format_localized(&chrono_format, locale).to_string()
}

/// Format a nullable publication timestamp in the site's timezone.
///
/// Returns `None` when the timestamp is absent or unparseable.
pub fn format_publication_date(
    raw: Option<&str>,
    format: &str,
    tz: chrono_tz::Tz,
    locale: Locale,
) -> Option<String> {
    let parsed = parse_publication_date(raw?)?;
    Some(format_date(&parsed.with_timezone(&tz), format, locale))
}

/// Format a date in ISO 8601 / XML format
pub fn date_xml<Tz: TimeZone>(date: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    date.format("%Y-%m-%dT%H:%M:%S%:z").to_string()
}

/// Convert date-fns format tokens to chrono format
fn date_fns_to_chrono_format(format: &str) -> String {
    // Longest tokens first within each field
    let replacements = [
        // Year
        ("yyyy", "%Y"),
        ("yy", "%y"),
        // Month
        ("MMMM", "%B"), // Full month name
        ("MMM", "%b"),  // Abbreviated month name
        ("MM", "%m"),   // Two-digit month
        // Day of month
        ("dd", "%d"),
        // Day of week
        ("EEEE", "%A"),
        ("EEE", "%a"),
        // Time
        ("HH", "%H"),
        ("hh", "%I"),
        ("mm", "%M"),
        ("ss", "%S"),
    ];

    let mut result = format.to_string();

    for (from, to) in replacements {
        result = result.replace(from, to);
    }

    result
}
