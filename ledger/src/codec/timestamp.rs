//! Timestamp <-> text conversion shared by stored attributes and filter
//! literals.
//!
//! Every timestamp is written in one canonical shape:
//!
//! ```text
//! 2026-03-14T09:26:53.589793238Z
//! ```
//!
//! UTC, four-digit year, nine fractional digits, literal `Z`. Fixed width and
//! a fixed offset make byte order equal to time order, which is what lets the
//! table compare purchase dates with a plain string `BETWEEN`. Mixed offsets
//! or trimmed fractions would break that: `...:00.5Z` sorts after
//! `...:00.25Z` as text but not in time.

use chrono::{DateTime, Datelike, Utc};

use super::error::TimestampError;

/// `strftime` pattern for the canonical text form.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.9fZ";

/// Render `timestamp` in the canonical sortable form.
pub fn to_text(timestamp: &DateTime<Utc>) -> Result<String, TimestampError> {
    let year = timestamp.year();
    if !(0..=9999).contains(&year) {
        return Err(TimestampError::OutOfRange(year));
    }
    Ok(timestamp.format(TIMESTAMP_FORMAT).to_string())
}

/// Earliest instant with a canonical text form.
pub const MIN_TEXT: &str = "0000-01-01T00:00:00.000000000Z";

/// Latest instant with a canonical text form.
pub const MAX_TEXT: &str = "9999-12-31T23:59:59.999999999Z";

/// Render a query bound, clamping it into the representable range.
///
/// Stored values never fall outside 0000-9999, so a bound below that range
/// compares like [`MIN_TEXT`] and one above it like [`MAX_TEXT`]. Unlike
/// [`to_text`] this cannot fail, which keeps open-ended ranges usable.
pub fn to_bound_text(timestamp: &DateTime<Utc>) -> String {
    match timestamp.year() {
        year if year < 0 => MIN_TEXT.to_string(),
        year if year > 9999 => MAX_TEXT.to_string(),
        _ => timestamp.format(TIMESTAMP_FORMAT).to_string(),
    }
}

/// Parse stored text back into a UTC timestamp.
///
/// Accepts any RFC 3339 offset so hand-written inputs work, but only text
/// produced by [`to_text`] is guaranteed to sort correctly.
pub fn from_text(text: &str) -> Result<DateTime<Utc>, TimestampError> {
    DateTime::parse_from_rfc3339(text)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|source| TimestampError::Parse {
            text: text.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset, TimeZone};

    #[test]
    fn canonical_form_is_fixed_width_utc() {
        let ts = Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap()
            + Duration::nanoseconds(589_793_238);
        assert_eq!(to_text(&ts).unwrap(), "2026-03-14T09:26:53.589793238Z");

        let whole = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(to_text(&whole).unwrap(), "2026-01-01T00:00:00.000000000Z");
    }

    #[test]
    fn round_trip_preserves_nanoseconds() {
        let ts = Utc.timestamp_opt(1_767_225_600, 123_456_789).unwrap();
        let text = to_text(&ts).unwrap();
        assert_eq!(from_text(&text).unwrap(), ts);
    }

    #[test]
    fn offsets_are_normalized_to_utc() {
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let local = plus_two.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap();
        let text = to_text(&local.with_timezone(&Utc)).unwrap();
        assert_eq!(text, "2026-06-01T10:00:00.000000000Z");

        let parsed = from_text("2026-06-01T12:00:00+02:00").unwrap();
        assert_eq!(to_text(&parsed).unwrap(), text);
    }

    #[test]
    fn lexical_order_matches_time_order() {
        let base = Utc.with_ymd_and_hms(1999, 12, 31, 23, 59, 59).unwrap();
        let mut times = vec![
            base,
            base + Duration::nanoseconds(1),
            base + Duration::milliseconds(250),
            base + Duration::milliseconds(500),
            base + Duration::seconds(1),
            base + Duration::days(9000),
            Utc.with_ymd_and_hms(12, 5, 5, 5, 5, 5).unwrap(),
            Utc.with_ymd_and_hms(9999, 12, 31, 23, 59, 59).unwrap(),
        ];
        let mut texts: Vec<String> = times.iter().map(|t| to_text(t).unwrap()).collect();

        times.sort();
        texts.sort();
        let resorted: Vec<_> = texts.iter().map(|t| from_text(t).unwrap()).collect();
        assert_eq!(resorted, times);
    }

    #[test]
    fn years_beyond_four_digits_are_rejected() {
        let far = Utc.with_ymd_and_hms(10_000, 1, 1, 0, 0, 0).unwrap();
        assert!(matches!(to_text(&far), Err(TimestampError::OutOfRange(10_000))));

        let before_zero = Utc.with_ymd_and_hms(-1, 1, 1, 0, 0, 0).unwrap();
        assert!(matches!(to_text(&before_zero), Err(TimestampError::OutOfRange(-1))));
    }

    #[test]
    fn bounds_clamp_to_the_sortable_range() {
        assert_eq!(to_bound_text(&DateTime::<Utc>::MIN_UTC), MIN_TEXT);
        assert_eq!(to_bound_text(&DateTime::<Utc>::MAX_UTC), MAX_TEXT);

        let inside = Utc.with_ymd_and_hms(2026, 6, 1, 10, 0, 0).unwrap();
        assert_eq!(to_bound_text(&inside), to_text(&inside).unwrap());

        let last = Utc.with_ymd_and_hms(9999, 12, 31, 23, 59, 59).unwrap()
            + Duration::nanoseconds(999_999_999);
        assert_eq!(to_text(&last).unwrap(), MAX_TEXT);
        let first = Utc.with_ymd_and_hms(0, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(to_text(&first).unwrap(), MIN_TEXT);
    }

    #[test]
    fn garbage_text_fails_to_parse() {
        let err = from_text("last tuesday").unwrap_err();
        assert!(matches!(err, TimestampError::Parse { .. }));
        assert!(err.to_string().contains("last tuesday"));
    }
}
