//! Departure time window comparison

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use tracing::debug;

/// Maximum gap between two departure times that still counts as "together"
pub const START_TOLERANCE_MINUTES: i64 = 30;

const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];

/// Parse a client-supplied timestamp.
///
/// Accepts RFC 3339 and offset-less ISO forms; the latter are read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

/// Decide whether two `[start, end)` windows are close enough to share a ride.
///
/// True when the start times are within [`START_TOLERANCE_MINUTES`] of each
/// other, or when the windows overlap. Unparseable input fails open.
pub fn time_windows_overlap(start1: &str, end1: &str, start2: &str, end2: &str) -> bool {
    let parsed = (
        parse_timestamp(start1),
        parse_timestamp(end1),
        parse_timestamp(start2),
        parse_timestamp(end2),
    );

    let (Some(start1), Some(end1), Some(start2), Some(end2)) = parsed else {
        debug!("Unparseable time window, treating as overlapping");
        return true;
    };

    let starts_close = (start1 - start2).abs() <= Duration::minutes(START_TOLERANCE_MINUTES);
    let windows_overlap = !(end1 < start2 || end2 < start1);

    starts_close || windows_overlap
}
