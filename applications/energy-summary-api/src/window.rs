//! Local-time window boundaries and the pagination cursors derived from them.
//!
//! Tibber pages time series with an `after` cursor that is the base64 encoding
//! of an ISO-8601 timestamp. The timestamp has to carry the offset of the zone
//! the boundary was computed in, otherwise the remote shifts the window.

use crate::error::{AppError, Result};
use crate::models::Resolution;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{
    DateTime, Datelike, Duration, FixedOffset, LocalResult, NaiveDate, NaiveTime, Offset,
    TimeZone, Utc,
};

/// Start of the window the resolution is queried over, or `None` when the
/// query selects the most recent nodes without a cursor.
pub fn boundary<Tz: TimeZone>(resolution: Resolution, now: &DateTime<Tz>) -> Option<DateTime<Tz>> {
    let today = now.date_naive();
    let anchor = match resolution {
        Resolution::Annual => return None,
        Resolution::Monthly => today - Duration::days(i64::from(today.ordinal0())),
        Resolution::Daily => today - Duration::days(i64::from(today.day0())),
        Resolution::Hourly => today,
    };

    Some(local_midnight(&now.timezone(), anchor))
}

/// First instant of `date` in `tz`. Ambiguous midnights resolve to the earlier
/// instant; a midnight swallowed by a DST gap moves forward to the first valid
/// quarter hour.
fn local_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Tz> {
    let midnight = date.and_time(NaiveTime::default());

    for step in 0..=16 {
        let candidate = midnight + Duration::minutes(15 * step);
        match tz.from_local_datetime(&candidate) {
            LocalResult::Single(dt) => return dt,
            LocalResult::Ambiguous(earliest, _) => return earliest,
            LocalResult::None => continue,
        }
    }

    tz.from_utc_datetime(&midnight)
}

/// Offset in the platform convention: minutes the zone is behind UTC.
/// UTC+2 yields -120, UTC-5 yields 300.
pub fn minutes_behind_utc<Tz: TimeZone>(dt: &DateTime<Tz>) -> i32 {
    -dt.offset().fix().local_minus_utc() / 60
}

/// Render `instant` as local wall-clock time with millisecond precision and an
/// offset suffix, given the zone offset as minutes behind UTC.
///
/// A positive `minutes_behind` is written with a `-` sign and a negative one
/// with `+`. The remote cursor parser relies on exactly this rendering.
pub fn format_with_offset(instant: DateTime<Utc>, minutes_behind: i32) -> String {
    let wall_clock = instant - Duration::minutes(i64::from(minutes_behind));
    let sign = if minutes_behind > 0 { '-' } else { '+' };
    let abs = minutes_behind.abs();

    format!(
        "{}{}{:02}:{:02}",
        wall_clock.format("%Y-%m-%dT%H:%M:%S%.3f"),
        sign,
        abs / 60,
        abs % 60
    )
}

/// ISO-8601 string of `dt` in its own zone
pub fn local_iso_string<Tz: TimeZone>(dt: &DateTime<Tz>) -> String {
    format_with_offset(dt.with_timezone(&Utc), minutes_behind_utc(dt))
}

pub fn encode_cursor(iso: &str) -> String {
    STANDARD.encode(iso)
}

pub fn decode_cursor(cursor: &str) -> Result<DateTime<FixedOffset>> {
    let bytes = STANDARD
        .decode(cursor)
        .map_err(|e| AppError::Cursor(format!("not base64: {}", e)))?;
    let iso = String::from_utf8(bytes)
        .map_err(|e| AppError::Cursor(format!("not UTF-8: {}", e)))?;

    DateTime::parse_from_rfc3339(&iso)
        .map_err(|e| AppError::Cursor(format!("not a timestamp '{}': {}", iso, e)))
}

/// Pagination cursor for the resolution's window, if it uses one
pub fn cursor_for<Tz: TimeZone>(resolution: Resolution, now: &DateTime<Tz>) -> Option<String> {
    boundary(resolution, now).map(|start| encode_cursor(&local_iso_string(&start)))
}
