use chrono::{DateTime, TimeZone, Utc};
use libc::timeval;

/// Convert a capture header timestamp into UTC time
///
/// Out of range values fall back to the current time.
pub fn to_datetime(tv: &timeval) -> DateTime<Utc> {
    let secs = tv.tv_sec as i64;
    let nanos = (tv.tv_usec as i64).clamp(0, 999_999) as u32 * 1000;
    Utc.timestamp_opt(secs, nanos).single().unwrap_or_else(Utc::now)
}
