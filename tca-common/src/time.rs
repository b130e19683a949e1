//! Timestamp utilities

use chrono::{DateTime, Duration, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Current time as milliseconds since the Unix epoch
///
/// Used for the `TEST_<millis>` / `VIDEO_<millis>` mnemonic ids.
pub fn unix_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Timestamp for a record touched after `previous`
///
/// Returns the current time, bumped by one microsecond past `previous`
/// when the clock has not advanced, so `updated_at` is strictly increasing.
pub fn touched_after(previous: DateTime<Utc>) -> DateTime<Utc> {
    let current = now();
    if current > previous {
        current
    } else {
        previous + Duration::microseconds(1)
    }
}
