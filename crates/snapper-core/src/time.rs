//! Clock helpers.
//!
//! State entries store epoch milliseconds on disk, so the whole runtime
//! talks in `i64` milliseconds rather than `SystemTime`.

use chrono::Utc;

/// Current wall-clock time as epoch milliseconds.
#[must_use]
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
