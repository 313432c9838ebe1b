//! Common test helpers

use chrono::{DateTime, NaiveDate, Utc};

/// Parse an RFC3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC)
///
/// Panics on malformed input; intended for test fixtures only.
pub fn ts(value: &str) -> DateTime<Utc> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return parsed.with_timezone(&Utc);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .unwrap_or_else(|e| panic!("invalid test timestamp '{value}': {e}"))
        .and_hms_opt(0, 0, 0)
        .unwrap_or_else(|| panic!("invalid test timestamp '{value}'"))
        .and_utc()
}

/// Set up logging for tests (call once per test binary)
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("debug")
        .try_init();
}
