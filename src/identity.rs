// Lottery Slots - Identity and timestamp factory
use chrono::Utc;
use uuid::Uuid;

/// Creation time in milliseconds since the Unix epoch
pub type UnixTimestampMillis = i64;

/// Issue a fresh universally-unique identifier
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Current wall-clock time
pub fn now() -> UnixTimestampMillis {
    Utc::now().timestamp_millis()
}
