//! UUID utilities

use uuid::Uuid;

/// Generate a new UUIDv4
pub fn generate() -> Uuid {
    Uuid::new_v4()
}

/// Generate a record id of the form `<prefix>-<uuid v4>`
pub fn prefixed(prefix: &str) -> String {
    format!("{}-{}", prefix, generate())
}

/// New suite id (`suite-...`)
pub fn suite_id() -> String {
    prefixed("suite")
}

/// New test id (`test-...`)
pub fn test_id() -> String {
    prefixed("test")
}
