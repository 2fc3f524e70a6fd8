//! Prefixed ID generation.
//!
//! Request IDs use a `req_` prefix followed by a UUIDv7 (time-ordered), so
//! they sort by creation time and are recognizable at a glance in logs.

use uuid::Uuid;

fn prefixed_id(prefix: &str) -> String {
    let id = Uuid::now_v7();
    format!("{}_{}", prefix, id.as_simple())
}

/// Generate a request ID: `req_<uuid7>`
pub fn request_id() -> String {
    prefixed_id("req")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_ids_have_prefix() {
        assert!(request_id().starts_with("req_"));
    }

    #[test]
    fn request_ids_are_unique() {
        assert_ne!(request_id(), request_id());
    }
}
