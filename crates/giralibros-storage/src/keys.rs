//! Storage key scheme.
//!
//! Keys derive from freshly generated UUIDs, never from an uploaded filename,
//! so no client-controlled path or extension ever reaches the filesystem.
//! Staged covers live under `pending/`, attached covers under `covers/`.

use uuid::Uuid;

/// Key for a cover staged before its book exists. The UUID is the broker handle.
pub fn pending_cover_key(handle: Uuid) -> String {
    format!("pending/{}.jpg", handle)
}

/// Key for a cover attached to a book. A new UUID per attach, so replacing a
/// cover never overwrites the object a stale URL may still point at.
pub fn book_cover_key(cover_id: Uuid) -> String {
    format!("covers/{}.jpg", cover_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_namespaced_and_jpeg() {
        let id = Uuid::new_v4();
        let pending = pending_cover_key(id);
        let cover = book_cover_key(id);
        assert!(pending.starts_with("pending/") && pending.ends_with(".jpg"));
        assert!(cover.starts_with("covers/") && cover.ends_with(".jpg"));
        assert!(pending.contains(&id.to_string()));
    }
}
