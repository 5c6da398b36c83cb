/// Entity identifiers are opaque uuid strings on the wire. Anything that does
/// not parse is rejected as a 400 before the store is touched; it is never a
/// lookup miss.
pub fn is_valid(id: &str) -> bool {
    uuid::Uuid::parse_str(id).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_uuids_and_rejects_everything_else() {
        assert!(is_valid("6f6ff0f0-9618-4f3f-bb5a-9e4bba2862ac"));
        assert!(!is_valid("not-an-id"));
        assert!(!is_valid(""));
        assert!(!is_valid("6f6ff0f0-9618-4f3f-bb5a"));
    }
}
