pub fn validate_pagination(page: Option<u64>, limit: Option<u64>) -> (u64, u64) {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(20).clamp(1, 100);
    (page, limit)
}

/// PINs are short numeric secrets typed on a keypad.
pub fn is_valid_pin(pin: &str) -> bool {
    (4..=8).contains(&pin.len()) && pin.chars().all(|c| c.is_ascii_digit())
}

/// Document ids end up inside `P|<doc>|<ts>` badge payloads, so the
/// separator is not allowed.
pub fn is_valid_document_id(document_id: &str) -> bool {
    !document_id.trim().is_empty() && !document_id.contains('|')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_is_clamped() {
        assert_eq!(validate_pagination(None, None), (1, 20));
        assert_eq!(validate_pagination(Some(0), Some(500)), (1, 100));
        assert_eq!(validate_pagination(Some(3), Some(0)), (3, 1));
    }

    #[test]
    fn pin_format() {
        assert!(is_valid_pin("1234"));
        assert!(is_valid_pin("12345678"));
        assert!(!is_valid_pin("123"));
        assert!(!is_valid_pin("123456789"));
        assert!(!is_valid_pin("12a4"));
    }

    #[test]
    fn document_id_format() {
        assert!(is_valid_document_id("DNI-4455"));
        assert!(!is_valid_document_id("   "));
        assert!(!is_valid_document_id("A|B"));
    }
}
