//! Core index recovery from free-text sensor labels.

use once_cell::sync::Lazy;
use regex::Regex;

static CORE_ID_PATTERN: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"#?(\d+)").ok());

/// Extract the core index from a label such as `"Core #2"` or `"CPU Core #1"`.
///
/// The first run of digits wins. A label without digits has no core id.
pub fn resolve_core_id(label: &str) -> Option<usize> {
    CORE_ID_PATTERN
        .as_ref()?
        .captures(label)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_prefixed_id() {
        assert_eq!(resolve_core_id("Core #2"), Some(2));
        assert_eq!(resolve_core_id("CPU Core #11"), Some(11));
    }

    #[test]
    fn test_bare_digits() {
        assert_eq!(resolve_core_id("Core 7"), Some(7));
    }

    #[test]
    fn test_first_run_wins() {
        assert_eq!(resolve_core_id("CCD1 Core #3"), Some(1));
    }

    #[test]
    fn test_no_digits_is_none_not_zero() {
        assert_eq!(resolve_core_id("CPU Package"), None);
        assert_eq!(resolve_core_id(""), None);
    }

    #[test]
    fn test_overflowing_digits_are_dropped() {
        assert_eq!(resolve_core_id("Core #99999999999999999999999"), None);
    }
}
