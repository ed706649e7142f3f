#[cfg(unix)]
pub fn is_elevated() -> bool {
    // On Unix, check if running as root
    unsafe { libc::geteuid() == 0 }
}

#[cfg(not(unix))]
pub fn is_elevated() -> bool {
    false
}

/// Operator guidance appended to provider failures.
pub fn privilege_hint() -> &'static str {
    if is_elevated() {
        "Check that the CPU sensor drivers (coretemp, k10temp, intel_rapl) are loaded."
    } else {
        "Some sensors need elevated privileges. Re-run with sudo and make sure the CPU \
         sensor drivers (coretemp, k10temp, intel_rapl) are loaded."
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hint_mentions_drivers() {
        assert!(privilege_hint().contains("drivers"));
    }
}
