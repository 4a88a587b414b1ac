//! Email address validation
//!
//! Syntactic sanity check only: `<local>@<domain>.<tld>` where the local and
//! domain parts contain no `@`. No DNS or deliverability checks.

use regex::Regex;
use std::sync::LazyLock;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@]+@[^@]+\.[^@]+$").expect("email pattern is a valid regex")
});

/// Returns true when `email` has the shape `a@b.c`.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_addresses() {
        for email in [
            "a@b.c",
            "a@b.com",
            "shift.engineer@plant.example.co.uk",
            "first+tag@sub.domain.org",
        ] {
            assert!(is_valid_email(email), "{} should be accepted", email);
        }
    }

    #[test]
    fn rejects_missing_at_sign() {
        for email in ["", "not-an-email", "plant.example.com"] {
            assert!(!is_valid_email(email), "{} should be rejected", email);
        }
    }

    #[test]
    fn rejects_missing_dot_after_at() {
        for email in ["user@localhost", "a@b", "a.b@c"] {
            assert!(!is_valid_email(email), "{} should be rejected", email);
        }
    }

    #[test]
    fn rejects_empty_parts_and_double_at() {
        for email in ["@b.com", "a@.com", "a@b.", "a@b@c.com", "a@b.c@d"] {
            assert!(!is_valid_email(email), "{} should be rejected", email);
        }
    }
}
