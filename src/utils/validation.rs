//! Local form validation rules.

use std::sync::LazyLock;

use regex::Regex;

/// Minimum length of any password the client will submit
pub const MIN_PASSWORD_LEN: usize = 8;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

/// Loose e-mail shape check: something@something.tld without whitespace
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

pub fn is_valid_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LEN
}
