//! Input validation for account requests
//!
//! All checks here are pure; the email uniqueness check needs the store and
//! is done by the caller on top of [`validate_signup`].

use amity_core::{normalize_email, FieldErrors};

use crate::messages::{text, LoginRequest, SignupRequest};

/// Minimum accepted password length
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Passwords rejected outright
const COMMON_PASSWORDS: &[&str] = &[
    "password", "password1", "password123", "12345678", "123456789", "1234567890",
    "qwerty123", "qwertyuiop", "iloveyou", "sunshine", "princess", "football",
    "baseball", "welcome1", "letmein1", "abc12345", "trustno1", "superman",
    "starwars", "whatever", "passw0rd", "11111111", "00000000", "access14",
];

/// Check a signup request, collecting every problem
pub fn validate_signup(req: &SignupRequest) -> FieldErrors {
    let mut errors = FieldErrors::new();

    let email = normalize_email(&req.email);
    if email.is_empty() {
        errors.add("email", text::FIELD_REQUIRED);
    } else if !is_valid_email(&email) {
        errors.add("email", text::INVALID_EMAIL);
    }

    if req.password.is_empty() {
        errors.add("password", text::FIELD_REQUIRED);
    } else if req.password != req.confirm_password {
        errors.add("password", text::PASSWORD_MISMATCH);
    } else {
        for problem in password_problems(&req.password, &email) {
            errors.add("password", problem);
        }
    }

    if req.confirm_password.is_empty() {
        errors.add("confirm_password", text::FIELD_REQUIRED);
    }

    errors
}

/// Check that a login request carries both fields
pub fn validate_login(req: &LoginRequest) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if req.email.trim().is_empty() {
        errors.add("email", text::FIELD_REQUIRED);
    } else if !is_valid_email(&normalize_email(&req.email)) {
        errors.add("email", text::INVALID_EMAIL);
    }
    if req.password.is_empty() {
        errors.add("password", text::FIELD_REQUIRED);
    }
    errors
}

/// Structural email check: `local@domain.tld`, no whitespace
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2
        && labels.iter().all(|label| {
            !label.is_empty()
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}

/// Strength problems with a password, empty when it is acceptable
pub fn password_problems(password: &str, email: &str) -> Vec<String> {
    let mut problems = Vec::new();

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        problems.push(format!(
            "This password is too short. It must contain at least {} characters.",
            MIN_PASSWORD_LENGTH
        ));
    }

    let lowered = password.to_lowercase();
    if COMMON_PASSWORDS.contains(&lowered.as_str()) {
        problems.push("This password is too common.".to_string());
    }

    if !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
        problems.push("This password is entirely numeric.".to_string());
    }

    if is_too_similar(&lowered, email) {
        problems.push("The password is too similar to the email address.".to_string());
    }

    problems
}

fn is_too_similar(password: &str, email: &str) -> bool {
    let local = email.split('@').next().unwrap_or_default();
    if local.len() < 3 {
        return false;
    }
    password == email || password.contains(local) || local.contains(password)
}
