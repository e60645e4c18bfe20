//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;

/// Languages the platform ships translations for
pub const SUPPORTED_LANGUAGES: [&str; 2] = ["en", "ar"];

/// Validate username
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("Username is required".to_string());
    }

    let length = username.chars().count();
    if length < 3 {
        return Err("Username must be at least 3 characters long".to_string());
    }

    if length > 50 {
        return Err("Username must be at most 50 characters long".to_string());
    }

    static USERNAME_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = USERNAME_REGEX
        .get_or_init(|| Regex::new(r"^[a-zA-Z0-9_]+$").expect("Failed to compile username regex"));

    if !regex.is_match(username) {
        return Err("Username can only contain letters, numbers, and underscores".to_string());
    }

    Ok(())
}

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email must be at most 254 characters long".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate password
///
/// Children pick these, so only the length is enforced.
pub fn validate_password(password: &str) -> Result<(), String> {
    let length = password.chars().count();
    if length < 4 {
        return Err("Password must be at least 4 characters long".to_string());
    }

    if length > 100 {
        return Err("Password must be at most 100 characters long".to_string());
    }

    Ok(())
}

/// Validate display name
pub fn validate_display_name(display_name: &str) -> Result<(), String> {
    let length = display_name.trim().chars().count();
    if length == 0 {
        return Err("Display name is required".to_string());
    }

    if length > 100 {
        return Err("Display name must be at most 100 characters long".to_string());
    }

    Ok(())
}

/// Validate preferred language
pub fn validate_language(language: &str) -> Result<(), String> {
    if SUPPORTED_LANGUAGES.contains(&language) {
        Ok(())
    } else {
        Err(format!(
            "Preferred language must be one of: {}",
            SUPPORTED_LANGUAGES.join(", ")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usernames() {
        assert!(validate_username("scratch_kid").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username(&"a".repeat(51)).is_err());
    }

    #[test]
    fn emails() {
        assert!(validate_email("kid@example.com").is_ok());
        assert!(validate_email("kid@").is_err());
        assert!(validate_email("").is_err());
    }

    #[test]
    fn passwords_only_check_length() {
        assert!(validate_password("meow").is_ok());
        assert!(validate_password("abc").is_err());
        assert!(validate_password(&"x".repeat(101)).is_err());
    }

    #[test]
    fn display_names_and_languages() {
        assert!(validate_display_name("Alex").is_ok());
        assert!(validate_display_name("   ").is_err());
        assert!(validate_language("ar").is_ok());
        assert!(validate_language("fr").is_err());
    }
}
