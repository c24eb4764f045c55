use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// A request failed field validation. Surfaces as a 400 response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

pub type ValidationResult = Result<(), ValidationError>;

/// Required, non-blank text no longer than `max_len` characters
pub fn validate_text(field: &str, value: &str, max_len: usize) -> ValidationResult {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "This field may not be blank"));
    }
    validate_max_len(field, value, max_len)
}

pub fn validate_max_len(field: &str, value: &str, max_len: usize) -> ValidationResult {
    if value.chars().count() > max_len {
        return Err(ValidationError::new(
            field,
            format!("Ensure this field has no more than {} characters", max_len),
        ));
    }
    Ok(())
}

pub fn validate_email(field: &str, email: &str) -> ValidationResult {
    if email.is_empty() {
        return Err(ValidationError::new(field, "Email cannot be empty"));
    }

    if email.len() > 254 || !email_regex().is_match(email) {
        return Err(ValidationError::new(field, "Enter a valid email address"));
    }

    Ok(())
}

pub fn validate_url(field: &str, url: &str) -> ValidationResult {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));

    match rest {
        Some(host) if !host.is_empty() && !host.contains(char::is_whitespace) => Ok(()),
        _ => Err(ValidationError::new(field, "Enter a valid URL")),
    }
}

pub fn validate_range<T>(field: &str, value: T, min: Option<T>, max: Option<T>) -> ValidationResult
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    if let Some(min) = min {
        if value < min {
            return Err(ValidationError::new(
                field,
                format!("Ensure this value is greater than or equal to {}", min),
            ));
        }
    }
    if let Some(max) = max {
        if value > max {
            return Err(ValidationError::new(
                field,
                format!("Ensure this value is less than or equal to {}", max),
            ));
        }
    }
    Ok(())
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_validation() {
        assert!(validate_email("email", "laura.h@icesi.edu.co").is_ok());
        assert!(validate_email("email", "").is_err());
        assert!(validate_email("email", "invalid").is_err());
        assert!(validate_email("email", "user@").is_err());
        assert!(validate_email("email", "user@domain").is_err());
    }

    #[test]
    fn test_text_validation() {
        assert!(validate_text("name", "Colombia", 40).is_ok());
        assert!(validate_text("name", "   ", 40).is_err());

        let err = validate_text("name", &"x".repeat(41), 40).unwrap_err();
        assert_eq!(err.field, "name");
    }

    #[test]
    fn test_url_validation() {
        assert!(validate_url("video_url", "https://example.com/videos/burpees").is_ok());
        assert!(validate_url("video_url", "http://example.com").is_ok());
        assert!(validate_url("video_url", "ftp://example.com").is_err());
        assert!(validate_url("video_url", "https://").is_err());
    }

    #[test]
    fn test_range_validation() {
        assert!(validate_range("effort_level", 5, Some(1), Some(10)).is_ok());
        assert!(validate_range("effort_level", 0, Some(1), Some(10)).is_err());
        assert!(validate_range("effort_level", 11, Some(1), Some(10)).is_err());
        assert!(validate_range("duration", 0.0, Some(0.0), None).is_ok());
    }
}
