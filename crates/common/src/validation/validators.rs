// Field Validators - Reusable validation components
use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_PATTERN: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$").ok());

/// Trait for field validators
pub trait FieldValidator<T: ?Sized> {
    /// Validate a field value
    fn validate(&self, value: &T) -> Result<(), String>;
}

/// String validator with length constraints
#[derive(Debug, Clone)]
pub struct StringValidator {
    min_length: Option<usize>,
    max_length: Option<usize>,
    not_empty: bool,
    trim: bool,
}

impl Default for StringValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl StringValidator {
    /// Create a new string validator
    pub fn new() -> Self {
        Self { min_length: None, max_length: None, not_empty: false, trim: true }
    }

    /// Require non-empty string
    pub fn not_empty(mut self) -> Self {
        self.not_empty = true;
        self
    }

    /// Set minimum length
    pub fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    /// Set maximum length
    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    /// Set whether to trim before validation
    pub fn trim(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }
}

impl FieldValidator<str> for StringValidator {
    fn validate(&self, value: &str) -> Result<(), String> {
        let val = if self.trim { value.trim() } else { value };
        let length = val.chars().count();

        if self.not_empty && val.is_empty() {
            return Err("This field may not be blank.".to_string());
        }

        if let Some(min) = self.min_length {
            if length < min {
                return Err(format!("Ensure this field has at least {} characters.", min));
            }
        }

        if let Some(max) = self.max_length {
            if length > max {
                return Err(format!("Ensure this field has no more than {} characters.", max));
            }
        }

        Ok(())
    }
}

/// Email address validator
#[derive(Debug, Clone, Default)]
pub struct EmailValidator;

impl EmailValidator {
    pub fn new() -> Self {
        Self
    }
}

impl FieldValidator<str> for EmailValidator {
    fn validate(&self, value: &str) -> Result<(), String> {
        let valid = EMAIL_PATTERN.as_ref().is_some_and(|pattern| pattern.is_match(value.trim()));
        if valid {
            Ok(())
        } else {
            Err("Enter a valid email address.".to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_validator_trims_before_checking() {
        let validator = StringValidator::new().not_empty().max_length(5);
        assert!(validator.validate("  abc  ").is_ok());
        assert!(validator.validate("   ").is_err());
        assert!(validator.validate("abcdef").is_err());
    }

    #[test]
    fn string_validator_counts_characters_not_bytes() {
        let validator = StringValidator::new().max_length(3);
        assert!(validator.validate("äöü").is_ok());
    }

    #[test]
    fn min_length_is_enforced() {
        let validator = StringValidator::new().min_length(8).trim(false);
        assert!(validator.validate("short").is_err());
        assert!(validator.validate("long enough").is_ok());
    }

    #[test]
    fn email_validator_accepts_common_addresses() {
        let validator = EmailValidator::new();
        assert!(validator.validate("alice@example.com").is_ok());
        assert!(validator.validate("a.b+c@mail.example.org").is_ok());
        assert!(validator.validate("alice@").is_err());
        assert!(validator.validate("alice.example.com").is_err());
        assert!(validator.validate("").is_err());
    }
}
