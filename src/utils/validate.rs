use std::sync::OnceLock;

use regex::Regex;

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^\w+([.-]?\w+)*@\w+([.-]?\w+)*(\.\w{2,3})+$").expect("email regex is valid")
    })
}

fn script_tag_regex() -> &'static Regex {
    static SCRIPT: OnceLock<Regex> = OnceLock::new();
    SCRIPT.get_or_init(|| {
        Regex::new(r"(?is)<script\b.*?</script>").expect("script tag regex is valid")
    })
}

pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(&email.to_lowercase())
}

/// Strips embedded script tags and surrounding whitespace from user input.
pub fn sanitize(input: &str) -> String {
    script_tag_regex().replace_all(input, "").trim().to_string()
}

/// Checks a required text field, accumulating human-readable messages.
pub fn check_required(field: &str, value: &str, max_len: usize, errors: &mut Vec<String>) {
    if value.trim().is_empty() {
        errors.push(format!("{field} is required"));
    } else if value.trim().len() > max_len {
        errors.push(format!("{field} cannot exceed {max_len} characters"));
    }
}

/// Checks an optional text field against a length bound.
pub fn check_optional(field: &str, value: Option<&str>, max_len: usize, errors: &mut Vec<String>) {
    if let Some(value) = value {
        if value.trim().len() > max_len {
            errors.push(format!("{field} cannot exceed {max_len} characters"));
        }
    }
}

pub fn check_email(field: &str, value: &str, errors: &mut Vec<String>) {
    if value.trim().is_empty() {
        errors.push(format!("{field} is required"));
    } else if !is_valid_email(value.trim()) {
        errors.push("Please enter a valid email".to_string());
    }
}
