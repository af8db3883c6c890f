use crate::utils::error::{Result, SubmitError};
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// The valid-email-address grammar email inputs check against.
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("email pattern compiles")
});

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Email format check. An empty value passes, like an optional email input;
/// callers that need a value check emptiness first.
pub fn is_valid_email_format(value: &str) -> bool {
    value.is_empty() || EMAIL_PATTERN.is_match(value)
}

pub fn is_valid_email(value: &str) -> bool {
    !value.is_empty() && is_valid_email_format(value)
}

/// Presence check for select-like fields. Whitespace counts as a value.
pub fn is_present(value: &str) -> bool {
    !value.is_empty()
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(SubmitError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(SubmitError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(SubmitError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_http_method(field_name: &str, method: &str) -> Result<()> {
    if reqwest::Method::from_bytes(method.as_bytes()).is_err() {
        return Err(SubmitError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: method.to_string(),
            reason: "Not a valid HTTP method token".to_string(),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(SubmitError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(SubmitError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}
