//! Custom field validators used by request DTOs.

use lazy_static::lazy_static;
use regex::Regex;
use uuid::Uuid;
use validator::ValidationError;

lazy_static! {
    static ref PHONE_RE: Regex = Regex::new(r"^\+?[0-9(][0-9 ()\-#]{5,24}$").unwrap();
    static ref IDENTIFIER_RE: Regex = Regex::new(r"^[A-Za-z][A-Za-z0-9_.\-]{0,63}$").unwrap();
}

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Rejects strings that are empty after trimming.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(error("blank", "Must not be blank"))
    } else {
        Ok(())
    }
}

/// Accepts absolute http(s) URLs and site-relative paths (`/uploads/a.jpg`).
pub fn validate_media_url(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    let ok = if let Some(rest) = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"))
    {
        !rest.is_empty() && !rest.starts_with('/') && !rest.contains(char::is_whitespace)
    } else {
        value.starts_with('/') && !value.starts_with("//") && !value.contains(char::is_whitespace)
    };

    if ok {
        Ok(())
    } else {
        Err(error(
            "media_url",
            "Must be an http(s) URL or a path starting with /",
        ))
    }
}

/// Like [`validate_media_url`] but an empty string means "no link".
pub fn validate_link_url(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Ok(())
    } else {
        validate_media_url(value)
    }
}

/// Phone numbers: digits with optional leading `+`, spaces, dashes, parentheses.
pub fn validate_phone(value: &str) -> Result<(), ValidationError> {
    if PHONE_RE.is_match(value.trim()) {
        Ok(())
    } else {
        Err(error("phone", "Invalid phone number"))
    }
}

/// A CAPTCHA answer is exactly four ASCII digits.
pub fn validate_captcha_answer(value: &str) -> Result<(), ValidationError> {
    if value.len() == 4 && value.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(error("captcha", "Verification code must be 4 digits"))
    }
}

/// Accepts a hyphenated UUID string.
pub fn validate_uuid(value: &str) -> Result<(), ValidationError> {
    Uuid::parse_str(value)
        .map(|_| ())
        .map_err(|_| error("uuid", "Must be a valid identifier"))
}

/// Settings `type`/`key` names: a letter followed by letters, digits, `_ . -`.
pub fn validate_identifier(value: &str) -> Result<(), ValidationError> {
    if IDENTIFIER_RE.is_match(value) {
        Ok(())
    } else {
        Err(error(
            "identifier",
            "Must start with a letter and contain only letters, digits, _ . -",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_blank() {
        assert!(validate_not_blank("x").is_ok());
        assert!(validate_not_blank("   ").is_err());
        assert!(validate_not_blank("").is_err());
    }

    #[test]
    fn test_media_url() {
        assert!(validate_media_url("https://x/y.jpg").is_ok());
        assert!(validate_media_url("http://cdn.example.com/a.png").is_ok());
        assert!(validate_media_url("/images/project1.jpg").is_ok());
        assert!(validate_media_url("").is_err());
        assert!(validate_media_url("ftp://x/y").is_err());
        assert!(validate_media_url("https://").is_err());
        assert!(validate_media_url("//evil.example.com/a.png").is_err());
        assert!(validate_media_url("/a b.png").is_err());
    }

    #[test]
    fn test_link_url_allows_empty() {
        assert!(validate_link_url("").is_ok());
        assert!(validate_link_url("  ").is_ok());
        assert!(validate_link_url("/contact").is_ok());
        assert!(validate_link_url("javascript:alert(1)").is_err());
    }

    #[test]
    fn test_phone() {
        assert!(validate_phone("0912-345-678").is_ok());
        assert!(validate_phone("+886 2 2345 6789").is_ok());
        assert!(validate_phone("(02) 2345-6789").is_ok());
        assert!(validate_phone("+(886) 912 345 678").is_ok());
        assert!(validate_phone("call me").is_err());
        assert!(validate_phone("123").is_err());
        assert!(validate_phone(")02 2345").is_err());
    }

    #[test]
    fn test_captcha_answer() {
        assert!(validate_captcha_answer("0427").is_ok());
        assert!(validate_captcha_answer("123").is_err());
        assert!(validate_captcha_answer("12345").is_err());
        assert!(validate_captcha_answer("12a4").is_err());
    }

    #[test]
    fn test_uuid() {
        assert!(validate_uuid(&Uuid::new_v4().to_string()).is_ok());
        assert!(validate_uuid("not-a-uuid").is_err());
    }

    #[test]
    fn test_identifier() {
        assert!(validate_identifier("seo").is_ok());
        assert!(validate_identifier("notificationTemplate").is_ok());
        assert!(validate_identifier("og.title-2").is_ok());
        assert!(validate_identifier("1seo").is_err());
        assert!(validate_identifier("has space").is_err());
        assert!(validate_identifier("").is_err());
    }

    #[test]
    fn test_error_carries_message() {
        let err = validate_phone("x").unwrap_err();
        assert_eq!(err.code, "phone");
        assert_eq!(err.message.as_deref(), Some("Invalid phone number"));
    }
}
