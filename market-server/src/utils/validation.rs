//! Input validation helpers
//!
//! Centralized text length constants and validation functions. The
//! document store enforces no length limits of its own, so every
//! client-supplied string passes through here.

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: product names, user names, refund methods
pub const MAX_NAME_LEN: usize = 200;

/// Notes, reasons, descriptions (cancellation note, refund reason)
pub const MAX_NOTE_LEN: usize = 500;

/// Short identifiers: phone numbers, postal codes, colors, sizes
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Address lines
pub const MAX_ADDRESS_LEN: usize = 500;

/// Free-form product descriptions
pub const MAX_DESCRIPTION_LEN: usize = 2000;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_required_text_is_rejected() {
        assert!(validate_required_text("  ", "city", MAX_NAME_LEN).is_err());
        assert!(validate_required_text("", "city", MAX_NAME_LEN).is_err());
        assert!(validate_required_text("Lisbon", "city", MAX_NAME_LEN).is_ok());
    }

    #[test]
    fn overlong_text_is_rejected() {
        let long = "x".repeat(MAX_NAME_LEN + 1);
        assert!(validate_required_text(&long, "name", MAX_NAME_LEN).is_err());
        assert!(validate_optional_text(&Some(long), "note", MAX_NAME_LEN).is_err());
        assert!(validate_optional_text(&None, "note", MAX_NAME_LEN).is_ok());
    }
}
