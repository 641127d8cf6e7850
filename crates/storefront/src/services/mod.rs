//! Business logic services for storefront.
//!
//! # Services
//!
//! - `orders` - Order validation, pricing and placement
//! - `reviews` - Review submission
//! - `contact` - Contact form queueing
//! - `support` - Support assistant conversations
//!
//! Services validate input before touching the database and return
//! [`AppError`] so handlers stay thin.

pub mod contact;
pub mod orders;
pub mod reviews;
pub mod support;

use crate::error::AppError;

/// Trim a required text field, rejecting missing or blank values.
fn required(field: &str, value: Option<String>) -> Result<String, AppError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Validation(format!("{field} is required")))
}

/// Reject text longer than `max` characters.
fn within_limit(field: &str, value: &str, max: usize) -> Result<(), AppError> {
    if value.chars().count() > max {
        return Err(AppError::Validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_trims_and_rejects_blank() {
        assert_eq!(
            required("name", Some("  Ada ".to_string())).ok().as_deref(),
            Some("Ada")
        );
        let err = required("name", Some("   ".to_string())).err();
        assert_eq!(err.map(|e| e.to_string()).as_deref(), Some("name is required"));
        assert!(required("name", None).is_err());
    }

    #[test]
    fn test_within_limit_counts_chars() {
        assert!(within_limit("comment", "héllo", 5).is_ok());
        assert!(within_limit("comment", "héllo!", 5).is_err());
    }
}
