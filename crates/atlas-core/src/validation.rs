//! # Validation Module
//!
//! Guard-clause input validation for Atlas CRM.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Caller (API layer, importer)                                 │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Repository guard clauses (Rust)                              │
//! │  └── THIS MODULE: id/shape validation before any SQL runs              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  ├── UNIQUE constraints                                                │
//! │  └── Foreign key constraints                                           │
//! │                                                                         │
//! │  Defense in depth: Multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Business-rule validation (credit limits, approval workflows, ...) is NOT
//! here; this layer only guards the shape of what reaches the database.

use crate::error::ValidationError;
use crate::{MAX_LINE_QUANTITY, MAX_NAME_LEN, MAX_SEARCH_QUERY_LEN};
use chrono::{DateTime, Utc};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Identifier Validators
// =============================================================================

/// Validates an entity id.
///
/// ## Rules
/// - Must not be empty or whitespace
/// - Must parse as a UUID
///
/// Every repository runs this on the primary key before insert/update, and
/// on foreign-key arguments before filtered lookups.
///
/// ## Example
/// ```rust
/// use atlas_core::validation::validate_entity_id;
///
/// assert!(validate_entity_id("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_entity_id("").is_err());
/// assert!(validate_entity_id("not-a-uuid").is_err());
/// ```
pub fn validate_entity_id(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates that a required text field is present and non-blank.
pub fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a display name (company name, subject line, person name part).
///
/// ## Rules
/// - Must not be empty
/// - Must be at most [`MAX_NAME_LEN`] characters
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    validate_required(field, name)?;

    if name.trim().len() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates an email address.
///
/// ## Rules
/// - Must not be empty
/// - Must contain exactly one `@` with non-empty local and domain parts
/// - Must be at most 254 characters (SMTP limit)
///
/// Deliberately shallow; full RFC 5321 parsing belongs to the mail system,
/// not the CRM.
pub fn validate_email_address(address: &str) -> ValidationResult<()> {
    let address = address.trim();

    validate_required("email", address)?;

    if address.len() > 254 {
        return Err(ValidationError::TooLong {
            field: "email".to_string(),
            max: 254,
        });
    }

    let mut parts = address.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let domain = parts.next().unwrap_or("");
    if local.is_empty() || domain.is_empty() || domain.contains('@') || !domain.contains('.') {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "must look like local@domain.tld".to_string(),
        });
    }

    Ok(())
}

/// Validates a phone number.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 32 characters
/// - May contain digits, spaces, and `+ - ( )`
pub fn validate_phone_number(number: &str) -> ValidationResult<()> {
    let number = number.trim();

    validate_required("phone", number)?;

    if number.len() > 32 {
        return Err(ValidationError::TooLong {
            field: "phone".to_string(),
            max: 32,
        });
    }

    if !number
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '(' | ')' | ' '))
    {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must contain only digits, spaces, and + - ( )".to_string(),
        });
    }

    Ok(())
}

/// Validates a search query for LIKE-based lookups.
///
/// ## Rules
/// - Can be empty (callers treat that as "list all")
/// - Maximum [`MAX_SEARCH_QUERY_LEN`] characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.len() > MAX_SEARCH_QUERY_LEN {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: MAX_SEARCH_QUERY_LEN,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a monetary amount in cents.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free lines, written-off balances)
pub fn validate_amount_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed [`MAX_LINE_QUANTITY`]
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

// =============================================================================
// Date Validators
// =============================================================================

/// Validates a half-open date range used by the `get_*_between` filters.
///
/// ## Rules
/// - `from` must not be after `until`
pub fn validate_date_range(from: DateTime<Utc>, until: DateTime<Utc>) -> ValidationResult<()> {
    if from > until {
        return Err(ValidationError::InvalidFormat {
            field: "date range".to_string(),
            reason: "start must not be after end".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_validate_entity_id() {
        assert!(validate_entity_id("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_entity_id("").is_err());
        assert!(validate_entity_id("   ").is_err());
        assert!(validate_entity_id("not-a-uuid").is_err());
        assert!(validate_entity_id("123").is_err());
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("name", "Initech Ltd").is_ok());
        assert!(validate_name("name", "").is_err());
        assert!(validate_name("name", &"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_email_address() {
        assert!(validate_email_address("ada@example.com").is_ok());
        assert!(validate_email_address("").is_err());
        assert!(validate_email_address("no-at-sign").is_err());
        assert!(validate_email_address("@example.com").is_err());
        assert!(validate_email_address("ada@").is_err());
        assert!(validate_email_address("ada@localhost").is_err());
    }

    #[test]
    fn test_validate_phone_number() {
        assert!(validate_phone_number("+1 (555) 010-2030").is_ok());
        assert!(validate_phone_number("").is_err());
        assert!(validate_phone_number("call me maybe").is_err());
        assert!(validate_phone_number(&"9".repeat(40)).is_err());
    }

    #[test]
    fn test_validate_search_query() {
        assert_eq!(validate_search_query("  acme  ").unwrap(), "acme");
        assert_eq!(validate_search_query("").unwrap(), "");
        assert!(validate_search_query(&"q".repeat(200)).is_err());
    }

    #[test]
    fn test_validate_amount_cents() {
        assert!(validate_amount_cents("amount", 0).is_ok());
        assert!(validate_amount_cents("amount", 1099).is_ok());
        assert!(validate_amount_cents("amount", -1).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(9999).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-3).is_err());
        assert!(validate_quantity(10_000).is_err());
    }

    #[test]
    fn test_validate_date_range() {
        let now = chrono::Utc::now();
        assert!(validate_date_range(now, now).is_ok());
        assert!(validate_date_range(now, now + Duration::days(1)).is_ok());
        assert!(validate_date_range(now + Duration::days(1), now).is_err());
    }
}
