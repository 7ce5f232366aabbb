//! # Validation Module
//!
//! Input validation for the ledger.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                              │
//! │                                                                     │
//! │  Layer 1: Browser views                                             │
//! │  ├── Basic format checks (empty, length)                            │
//! │  └── Immediate user feedback                                        │
//! │           │                                                         │
//! │           ▼                                                         │
//! │  Layer 2: THIS MODULE (called by LedgerService)                     │
//! │  └── Business rule validation, whole-batch row checks               │
//! │           │                                                         │
//! │           ▼                                                         │
//! │  Layer 3: Database (SQLite)                                         │
//! │  ├── NOT NULL / CHECK (quantity >= 0)                               │
//! │  └── UNIQUE (owner_id, name)                                        │
//! │                                                                     │
//! │  Defense in depth: multiple layers catch different errors           │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Bulk intake is validated as a whole BEFORE any write: every faulty row is
//! reported, and nothing is applied if any row fails.

use crate::error::{RowFault, ValidationError};
use crate::types::IntakeRow;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates an owner identifier.
///
/// Every catalog and ledger call is scoped by owner; an empty owner would
/// silently address someone else's partition.
pub fn validate_owner_id(owner_id: &str) -> ValidationResult<()> {
    if owner_id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "owner_id".to_string(),
        });
    }

    Ok(())
}

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty after trimming
/// - Must be at most 200 characters
///
/// The trimmed name is the natural key for intake matching, so the same
/// trimming is applied here and at lookup time.
///
/// ## Returns
/// The trimmed name.
pub fn validate_product_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(name.to_string())
}

/// Validates a buyer name for a sale commit.
///
/// ## Rules
/// - Must not be empty after trimming
/// - Must be at most 200 characters
///
/// ## Returns
/// The trimmed buyer name.
pub fn validate_buyer_name(buyer_name: &str) -> ValidationResult<String> {
    let buyer_name = buyer_name.trim();

    if buyer_name.is_empty() {
        return Err(ValidationError::Required {
            field: "buyer_name".to_string(),
        });
    }

    if buyer_name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "buyer_name".to_string(),
            max: 200,
        });
    }

    Ok(buyer_name.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity value.
///
/// ## Rules
/// - Must be positive (> 0)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates an intake price in cents.
///
/// ## Rules
/// - Must be positive (> 0): intake rows always carry real prices
///
/// Catalog rows may hold a zero price (free item) after manual edits, but a
/// bulk intake row with a zero or negative price is always a typo.
pub fn validate_intake_price(field: &str, cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Batch Validators
// =============================================================================

/// Validates a whole bulk intake batch, reporting every row fault.
///
/// ## Guarantee
/// Either every row passes and a normalized copy (trimmed names) is returned,
/// or the full list of row faults comes back and the caller writes nothing.
///
/// ## Example
/// ```rust
/// use stockbook_core::types::IntakeRow;
/// use stockbook_core::validation::validate_intake_rows;
///
/// let rows = vec![IntakeRow {
///     name: "  Widget ".to_string(),
///     quantity: 10,
///     buy_price_cents: 500,
///     sell_price_cents: 800,
/// }];
/// let normalized = validate_intake_rows(&rows).unwrap();
/// assert_eq!(normalized[0].name, "Widget");
/// ```
pub fn validate_intake_rows(rows: &[IntakeRow]) -> Result<Vec<IntakeRow>, Vec<RowFault>> {
    let mut normalized = Vec::with_capacity(rows.len());
    let mut faults = Vec::new();

    for (row, intake) in rows.iter().enumerate() {
        let mut push_fault = |fault: ValidationError| faults.push(RowFault { row, fault });

        let name = match validate_product_name(&intake.name) {
            Ok(name) => name,
            Err(fault) => {
                push_fault(fault);
                String::new()
            }
        };

        if let Err(fault) = validate_quantity(intake.quantity) {
            push_fault(fault);
        }
        if let Err(fault) = validate_intake_price("buy_price", intake.buy_price_cents) {
            push_fault(fault);
        }
        if let Err(fault) = validate_intake_price("sell_price", intake.sell_price_cents) {
            push_fault(fault);
        }

        normalized.push(IntakeRow {
            name,
            quantity: intake.quantity,
            buy_price_cents: intake.buy_price_cents,
            sell_price_cents: intake.sell_price_cents,
        });
    }

    if faults.is_empty() {
        Ok(normalized)
    } else {
        Err(faults)
    }
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ## Example
/// ```rust
/// use stockbook_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
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
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, qty: i64, buy: i64, sell: i64) -> IntakeRow {
        IntakeRow {
            name: name.to_string(),
            quantity: qty,
            buy_price_cents: buy,
            sell_price_cents: sell,
        }
    }

    #[test]
    fn test_validate_product_name() {
        assert_eq!(validate_product_name("  Widget  ").unwrap(), "Widget");
        assert!(validate_product_name("").is_err());
        assert!(validate_product_name("   ").is_err());
        assert!(validate_product_name(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_buyer_name() {
        assert_eq!(validate_buyer_name(" Ayşe ").unwrap(), "Ayşe");
        assert!(validate_buyer_name("").is_err());
        assert!(validate_buyer_name("  ").is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
    }

    #[test]
    fn test_validate_intake_price() {
        assert!(validate_intake_price("buy_price", 1).is_ok());
        assert!(validate_intake_price("buy_price", 0).is_err());
        assert!(validate_intake_price("sell_price", -100).is_err());
    }

    #[test]
    fn test_validate_intake_rows_ok_normalizes_names() {
        let rows = vec![row(" Widget ", 10, 500, 800), row("Gadget", 2, 100, 250)];
        let normalized = validate_intake_rows(&rows).unwrap();
        assert_eq!(normalized[0].name, "Widget");
        assert_eq!(normalized[1].name, "Gadget");
    }

    #[test]
    fn test_validate_intake_rows_reports_every_fault() {
        let rows = vec![
            row("", 10, 500, 800),       // missing name
            row("Widget", 0, 500, 800),  // bad quantity
            row("Gadget", 2, 100, 250),  // fine
            row("Gizmo", 1, -5, 0),      // two price faults
        ];

        let faults = validate_intake_rows(&rows).unwrap_err();
        let rows_with_faults: Vec<usize> = faults.iter().map(|f| f.row).collect();
        assert_eq!(rows_with_faults, vec![0, 1, 3, 3]);
    }

    #[test]
    fn test_validate_owner_id() {
        assert!(validate_owner_id("owner-1").is_ok());
        assert!(validate_owner_id("").is_err());
        assert!(validate_owner_id("   ").is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("").is_err());
        assert!(validate_uuid("not-a-uuid").is_err());
    }
}
