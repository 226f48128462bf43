//! Stock arithmetic and movement validation rules
//!
//! These are the pure rules the backend's ledger and engines enforce;
//! keeping them here lets the quantity invariants be tested without a
//! database.

use serde::Serialize;
use thiserror::Error;

/// Violations of the stock quantity rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
pub enum StockError {
    #[error("quantity must be greater than zero")]
    NonPositiveQuantity,
    #[error("quantity cannot be negative")]
    NegativeQuantity,
    #[error("insufficient stock: available {available}, requested {requested}")]
    Insufficient { available: i32, requested: i32 },
}

/// Require a strictly positive amount (entries, exits, transfers,
/// shipments)
pub fn validate_positive(amount: i32) -> Result<(), StockError> {
    if amount <= 0 {
        return Err(StockError::NonPositiveQuantity);
    }
    Ok(())
}

/// Require a non-negative target (adjustments / setExact)
pub fn validate_non_negative(amount: i32) -> Result<(), StockError> {
    if amount < 0 {
        return Err(StockError::NegativeQuantity);
    }
    Ok(())
}

/// New quantity after crediting `amount` onto `current`. No upper
/// bound; `amount` must be positive.
pub fn apply_credit(current: i32, amount: i32) -> Result<i32, StockError> {
    validate_positive(amount)?;
    Ok(current + amount)
}

/// New quantity after debiting `amount` from `current`. Fails without
/// changing anything when `current < amount`, carrying both numbers so
/// the caller can inform the end user.
pub fn apply_debit(current: i32, amount: i32) -> Result<i32, StockError> {
    validate_positive(amount)?;
    if current < amount {
        return Err(StockError::Insufficient {
            available: current,
            requested: amount,
        });
    }
    Ok(current - amount)
}

/// The computed effect of an inventory adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdjustmentOutcome {
    /// Signed difference: new - current
    pub delta: i32,
    /// Absolute magnitude recorded on the movement
    pub magnitude: i32,
    /// The adjusted place when the delta is negative
    pub origin_place_id: Option<i32>,
    /// The adjusted place when the delta is positive
    pub destination_place_id: Option<i32>,
}

/// Compute the delta of adjusting `place_id` from `current` to
/// `new_quantity`, and which side of the movement the place lands on:
/// a shrink records the place as origin, a growth as destination, a
/// no-op as neither.
pub fn adjustment_outcome(
    current: i32,
    new_quantity: i32,
    place_id: i32,
) -> Result<AdjustmentOutcome, StockError> {
    validate_non_negative(new_quantity)?;
    let delta = new_quantity - current;
    Ok(AdjustmentOutcome {
        delta,
        magnitude: delta.abs(),
        origin_place_id: (delta < 0).then_some(place_id),
        destination_place_id: (delta > 0).then_some(place_id),
    })
}

/// Annotate adjustment notes with the previous/new quantities and the
/// signed delta, in front of whatever the operator wrote.
pub fn annotate_adjustment_notes(previous: i32, new_quantity: i32, notes: Option<&str>) -> String {
    let delta = new_quantity - previous;
    let header = format!(
        "Stock anterior: {}, Stock nuevo: {}, Diferencia: {:+}.",
        previous, new_quantity, delta
    );
    match notes {
        Some(n) if !n.trim().is_empty() => format!("{} {}", header, n),
        _ => header,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credit_rejects_non_positive() {
        assert_eq!(apply_credit(10, 0), Err(StockError::NonPositiveQuantity));
        assert_eq!(apply_credit(10, -5), Err(StockError::NonPositiveQuantity));
    }

    #[test]
    fn test_debit_carries_available_and_requested() {
        assert_eq!(
            apply_debit(50, 60),
            Err(StockError::Insufficient {
                available: 50,
                requested: 60
            })
        );
    }

    #[test]
    fn test_credit_then_full_debit_is_zero() {
        let after_credit = apply_credit(0, 30).unwrap();
        assert_eq!(apply_debit(after_credit, 30).unwrap(), 0);
    }

    #[test]
    fn test_adjustment_shrink_assigns_origin() {
        let out = adjustment_outcome(50, 30, 7).unwrap();
        assert_eq!(out.delta, -20);
        assert_eq!(out.magnitude, 20);
        assert_eq!(out.origin_place_id, Some(7));
        assert_eq!(out.destination_place_id, None);
    }

    #[test]
    fn test_adjustment_growth_assigns_destination() {
        let out = adjustment_outcome(30, 50, 7).unwrap();
        assert_eq!(out.delta, 20);
        assert_eq!(out.magnitude, 20);
        assert_eq!(out.origin_place_id, None);
        assert_eq!(out.destination_place_id, Some(7));
    }

    #[test]
    fn test_adjustment_noop_assigns_neither() {
        let out = adjustment_outcome(40, 40, 7).unwrap();
        assert_eq!(out.delta, 0);
        assert_eq!(out.origin_place_id, None);
        assert_eq!(out.destination_place_id, None);
    }

    #[test]
    fn test_adjustment_rejects_negative_target() {
        assert_eq!(
            adjustment_outcome(40, -1, 7),
            Err(StockError::NegativeQuantity)
        );
    }

    #[test]
    fn test_notes_annotation() {
        let annotated = annotate_adjustment_notes(50, 30, Some("conteo físico"));
        assert_eq!(
            annotated,
            "Stock anterior: 50, Stock nuevo: 30, Diferencia: -20. conteo físico"
        );
        let bare = annotate_adjustment_notes(30, 50, None);
        assert_eq!(bare, "Stock anterior: 30, Stock nuevo: 50, Diferencia: +20.");
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_debit_result_non_negative(
                current in 0i32..=100_000,
                amount in 1i32..=100_000
            ) {
                if let Ok(new_quantity) = apply_debit(current, amount) {
                    prop_assert!(new_quantity >= 0);
                }
            }

            #[test]
            fn prop_adjustment_sides_are_exclusive(
                current in 0i32..=100_000,
                target in 0i32..=100_000
            ) {
                let out = adjustment_outcome(current, target, 1).unwrap();
                prop_assert!(
                    !(out.origin_place_id.is_some() && out.destination_place_id.is_some())
                );
            }
        }
    }
}
